use crate::modules::{
    handlers::{error_response, store_error, AppState, ErrorResponse, ValidatedJson},
    sync::{SyncEngine, SyncError, SyncSummary},
};
use axum::{extract::Extension, http::StatusCode, Json};
use questlog_libs::judge::JudgeClientError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SyncRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_name: String,
}

fn sync_error(e: SyncError) -> ErrorResponse {
    match e {
        SyncError::UserNotFound(_) | SyncError::Judge(JudgeClientError::HandleNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, e)
        }
        SyncError::Judge(_) | SyncError::Mapping(_) => error_response(StatusCode::BAD_GATEWAY, e),
        SyncError::Store(e) => store_error(e),
    }
}

pub async fn synchronize(
    Extension(state): Extension<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SyncRequest>,
) -> Result<Json<SyncSummary>, ErrorResponse> {
    let engine = SyncEngine::new(
        state.store.as_ref(),
        state.judge.as_ref(),
        &state.config.platform,
        state.config.policy,
    );

    // 期限を過ぎたら実行中の同期を打ち切る(保存前なら何も書き込まれない)
    match time::timeout(state.config.timeout, engine.synchronize(&request.user_name)).await {
        Ok(Ok(summary)) => Ok(Json(summary)),
        Ok(Err(e)) => Err(sync_error(e)),
        Err(_) => {
            tracing::error!(
                "synchronization of {} did not finish within {:?}",
                request.user_name,
                state.config.timeout
            );
            Err(error_response(
                StatusCode::GATEWAY_TIMEOUT,
                "synchronization timed out",
            ))
        }
    }
}
