pub mod quest;
pub mod sync;
pub mod user;

use crate::modules::{config::SyncConfig, store::QuestStore, store::StoreError};
use axum::{
    async_trait,
    body::HttpBody,
    extract::{Extension, FromRequest},
    http::{Request, StatusCode},
    BoxError, Json,
};
use questlog_libs::{api::MessageResponse, judge::JudgeClient};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use validator::Validate;

/// Shared by every handler through an `Extension` layer.
pub struct AppState {
    pub store: Arc<dyn QuestStore>,
    pub judge: Arc<dyn JudgeClient>,
    pub config: SyncConfig,
}

pub type ErrorResponse = (StatusCode, Json<MessageResponse>);

pub fn error_response(status: StatusCode, message: impl ToString) -> ErrorResponse {
    (status, Json(MessageResponse::new(message)))
}

pub fn store_error(e: StoreError) -> ErrorResponse {
    match e {
        StoreError::NotFound(subject) => {
            error_response(StatusCode::NOT_FOUND, format!("{} not found", subject))
        }
        StoreError::Conflict(subject) => {
            error_response(StatusCode::CONFLICT, format!("{} already exists", subject))
        }
        StoreError::Database(e) => {
            tracing::error!("request failed cause: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")
        }
    }
}

/// JSON body that passed its `validator` rules.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                tracing::error!("Parsing error: {}", rejection);
                error_response(
                    StatusCode::BAD_REQUEST,
                    format!("invalid request body: [{}]", rejection),
                )
            })?;

        value.validate().map_err(|rejection| {
            tracing::error!("Validation error: {}", rejection);
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Validation error: [{}]", rejection).replace('\n', ", "),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

pub async fn readiness(Extension(state): Extension<Arc<AppState>>) -> StatusCode {
    match state.store.ping().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("database is not ready: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
