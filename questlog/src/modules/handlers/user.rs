use crate::{
    modules::handlers::{error_response, store_error, AppState, ErrorResponse, ValidatedJson},
    types::tables::{NewUser, Quest, User, UserPatch},
};
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use questlog_libs::api::MessageResponse;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_name: String,
    /// ジャッジ側のユーザ名。省略時はuser_nameと同じ
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ReservationRequest {
    #[validate(length(min = 1, max = 100))]
    pub user_name: String,
    pub quest_id: i32,
}

#[derive(Debug, Serialize)]
pub struct UserQuestResponse {
    #[serde(flatten)]
    pub quest: Quest,
    pub is_reserved: bool,
}

fn user_not_found(subject: impl std::fmt::Display) -> ErrorResponse {
    error_response(StatusCode::NOT_FOUND, format!("user {} not found", subject))
}

pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<User>>, ErrorResponse> {
    let users = state.store.list_users().await.map_err(store_error)?;
    Ok(Json(users))
}

pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<User>, ErrorResponse> {
    state
        .store
        .get_user(user_id)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| user_not_found(user_id))
}

pub async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ErrorResponse> {
    let user = NewUser {
        display_name: request
            .display_name
            .unwrap_or_else(|| request.user_name.clone()),
        user_name: request.user_name,
    };
    let user = state.store.create_user(&user).await.map_err(store_error)?;
    tracing::info!("user {} created", user.user_name);

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<User>, ErrorResponse> {
    let patch = UserPatch {
        user_name: request.user_name,
        display_name: request.display_name,
    };
    state
        .store
        .update_user(user_id, &patch)
        .await
        .map_err(store_error)?
        .map(Json)
        .ok_or_else(|| user_not_found(user_id))
}

pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    if state.store.delete_user(user_id).await.map_err(store_error)? {
        Ok(Json(MessageResponse::new("successfully delete user")))
    } else {
        Err(user_not_found(user_id))
    }
}

/// Every quest, flagged with whether the user reserved it.
pub async fn user_quests(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_name): Path<String>,
) -> Result<Json<Vec<UserQuestResponse>>, ErrorResponse> {
    let user = state
        .store
        .find_user_by_name(&user_name)
        .await
        .map_err(store_error)?
        .ok_or_else(|| user_not_found(&user_name))?;
    let quests = state.store.list_quests(None).await.map_err(store_error)?;

    let response = quests
        .into_iter()
        .map(|quest| UserQuestResponse {
            is_reserved: user.reserved_quests.contains(&quest.quest_id),
            quest,
        })
        .collect();

    Ok(Json(response))
}

/// 予約対象のユーザとクエストが存在することを確認するメソッド
async fn ensure_reservable(state: &AppState, request: &ReservationRequest) -> Result<(), ErrorResponse> {
    state
        .store
        .find_user_by_name(&request.user_name)
        .await
        .map_err(store_error)?
        .ok_or_else(|| user_not_found(&request.user_name))?;

    if state
        .store
        .get_quest(request.quest_id)
        .await
        .map_err(store_error)?
        .is_none()
    {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            format!("quest {} not found", request.quest_id),
        ));
    }

    Ok(())
}

pub async fn reserve(
    Extension(state): Extension<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ReservationRequest>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    ensure_reservable(&state, &request).await?;

    let reserved = state
        .store
        .reserve_quest(&request.user_name, request.quest_id)
        .await
        .map_err(store_error)?;
    if !reserved {
        return Err(error_response(
            StatusCode::CONFLICT,
            format!("quest {} is already reserved", request.quest_id),
        ));
    }
    tracing::info!("{} reserved quest {}", request.user_name, request.quest_id);

    Ok(Json(MessageResponse::new("reserve successful")))
}

pub async fn cancel(
    Extension(state): Extension<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ReservationRequest>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    ensure_reservable(&state, &request).await?;

    let canceled = state
        .store
        .cancel_reservation(&request.user_name, request.quest_id)
        .await
        .map_err(store_error)?;
    if !canceled {
        return Err(error_response(
            StatusCode::NOT_FOUND,
            format!("quest {} is not reserved", request.quest_id),
        ));
    }
    tracing::info!(
        "{} canceled the reservation of quest {}",
        request.user_name,
        request.quest_id
    );

    Ok(Json(MessageResponse::new("cancel successful")))
}
