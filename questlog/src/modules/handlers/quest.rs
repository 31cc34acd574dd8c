use crate::{
    modules::handlers::{error_response, store_error, AppState, ErrorResponse, ValidatedJson},
    types::tables::{NewQuest, Quest, QuestPatch},
};
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use questlog_libs::{api::MessageResponse, judge::is_status_name};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

fn validate_status(value: &str) -> Result<(), ValidationError> {
    if is_status_name(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid status"))
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateQuestRequest {
    pub submission_id: Option<i64>,
    #[validate(range(min = 0))]
    pub problem_number: i32,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(custom = "validate_status")]
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    #[validate(range(min = 0.0))]
    pub run_time: f64,
    #[validate(length(min = 1, max = 100))]
    pub submitter: String,
    #[validate(length(min = 1, max = 100))]
    pub platform: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateQuestRequest {
    #[validate(range(min = 0))]
    pub problem_number: Option<i32>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(custom = "validate_status")]
    pub status: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0))]
    pub run_time: Option<f64>,
    #[validate(length(min = 1, max = 100))]
    pub submitter: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub platform: Option<String>,
}

impl From<UpdateQuestRequest> for QuestPatch {
    fn from(request: UpdateQuestRequest) -> Self {
        QuestPatch {
            problem_number: request.problem_number,
            title: request.title,
            status: request.status,
            submitted_at: request.submitted_at,
            run_time: request.run_time,
            submitter: request.submitter,
            platform: request.platform,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuestListParameter {
    pub submitter: Option<String>,
}

pub async fn list_quests(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<QuestListParameter>,
) -> Result<Json<Vec<Quest>>, ErrorResponse> {
    let quests = state
        .store
        .list_quests(params.submitter.as_deref())
        .await
        .map_err(store_error)?;

    Ok(Json(quests))
}

pub async fn get_quest(
    Extension(state): Extension<Arc<AppState>>,
    Path(quest_id): Path<i32>,
) -> Result<Json<Quest>, ErrorResponse> {
    match state.store.get_quest(quest_id).await.map_err(store_error)? {
        Some(quest) => Ok(Json(quest)),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("quest {} not found", quest_id),
        )),
    }
}

pub async fn create_quest(
    Extension(state): Extension<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateQuestRequest>,
) -> Result<(StatusCode, Json<Quest>), ErrorResponse> {
    let quest = NewQuest {
        submission_id: request.submission_id,
        problem_number: request.problem_number,
        title: request.title,
        status: request.status,
        submitted_at: request.submitted_at,
        run_time: request.run_time,
        submitter: request.submitter,
        platform: request
            .platform
            .unwrap_or_else(|| state.config.platform.clone()),
    };
    let quest = state.store.create_quest(&quest).await.map_err(store_error)?;
    tracing::info!("quest {} created", quest.quest_id);

    Ok((StatusCode::CREATED, Json(quest)))
}

pub async fn update_quest(
    Extension(state): Extension<Arc<AppState>>,
    Path(quest_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateQuestRequest>,
) -> Result<Json<Quest>, ErrorResponse> {
    let patch = QuestPatch::from(request);
    match state
        .store
        .update_quest(quest_id, &patch)
        .await
        .map_err(store_error)?
    {
        Some(quest) => Ok(Json(quest)),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("quest {} not found", quest_id),
        )),
    }
}

pub async fn delete_quest(
    Extension(state): Extension<Arc<AppState>>,
    Path(quest_id): Path<i32>,
) -> Result<Json<MessageResponse>, ErrorResponse> {
    if state
        .store
        .delete_quest(quest_id)
        .await
        .map_err(store_error)?
    {
        Ok(Json(MessageResponse::new("successfully delete quest")))
    } else {
        Err(error_response(
            StatusCode::NOT_FOUND,
            format!("quest {} not found", quest_id),
        ))
    }
}

#[cfg(test)]
mod test {
    use crate::modules::{
        config::SyncConfig,
        handlers::test_util::{app, send},
        store::memory::MemoryStore,
        sync::scripted::ScriptedJudge,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn quest_body() -> serde_json::Value {
        json!({
            "problem_number": 100,
            "title": "The 3n + 1 problem",
            "status": "Accepted",
            "submitted_at": "2010-01-01T00:00:00Z",
            "run_time": 12.0,
            "submitter": "alice"
        })
    }

    #[tokio::test]
    async fn test_quest_crud() {
        let store = Arc::new(MemoryStore::new());
        let app = app(
            store.clone(),
            Arc::new(ScriptedJudge::default()),
            SyncConfig::default(),
        );

        let (status, created) = send(&app, "POST", "/api/quest", Some(quest_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["platform"], "UVa");
        let quest_id = created["quest_id"].as_i64().unwrap();

        let (status, quest) = send(&app, "GET", &format!("/api/quest/{}", quest_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quest["title"], "The 3n + 1 problem");

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/quest/{}", quest_id),
            Some(json!({"status": "Wrong answer"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "Wrong answer");
        assert_eq!(updated["problem_number"], 100);

        let (status, quests) = send(&app, "GET", "/api/quest?submitter=alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quests.as_array().unwrap().len(), 1);
        let (_, quests) = send(&app, "GET", "/api/quest?submitter=bob", None).await;
        assert!(quests.as_array().unwrap().is_empty());

        let (status, _) = send(&app, "DELETE", &format!("/api/quest/{}", quest_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &format!("/api/quest/{}", quest_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(store.quests().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_quest_is_rejected() {
        let app = app(
            Arc::new(MemoryStore::new()),
            Arc::new(ScriptedJudge::default()),
            SyncConfig::default(),
        );

        let mut body = quest_body();
        body["status"] = json!("Solved");
        let (status, message) = send(&app, "POST", "/api/quest", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message["message"].as_str().unwrap().contains("status"));

        let mut body = quest_body();
        body["run_time"] = json!(-1.0);
        let (status, _) = send(&app, "POST", "/api/quest", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "PUT", "/api/quest/42", Some(json!({"title": "x"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
