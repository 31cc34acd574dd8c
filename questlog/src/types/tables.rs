use chrono::{DateTime, Utc};
use questlog_libs::ColumnList;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ColumnList)]
pub struct Quest {
    pub quest_id: i32,
    pub submission_id: Option<i64>, // 提出ID(ジャッジ側)
    pub problem_number: i32,
    pub title: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub run_time: f64, // 実行時間(ms)
    pub submitter: String,
    pub platform: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A quest that is not stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuest {
    pub submission_id: Option<i64>,
    pub problem_number: i32,
    pub title: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub run_time: f64,
    pub submitter: String,
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ColumnList)]
pub struct User {
    pub user_id: i32,
    pub user_name: String,
    pub display_name: String,
    pub accepted_count: i32,
    pub total_count: i32,
    pub reserved_quests: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub user_name: String,
    pub display_name: String,
}

/// Field-wise update of a quest; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestPatch {
    pub problem_number: Option<i32>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub run_time: Option<f64>,
    pub submitter: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    pub user_name: Option<String>,
    pub display_name: Option<String>,
}
