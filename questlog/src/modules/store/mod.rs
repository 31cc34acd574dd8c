pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgQuestStore;

use crate::types::tables::{NewQuest, NewUser, Quest, QuestPatch, User, UserPatch};
use async_trait::async_trait;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    Conflict(String),
}

/// Persistence of quests and users.
#[async_trait]
pub trait QuestStore: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn list_quests(&self, submitter: Option<&str>) -> Result<Vec<Quest>>;
    async fn get_quest(&self, quest_id: i32) -> Result<Option<Quest>>;
    async fn create_quest(&self, quest: &NewQuest) -> Result<Quest>;
    async fn update_quest(&self, quest_id: i32, patch: &QuestPatch) -> Result<Option<Quest>>;
    async fn delete_quest(&self, quest_id: i32) -> Result<bool>;

    async fn list_users(&self) -> Result<Vec<User>>;
    async fn get_user(&self, user_id: i32) -> Result<Option<User>>;
    async fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>>;
    async fn create_user(&self, user: &NewUser) -> Result<User>;
    async fn update_user(&self, user_id: i32, patch: &UserPatch) -> Result<Option<User>>;
    async fn delete_user(&self, user_id: i32) -> Result<bool>;

    /// Appends the quest to the user's reservations. `false` when it is already reserved.
    async fn reserve_quest(&self, user_name: &str, quest_id: i32) -> Result<bool>;
    /// Removes the quest from the user's reservations. `false` when it was not reserved.
    async fn cancel_reservation(&self, user_name: &str, quest_id: i32) -> Result<bool>;

    /// Inserts every quest of a synchronization run and overwrites the user's
    /// counters. Either all of it is stored or none of it.
    async fn record_sync(
        &self,
        user_name: &str,
        quests: &[NewQuest],
        accepted_count: i32,
        total_count: i32,
    ) -> Result<()>;
}
