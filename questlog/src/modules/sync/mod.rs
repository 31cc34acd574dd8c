pub mod engine;
pub mod mapper;

#[cfg(test)]
pub mod scripted;

pub use engine::SyncEngine;
pub use mapper::{map_submission, MappingError};

use crate::modules::store::StoreError;
use questlog_libs::judge::JudgeClientError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("user `{0}` not found")]
    UserNotFound(String),
    #[error(transparent)]
    Judge(#[from] JudgeClientError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counters written to the user at the end of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub accepted_count: i32,
    pub total_count: i32,
}
