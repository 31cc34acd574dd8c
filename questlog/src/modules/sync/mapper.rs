use crate::types::tables::NewQuest;
use chrono::{DateTime, TimeZone, Utc};
use questlog_libs::judge::{ProblemMeta, RawSubmission, UnknownStatusCode, UnknownStatusPolicy};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("{0}, set UNKNOWN_STATUS_POLICY=sentinel to store it as Unknown")]
    UnknownStatusCode(#[from] UnknownStatusCode),
    #[error("submit time {0} is out of range")]
    InvalidTimestamp(i64),
}

pub fn epoch_to_datetime(epoch_second: i64) -> Result<DateTime<Utc>, MappingError> {
    Utc.timestamp_opt(epoch_second, 0)
        .single()
        .ok_or(MappingError::InvalidTimestamp(epoch_second))
}

/// Builds the quest stored for one judge submission.
pub fn map_submission(
    submission: &RawSubmission,
    problem: &ProblemMeta,
    submitter: &str,
    platform: &str,
    policy: UnknownStatusPolicy,
) -> Result<NewQuest, MappingError> {
    let status = policy.resolve(submission.verdict)?;
    let submitted_at = epoch_to_datetime(submission.submit_time)?;

    Ok(NewQuest {
        submission_id: Some(submission.submission_id),
        problem_number: problem.number,
        title: problem.title.clone(),
        status: status.to_string(),
        submitted_at,
        run_time: submission.run_time,
        submitter: submitter.to_string(),
        platform: platform.to_string(),
    })
}
