pub mod client;
pub mod model;
pub mod status;

pub use client::{CachedJudgeClient, JudgeClient, JudgeClientError, UHuntClient};
pub use model::{ProblemMeta, RawSubmission};
pub use status::{
    is_status_name, status_name, UnknownStatusCode, UnknownStatusPolicy, ACCEPTED, UNKNOWN,
};
