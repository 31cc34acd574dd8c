use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

pub const ACCEPTED: &str = "Accepted";
pub const UNKNOWN: &str = "Unknown";

/// Every verdict code the judge is known to report.
pub const VERDICT_CODES: [i32; 11] = [10, 15, 20, 30, 40, 45, 50, 60, 70, 80, 90];

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("unknown judge status code {0}")]
pub struct UnknownStatusCode(pub i32);

/// Translates a uHunt verdict code into the status string stored on a quest.
pub fn status_name(code: i32) -> Result<&'static str, UnknownStatusCode> {
    let name = match code {
        10 => "Submission error",
        15 => "Can't be judged",
        20 => "In queue",
        30 => "Compile error",
        40 => "Runtime error",
        45 => "Output limit exceeded",
        50 => "Time limit exceeded",
        60 => "Memory limit exceeded",
        70 => "Wrong answer",
        80 => "Presentation error",
        90 => ACCEPTED,
        _ => return Err(UnknownStatusCode(code)),
    };

    Ok(name)
}

/// Whether `name` is a status a quest may carry, `Unknown` included.
pub fn is_status_name(name: &str) -> bool {
    name == UNKNOWN
        || VERDICT_CODES
            .iter()
            .filter_map(|code| status_name(*code).ok())
            .any(|known| known == name)
}

/// What a reconciliation run does with a verdict code missing from the table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStatusPolicy {
    /// Fail the whole run before anything is written.
    #[default]
    Abort,
    /// Store the submission with the `Unknown` status and keep going.
    Sentinel,
}

impl UnknownStatusPolicy {
    pub fn resolve(&self, code: i32) -> Result<&'static str, UnknownStatusCode> {
        match (status_name(code), self) {
            (Ok(name), _) => Ok(name),
            (Err(e), UnknownStatusPolicy::Abort) => Err(e),
            (Err(_), UnknownStatusPolicy::Sentinel) => {
                tracing::warn!("verdict code {} is not known, stored as {}", code, UNKNOWN);
                Ok(UNKNOWN)
            }
        }
    }
}

impl FromStr for UnknownStatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(UnknownStatusPolicy::Abort),
            "sentinel" => Ok(UnknownStatusPolicy::Sentinel),
            other => Err(format!("invalid unknown status policy `{}`", other)),
        }
    }
}

impl fmt::Display for UnknownStatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnknownStatusPolicy::Abort => write!(f, "abort"),
            UnknownStatusPolicy::Sentinel => write!(f, "sentinel"),
        }
    }
}
