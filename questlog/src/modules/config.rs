use questlog_libs::judge::UnknownStatusPolicy;
use std::env;
use tokio::time::Duration;

pub const DEFAULT_UHUNT_API_URL: &str = "https://uhunt.onlinejudge.org";
pub const DEFAULT_PLATFORM: &str = "UVa";
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 120;

/// Settings of the synchronization routine, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub judge_url: String,
    pub platform: String,
    pub policy: UnknownStatusPolicy,
    /// Overall deadline of a run triggered over HTTP.
    pub timeout: Duration,
    /// Per-request timeout of the judge client.
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            judge_url: String::from(DEFAULT_UHUNT_API_URL),
            platform: String::from(DEFAULT_PLATFORM),
            policy: UnknownStatusPolicy::default(),
            timeout: Duration::from_secs(DEFAULT_SYNC_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        let judge_url = lookup("UHUNT_API_URL").unwrap_or_else(|| {
            tracing::warn!(
                "UHUNT_API_URL environment variable is not set. Default value `{}` will be used.",
                DEFAULT_UHUNT_API_URL
            );
            default.judge_url
        });
        let platform = lookup("JUDGE_PLATFORM").unwrap_or(default.platform);
        let policy = match lookup("UNKNOWN_STATUS_POLICY") {
            Some(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, `{}` will be used", e, default.policy);
                default.policy
            }),
            None => default.policy,
        };
        let timeout = match lookup("SYNC_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "invalid SYNC_TIMEOUT_SECS `{}`, {} seconds will be used",
                        value,
                        DEFAULT_SYNC_TIMEOUT_SECS
                    );
                    default.timeout
                }
            },
            None => default.timeout,
        };

        Self {
            judge_url,
            platform,
            policy,
            timeout,
            request_timeout: default.request_timeout,
        }
    }
}
