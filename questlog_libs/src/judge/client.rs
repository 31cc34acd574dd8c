use crate::judge::model::{ProblemJson, ProblemMeta, RawSubmission, UserSubmissionsJson};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::{
    sync::{OnceCell, RwLock},
    time::Duration,
};

type Result<T> = std::result::Result<T, JudgeClientError>;

#[derive(Debug, Error)]
pub enum JudgeClientError {
    #[error("judge has no user named `{0}`")]
    HandleNotFound(String),
    #[error("judge is unavailable: {0}")]
    RemoteUnavailable(String),
    #[error("invalid judge url given")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for JudgeClientError {
    fn from(e: reqwest::Error) -> Self {
        JudgeClientError::RemoteUnavailable(e.to_string())
    }
}

#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Looks up the judge's numeric id for a user name.
    async fn resolve_handle(&self, name: &str) -> Result<i64>;
    /// Every submission the judge has for the user, in a single round trip.
    async fn list_submissions(&self, remote_id: i64) -> Result<Vec<RawSubmission>>;
    async fn fetch_problem_meta(&self, problem_id: i64) -> Result<ProblemMeta>;
}

/// Client of the uHunt API in front of the UVa Online Judge.
pub struct UHuntClient {
    base_url: Url,
    client: Client,
}

impl UHuntClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(JudgeClientError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let client = Client::builder().gzip(true).timeout(timeout).build()?;

        Ok(UHuntClient { base_url, client })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    async fn get(&self, url: Url) -> Result<Response> {
        tracing::debug!("GET {}", url);
        let res = self.client.get(url.clone()).send().await.map_err(|e| {
            let message = format!("request to {} failed: {}", url, e);
            tracing::error!(message);
            JudgeClientError::RemoteUnavailable(message)
        })?;

        match res.error_for_status_ref() {
            Ok(_) => Ok(res),
            Err(e) => {
                let message = format!("error response returned from {}: {}", url, e);
                tracing::error!(message);
                Err(JudgeClientError::RemoteUnavailable(message))
            }
        }
    }
}

#[async_trait]
impl JudgeClient for UHuntClient {
    async fn resolve_handle(&self, name: &str) -> Result<i64> {
        let res = self.get(self.endpoint(&["uname2uid", name])).await?;
        let body = res.text().await?;

        let remote_id: i64 = body.trim().parse().map_err(|_| {
            let message = format!("unexpected response to user name lookup: `{}`", body);
            tracing::error!(message);
            JudgeClientError::RemoteUnavailable(message)
        })?;

        // uHunt answers 0 when no user matches
        if remote_id == 0 {
            tracing::warn!("user name {} is not registered on the judge", name);
            return Err(JudgeClientError::HandleNotFound(name.to_string()));
        }

        Ok(remote_id)
    }

    async fn list_submissions(&self, remote_id: i64) -> Result<Vec<RawSubmission>> {
        let res = self
            .get(self.endpoint(&["subs-user", &remote_id.to_string()]))
            .await?;
        let body: UserSubmissionsJson = res.json().await?;

        let submissions = body.into_submissions();
        tracing::info!(
            "{} submissions retrieved for judge user {}.",
            submissions.len(),
            remote_id
        );

        Ok(submissions)
    }

    async fn fetch_problem_meta(&self, problem_id: i64) -> Result<ProblemMeta> {
        let res = self
            .get(self.endpoint(&["p", "id", &problem_id.to_string()]))
            .await?;
        let problem: ProblemJson = res.json().await?;

        Ok(problem.into())
    }
}

/// Wraps a client and remembers problem metadata for the lifetime of the process.
///
/// Handle resolution and submission lists always go to the inner client.
/// Concurrent lookups of the same problem share a single request.
pub struct CachedJudgeClient<C> {
    inner: C,
    problems: RwLock<HashMap<i64, Arc<OnceCell<ProblemMeta>>>>,
}

impl<C: JudgeClient> CachedJudgeClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            problems: RwLock::new(HashMap::new()),
        }
    }

    pub async fn cached(&self) -> usize {
        self.problems
            .read()
            .await
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }
}

#[async_trait]
impl<C: JudgeClient> JudgeClient for CachedJudgeClient<C> {
    async fn resolve_handle(&self, name: &str) -> Result<i64> {
        self.inner.resolve_handle(name).await
    }

    async fn list_submissions(&self, remote_id: i64) -> Result<Vec<RawSubmission>> {
        self.inner.list_submissions(remote_id).await
    }

    async fn fetch_problem_meta(&self, problem_id: i64) -> Result<ProblemMeta> {
        let cached = self.problems.read().await.get(&problem_id).cloned();
        let cell = match cached {
            Some(cell) => cell,
            None => self
                .problems
                .write()
                .await
                .entry(problem_id)
                .or_default()
                .clone(),
        };

        // 失敗した場合はセルが空のまま残り、次の呼び出しで再取得される
        let meta = cell
            .get_or_try_init(|| self.inner.fetch_problem_meta(problem_id))
            .await?;

        Ok(meta.clone())
    }
}
