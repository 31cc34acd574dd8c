use async_trait::async_trait;
use questlog_libs::judge::{JudgeClient, JudgeClientError, ProblemMeta, RawSubmission};
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::time::{self, Duration};

/// Judge answering from fixed data, for engine and handler tests.
#[derive(Default)]
pub struct ScriptedJudge {
    pub users: HashMap<String, i64>,
    pub submissions: Vec<RawSubmission>,
    pub problems: HashMap<i64, ProblemMeta>,
    pub unavailable: bool,
    /// Delay before answering a handle lookup.
    pub delay: Option<Duration>,
    pub requests: AtomicUsize,
}

impl ScriptedJudge {
    /// One user `alice` (judge id 46232) whose submissions carry the given verdicts,
    /// all on problem 36.
    pub fn with_verdicts(verdicts: &[i32]) -> Self {
        let submissions = verdicts
            .iter()
            .enumerate()
            .map(|(i, verdict)| RawSubmission {
                submission_id: 1000 + i as i64,
                problem_id: 36,
                verdict: *verdict,
                run_time: 10.0 * i as f64,
                submit_time: 1262304000 + i as i64,
                language: 5,
                rank: -1,
            })
            .collect();

        Self {
            users: HashMap::from([(String::from("alice"), 46232)]),
            submissions,
            problems: HashMap::from([(
                36,
                ProblemMeta {
                    number: 100,
                    title: String::from("The 3n + 1 problem"),
                },
            )]),
            ..Default::default()
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn request(&self) -> Result<(), JudgeClientError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            Err(JudgeClientError::RemoteUnavailable(String::from(
                "connection refused",
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl JudgeClient for ScriptedJudge {
    async fn resolve_handle(&self, name: &str) -> Result<i64, JudgeClientError> {
        if let Some(delay) = self.delay {
            time::sleep(delay).await;
        }
        self.request()?;
        self.users
            .get(name)
            .copied()
            .ok_or_else(|| JudgeClientError::HandleNotFound(name.to_string()))
    }

    async fn list_submissions(&self, _remote_id: i64) -> Result<Vec<RawSubmission>, JudgeClientError> {
        self.request()?;
        Ok(self.submissions.clone())
    }

    async fn fetch_problem_meta(&self, problem_id: i64) -> Result<ProblemMeta, JudgeClientError> {
        self.request()?;
        self.problems.get(&problem_id).cloned().ok_or_else(|| {
            JudgeClientError::RemoteUnavailable(format!("404 Not Found for problem {}", problem_id))
        })
    }
}
