use crate::modules::{
    store::QuestStore,
    sync::{mapper, SyncError, SyncSummary},
};
use questlog_libs::judge::{JudgeClient, UnknownStatusPolicy, ACCEPTED};

type Result<T> = std::result::Result<T, SyncError>;

/// Pulls a user's submission history from the judge into the quest store.
pub struct SyncEngine<'a> {
    store: &'a dyn QuestStore,
    judge: &'a dyn JudgeClient,
    platform: &'a str,
    policy: UnknownStatusPolicy,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        store: &'a dyn QuestStore,
        judge: &'a dyn JudgeClient,
        platform: &'a str,
        policy: UnknownStatusPolicy,
    ) -> Self {
        SyncEngine {
            store,
            judge,
            platform,
            policy,
        }
    }

    /// ユーザの提出履歴を取得してクエストとして保存し、AC数と提出数を更新するメソッド
    ///
    /// - 提出はすべて新しい行として追加される(同じユーザで再実行すると重複する)
    /// - AC数と提出数は今回取得した提出だけから計算して上書きする
    /// - 取得とマッピングがすべて成功したときだけ保存を行う
    pub async fn synchronize(&self, user_name: &str) -> Result<SyncSummary> {
        tracing::info!("Start to synchronize submissions of {}", user_name);

        let user = match self.store.find_user_by_name(user_name).await? {
            Some(user) => user,
            None => {
                tracing::error!("user {} is not registered", user_name);
                return Err(SyncError::UserNotFound(user_name.to_string()));
            }
        };

        let remote_id = self.judge.resolve_handle(&user.display_name).await?;
        let submissions = self.judge.list_submissions(remote_id).await?;

        let mut quests = Vec::with_capacity(submissions.len());
        let mut accepted_count = 0;
        for submission in submissions.iter() {
            let problem = self.judge.fetch_problem_meta(submission.problem_id).await?;
            let quest = mapper::map_submission(
                submission,
                &problem,
                &user.user_name,
                self.platform,
                self.policy,
            )
            .map_err(|e| {
                tracing::error!(
                    "failed to map submission {}: {}",
                    submission.submission_id,
                    e
                );
                e
            })?;

            if quest.status == ACCEPTED {
                accepted_count += 1;
            }
            quests.push(quest);
        }

        let summary = SyncSummary {
            accepted_count,
            total_count: quests.len() as i32,
        };
        self.store
            .record_sync(
                &user.user_name,
                &quests,
                summary.accepted_count,
                summary.total_count,
            )
            .await?;

        tracing::info!(
            "Submissions of {} synchronized: {} accepted out of {}.",
            user_name,
            summary.accepted_count,
            summary.total_count
        );

        Ok(summary)
    }
}
