use crate::{
    modules::store::{QuestStore, Result, StoreError},
    types::tables::{NewQuest, NewUser, Quest, QuestPatch, User, UserPatch},
};
use async_trait::async_trait;
use questlog_libs::ColumnList;
use sqlx::{postgres::Postgres, Pool};

#[derive(Clone)]
pub struct PgQuestStore {
    pool: Pool<Postgres>,
}

impl PgQuestStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn ensure_user(&self, user_name: &str) -> Result<()> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM "users" WHERE "user_name" = $1);"#)
                .bind(user_name)
                .fetch_one(&self.pool)
                .await?;

        if exists {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("user {}", user_name)))
        }
    }
}

/// 一意制約違反(23505)をConflictとして扱う
fn conflict_or_database(e: sqlx::Error, subject: impl ToString) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            StoreError::Conflict(subject.to_string())
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl QuestStore for PgQuestStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1;").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_quests(&self, submitter: Option<&str>) -> Result<Vec<Quest>> {
        let sql = format!(
            r#"
            SELECT {} FROM "quests"
            WHERE $1::TEXT IS NULL OR "submitter" = $1
            ORDER BY "quest_id";
            "#,
            Quest::column_list()
        );
        let quests: Vec<Quest> = sqlx::query_as(&sql)
            .bind(submitter)
            .fetch_all(&self.pool)
            .await?;

        Ok(quests)
    }

    async fn get_quest(&self, quest_id: i32) -> Result<Option<Quest>> {
        let sql = format!(
            r#"SELECT {} FROM "quests" WHERE "quest_id" = $1;"#,
            Quest::column_list()
        );
        let quest: Option<Quest> = sqlx::query_as(&sql)
            .bind(quest_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quest)
    }

    async fn create_quest(&self, quest: &NewQuest) -> Result<Quest> {
        let sql = format!(
            r#"
            INSERT INTO "quests" ("submission_id", "problem_number", "title", "status", "submitted_at", "run_time", "submitter", "platform")
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {};
            "#,
            Quest::column_list()
        );
        let quest: Quest = sqlx::query_as(&sql)
            .bind(quest.submission_id)
            .bind(quest.problem_number)
            .bind(&quest.title)
            .bind(&quest.status)
            .bind(quest.submitted_at)
            .bind(quest.run_time)
            .bind(&quest.submitter)
            .bind(&quest.platform)
            .fetch_one(&self.pool)
            .await?;

        Ok(quest)
    }

    async fn update_quest(&self, quest_id: i32, patch: &QuestPatch) -> Result<Option<Quest>> {
        let sql = format!(
            r#"
            UPDATE "quests" SET
                "problem_number" = COALESCE($2, "problem_number"),
                "title" = COALESCE($3, "title"),
                "status" = COALESCE($4, "status"),
                "submitted_at" = COALESCE($5, "submitted_at"),
                "run_time" = COALESCE($6, "run_time"),
                "submitter" = COALESCE($7, "submitter"),
                "platform" = COALESCE($8, "platform"),
                "updated_at" = CURRENT_TIMESTAMP
            WHERE "quest_id" = $1
            RETURNING {};
            "#,
            Quest::column_list()
        );
        let quest: Option<Quest> = sqlx::query_as(&sql)
            .bind(quest_id)
            .bind(patch.problem_number)
            .bind(&patch.title)
            .bind(&patch.status)
            .bind(patch.submitted_at)
            .bind(patch.run_time)
            .bind(&patch.submitter)
            .bind(&patch.platform)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quest)
    }

    async fn delete_quest(&self, quest_id: i32) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM "quests" WHERE "quest_id" = $1;"#)
            .bind(quest_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!(
            r#"SELECT {} FROM "users" ORDER BY "user_id";"#,
            User::column_list()
        );
        let users: Vec<User> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        Ok(users)
    }

    async fn get_user(&self, user_id: i32) -> Result<Option<User>> {
        let sql = format!(
            r#"SELECT {} FROM "users" WHERE "user_id" = $1;"#,
            User::column_list()
        );
        let user: Option<User> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>> {
        let sql = format!(
            r#"SELECT {} FROM "users" WHERE "user_name" = $1;"#,
            User::column_list()
        );
        let user: Option<User> = sqlx::query_as(&sql)
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO "users" ("user_name", "display_name")
            VALUES ($1, $2)
            RETURNING {};
            "#,
            User::column_list()
        );
        sqlx::query_as(&sql)
            .bind(&user.user_name)
            .bind(&user.display_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_database(e, format!("user {}", user.user_name)))
    }

    async fn update_user(&self, user_id: i32, patch: &UserPatch) -> Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE "users" SET
                "user_name" = COALESCE($2, "user_name"),
                "display_name" = COALESCE($3, "display_name"),
                "updated_at" = CURRENT_TIMESTAMP
            WHERE "user_id" = $1
            RETURNING {};
            "#,
            User::column_list()
        );
        sqlx::query_as(&sql)
            .bind(user_id)
            .bind(&patch.user_name)
            .bind(&patch.display_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                conflict_or_database(
                    e,
                    format!("user {}", patch.user_name.as_deref().unwrap_or_default()),
                )
            })
    }

    async fn delete_user(&self, user_id: i32) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM "users" WHERE "user_id" = $1;"#)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reserve_quest(&self, user_name: &str, quest_id: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE "users" SET
                "reserved_quests" = array_append("reserved_quests", $2),
                "updated_at" = CURRENT_TIMESTAMP
            WHERE "user_name" = $1 AND NOT ($2 = ANY("reserved_quests"));
            "#,
        )
        .bind(user_name)
        .bind(quest_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            self.ensure_user(user_name).await?;
            return Ok(false);
        }

        Ok(true)
    }

    async fn cancel_reservation(&self, user_name: &str, quest_id: i32) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE "users" SET
                "reserved_quests" = array_remove("reserved_quests", $2),
                "updated_at" = CURRENT_TIMESTAMP
            WHERE "user_name" = $1 AND $2 = ANY("reserved_quests");
            "#,
        )
        .bind(user_name)
        .bind(quest_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            self.ensure_user(user_name).await?;
            return Ok(false);
        }

        Ok(true)
    }

    /// 同期結果をひとつのトランザクションで保存するメソッド
    ///
    /// 提出を1件ずつINSERTしたあと、ユーザのAC数と提出数を上書きする。
    /// 途中でエラーが発生した場合はロールバックして何も保存しない。
    async fn record_sync(
        &self,
        user_name: &str,
        quests: &[NewQuest],
        accepted_count: i32,
        total_count: i32,
    ) -> Result<()> {
        tracing::info!(
            "Start to save {} quests submitted by {}.",
            quests.len(),
            user_name
        );

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("failed to start transaction cause: {:?}", e);
            e
        })?;

        for quest in quests.iter() {
            let result = sqlx::query(
                r#"
                INSERT INTO "quests" ("submission_id", "problem_number", "title", "status", "submitted_at", "run_time", "submitter", "platform")
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
                "#,
            )
            .bind(quest.submission_id)
            .bind(quest.problem_number)
            .bind(&quest.title)
            .bind(&quest.status)
            .bind(quest.submitted_at)
            .bind(quest.run_time)
            .bind(&quest.submitter)
            .bind(&quest.platform)
            .execute(&mut tx)
            .await;

            // エラーが発生したらトランザクションをロールバックしてエラーを早期リターンする
            if let Err(e) = result {
                tracing::error!("an error occurred: {:?}, at saving {:?}", e, quest);
                tx.rollback().await?;
                return Err(e.into());
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE "users" SET
                "accepted_count" = $2,
                "total_count" = $3,
                "updated_at" = CURRENT_TIMESTAMP
            WHERE "user_name" = $1;
            "#,
        )
        .bind(user_name)
        .bind(accepted_count)
        .bind(total_count)
        .execute(&mut tx)
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => {}
            Ok(_) => {
                tracing::error!("user {} disappeared during synchronization", user_name);
                tx.rollback().await?;
                return Err(StoreError::NotFound(format!("user {}", user_name)));
            }
            Err(e) => {
                tracing::error!("failed to update counters of {}: {:?}", user_name, e);
                tx.rollback().await?;
                return Err(e.into());
            }
        }

        tx.commit().await?;
        tracing::info!(
            "{} quests of {} successfully saved ({} accepted).",
            quests.len(),
            user_name,
            accepted_count
        );

        Ok(())
    }
}
