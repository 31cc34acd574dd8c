use crate::{
    cmd::connect_database,
    modules::{config::SyncConfig, store::PgQuestStore, sync::SyncEngine},
};
use anyhow::{Context, Result};
use clap::Args;
use questlog_libs::judge::{UHuntClient, UnknownStatusPolicy};

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Local user whose judge history is pulled.
    user_name: String,
    /// Overrides UNKNOWN_STATUS_POLICY (abort or sentinel).
    #[arg(long)]
    unknown_status: Option<UnknownStatusPolicy>,
}

pub async fn run(args: SyncArgs) -> Result<()> {
    let mut config = SyncConfig::from_env();
    if let Some(policy) = args.unknown_status {
        config.policy = policy;
    }

    let pool = connect_database().await?;
    let store = PgQuestStore::new(pool);
    let judge = UHuntClient::new(&config.judge_url, config.request_timeout).with_context(|| {
        let message = format!("couldn't create judge client for `{}`", config.judge_url);
        tracing::error!(message);
        message
    })?;

    let engine = SyncEngine::new(&store, &judge, &config.platform, config.policy);
    let summary = engine.synchronize(&args.user_name).await.with_context(|| {
        let message = format!("synchronization of {} failed", args.user_name);
        tracing::error!(message);
        message
    })?;

    tracing::info!(
        "{} synchronized: {} accepted out of {} submissions",
        args.user_name,
        summary.accepted_count,
        summary.total_count
    );

    Ok(())
}
