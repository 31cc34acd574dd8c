use crate::{
    cmd::connect_database,
    modules::{
        config::SyncConfig,
        handlers::{liveness, quest, readiness, sync, user, AppState},
        store::PgQuestStore,
    },
};
use anyhow::{Context, Result};
use axum::{extract::Extension, routing, Router, Server};
use clap::Args;
use questlog_libs::judge::{CachedJudgeClient, UHuntClient};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let config = SyncConfig::from_env();
    let pool = connect_database().await?;

    tracing::info!("Connect to judge API at {}", config.judge_url);
    let judge = UHuntClient::new(&config.judge_url, config.request_timeout).with_context(|| {
        let message = format!(
            "couldn't create judge client. check the value of UHUNT_API_URL environment variable: `{}`",
            config.judge_url
        );
        tracing::error!(message);
        message
    })?;

    let state = AppState {
        store: Arc::new(PgQuestStore::new(pool)),
        judge: Arc::new(CachedJudgeClient::new(judge)),
        config,
    };
    let app = create_router(Arc::new(state));

    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 8000");
            8000u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| {
            let message = format!("server at port {} stopped unexpectedly", port);
            tracing::error!(message);
            message
        })?;

    Ok(())
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/sync", routing::post(sync::synchronize))
        .route(
            "/api/quest",
            routing::get(quest::list_quests).post(quest::create_quest),
        )
        .route(
            "/api/quest/:quest_id",
            routing::get(quest::get_quest)
                .put(quest::update_quest)
                .delete(quest::delete_quest),
        )
        .route(
            "/api/user",
            routing::get(user::list_users).post(user::create_user),
        )
        .route(
            "/api/user/:user_id",
            routing::get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        .route("/api/user_quests/:user_name", routing::get(user::user_quests))
        .route("/api/reserve", routing::post(user::reserve))
        .route("/api/cancel", routing::post(user::cancel))
        .route("/api/liveness", routing::get(liveness))
        .route("/api/readiness", routing::get(readiness))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("SIGINT signal received, starting graceful shutdown.");
}
