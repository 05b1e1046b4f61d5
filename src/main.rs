use std::sync::Arc;

use anyhow::Result;
use axum::{Router, routing::get};
use log::*;
use tokio::net::TcpListener;

use mathbrawl::config::{BackendConfig, GameConfig};
use mathbrawl::sample;
use mathbrawl::server::start_ws_server;
use mathbrawl::source::{HttpQuestionSource, QuestionSource, StaticQuestionSource};
use mathbrawl::stats::HttpStatsReporter;

async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    info!("Starting mathbrawl backend");

    let backend = BackendConfig::from_env()?;
    let game_config = GameConfig::default();
    let reporter = Arc::new(HttpStatsReporter::new(
        backend.stats_api_url.clone(),
        backend.user_id.clone(),
        backend.game_id,
    ));

    let ws_listener = TcpListener::bind(&backend.listen_addr).await?;
    let health_listener = TcpListener::bind(&backend.health_addr).await?;

    match backend.question_api_url.clone() {
        Some(url) => {
            let source = Arc::new(HttpQuestionSource::new(url));
            serve(ws_listener, health_listener, game_config, backend, source, reporter).await
        }
        None => {
            info!("No QUESTION_API_URL set, serving the built-in question set");
            let source = Arc::new(StaticQuestionSource::new(sample::arithmetic_questions()));
            serve(ws_listener, health_listener, game_config, backend, source, reporter).await
        }
    }
}

async fn serve<S: QuestionSource>(
    ws_listener: TcpListener,
    health_listener: TcpListener,
    game_config: GameConfig,
    backend: BackendConfig,
    source: Arc<S>,
    reporter: Arc<HttpStatsReporter>,
) -> Result<()> {
    let health_app = Router::new().route("/health", get(health_check));

    tokio::select! {
        _ = start_ws_server(
            ws_listener,
            game_config,
            backend.question_category,
            source,
            reporter,
        ) => {},
        result = axum::serve(health_listener, health_app) => {
            result?;
        },
    }

    Ok(())
}
