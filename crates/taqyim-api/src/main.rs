mod error;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use taqyim_core::IngestConfig;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .context("PORT must be a number")?;

    let state = AppState::new(&database_url, IngestConfig::default()).await?;

    let router = Router::new()
        .route("/api/tagging/upload", post(routes::upload))
        .route("/api/tagging/data", get(routes::list_data))
        .route("/api/tagging/review", post(routes::submit_review))
        .route("/api/tagging/stats", get(routes::get_stats))
        .route("/api/tagging/daily-stats", get(routes::daily_stats))
        .route("/api/tagging/reviewer-stats", get(routes::reviewer_stats))
        .route("/api/tagging/sessions", get(routes::upload_sessions))
        .with_state(state);

    let listener = TcpListener::bind((std::net::Ipv4Addr::UNSPECIFIED, port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
