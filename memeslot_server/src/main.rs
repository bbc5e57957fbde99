use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod error;
mod game;
mod routes;

use crate::config::Config;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db = db::connect(&config.database_url, 5).await?;
    db::init_db(&db).await?;

    let game = config.build_game(db).await?;
    if game.auto_connect().await {
        info!("player wallet connected at start-up");
    }

    let state = Arc::new(AppState {
        game,
        api_key: config.api_key.clone(),
    });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("listening on {}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
