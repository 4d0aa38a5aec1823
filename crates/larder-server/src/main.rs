mod config;

use std::sync::Arc;

use tracing::info;

use larder_api::state::AppStateInner;
use larder_db::Database;
use larder_gateway::Gateway;
use larder_gateway::dispatcher::Dispatcher;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "larder=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // A store we cannot open or migrate is fatal: nothing is served.
    let db = Arc::new(Database::open(&config.db_path)?);

    let gateway = Gateway::new(db, Dispatcher::new());
    let state = Arc::new(AppStateInner {
        gateway,
        uploads: config.uploads.clone(),
    });
    if state.uploads.is_none() {
        info!("Upload signing disabled (credentials not set)");
    }

    let app = larder_api::router(state, &config.public_dir);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Larder listening on {}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
