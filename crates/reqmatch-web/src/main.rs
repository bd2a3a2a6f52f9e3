use std::sync::Arc;

use reqmatch_core::{Config, DirectoryStore, HistoryStore, config_file};
use reqmatch_pdf_mupdf::MupdfBackend;
use tracing_subscriber::EnvFilter;

mod app;
mod error;
mod handlers;
mod models;
mod state;
mod template;
mod upload;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Config::resolve(&config_file::load_config());
    let store = DirectoryStore::open(&config.upload_dir)?;
    let history = HistoryStore::new(&config.history_path);

    // Fail at startup rather than on the first dashboard visit.
    let saved = history.load()?;
    tracing::info!(
        upload_dir = %config.upload_dir.display(),
        history = %config.history_path.display(),
        saved_runs = saved.len(),
        "loaded configuration"
    );

    let bind = config.bind.clone();
    let state = Arc::new(AppState {
        config,
        store,
        history,
        backend: Arc::new(MupdfBackend::new()),
    });

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(addr = %bind, "listening");
    axum::serve(listener, app::router(state)).await?;

    Ok(())
}
