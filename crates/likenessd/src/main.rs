use anyhow::Result;
use likenessd::config::Config;
use likenessd::server::AppState;
use likenessd::storage::UploadStore;
use likenessd::{engine, server};
use likeness_core::OnnxFaceAnalyzer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    tracing::info!(
        bind = %config.bind_addr,
        model_dir = %config.model_dir.display(),
        threshold = config.match_threshold,
        "likenessd starting"
    );

    // Fail fast: both models must load before the server accepts requests.
    let analyzer = OnnxFaceAnalyzer::load(&config.model_dir)?;
    let engine = engine::spawn_engine(analyzer);

    let state = Arc::new(AppState {
        engine,
        store: UploadStore::new(config.upload_dir.clone()),
        match_threshold: config.match_threshold,
    });

    let app = server::router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "likenessd ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("likenessd shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
