//! Rabbithole production server.
//!
//! Reads configuration from environment variables (see [`config::Config`]),
//! restores the sentence and vector history from the data directory, starts
//! the background embedding pipeline, then serves the HTTP API until SIGINT.
//!
//! ## Quick start
//!
//! ```bash
//! # Development (local data dir, port 8080, hash embeddings)
//! cargo run --bin rabbithole-server --release
//!
//! # Custom config
//! RABBITHOLE_PORT=9090 \
//! RABBITHOLE_DATA_DIR=/var/lib/rabbithole \
//! RABBITHOLE_EDIT_TOKEN=hunter2 \
//! RABBITHOLE_EMBED_BACKEND=remote \
//! RABBITHOLE_EMBED_URL=http://localhost:11434/v1/embeddings \
//!   cargo run --bin rabbithole-server --release
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use rabbithole_core::{SentenceLedger, SentenceStore};
use rabbithole_server::api::{self, AppState};
use rabbithole_server::auth::EditTokenGuard;
use rabbithole_server::config::Config;
use rabbithole_server::metrics::OperationMetrics;
use rabbithole_server::orchestrator::{self, Trajectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .compact()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir,
        port = config.port,
        "rabbithole starting"
    );

    let data_dir = PathBuf::from(&config.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let ledger = SentenceLedger::open(SentenceStore::open(&data_dir));
    if !ledger.current().is_empty() {
        info!(
            words = ledger.current().split_whitespace().count(),
            "sentence restored"
        );
    }

    let trajectory = Trajectory::open(&data_dir);
    info!(
        vectors = trajectory.vectors.len(),
        projected = trajectory.projection.all().len(),
        "vector history loaded"
    );

    let vectorizer =
        rabbithole_embed::from_env().map_err(|e| anyhow::anyhow!("embed backend: {e}"))?;
    info!(dim = vectorizer.dimension(), "embedding backend ready");

    let metrics = Arc::new(OperationMetrics::new());
    let auth = Arc::new(EditTokenGuard::new(config.edit_token.clone()));
    let trajectory = Arc::new(Mutex::new(trajectory));
    let jobs = orchestrator::spawn_worker(vectorizer, Arc::clone(&trajectory), Arc::clone(&metrics));

    let state = AppState {
        ledger: Arc::new(RwLock::new(ledger)),
        trajectory,
        jobs,
        auth,
        metrics,
    };
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "rabbithole listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received SIGINT, shutting down");
        })
        .await?;

    info!("rabbithole shutdown complete");
    Ok(())
}
