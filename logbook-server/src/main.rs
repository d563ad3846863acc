use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use logbook_server::config::ServerConfig;
use logbook_server::logbook::Logbook;
use logbook_server::store::{JsonFileStore, LogbookStore, MemoryStore};
use logbook_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    // Persist to a file when one is configured, otherwise keep legs in memory
    let store: Arc<dyn LogbookStore> = match &config.store_path {
        Some(path) => match JsonFileStore::open(path) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to open logbook store");
                std::process::exit(1);
            }
        },
        None => {
            warn!("LOGBOOK_STORE not set; legs will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let logbook = Logbook::new(store);

    // Log store changes in the background
    let mut changes = logbook.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(event) => info!(?event, "logbook changed"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed logbook changes"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let app = create_router(AppState::new(logbook));

    let addr = config.addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(%addr, "flight logbook listening");
    info!("  GET    /health         - Health check");
    info!("  POST   /times/preview  - Normalize partially typed times");
    info!("  POST   /legs/validate  - Validate a leg without saving");
    info!("  GET    /legs           - List legs");
    info!("  POST   /legs           - Create a leg");
    info!("  PUT    /legs/:id       - Replace a leg");
    info!("  DELETE /legs/:id       - Delete a leg");
    info!("  POST   /import         - Import tokenized rows");
    info!("  GET    /stats          - Monthly and all-time totals");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
    }
    info!("shutting down");
}
