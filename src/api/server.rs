use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::ingest::{get_report, health, ingest_report};
use super::state::AppState;
use super::validate::validate_integration;
use crate::config::{Config, StorageProvider};
use crate::ledger::ReportStore;
use crate::storage::StorageClient;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the application router for the given state.
///
/// Split out from [`run`] so integration tests can drive the router with
/// `tower::ServiceExt::oneshot` instead of a real listener.
pub fn router(state: AppState) -> Router {
    // The capture widget posts from arbitrary customer origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // A report form carries a handful of parts, each individually bounded
    let body_limit = state.config.server.max_upload_bytes.as_u64() as usize;
    let body_limit = body_limit.saturating_mul(4).saturating_add(64 * 1024);

    Router::new()
        .route("/api/ingest", post(ingest_report))
        .route("/api/reports/{report_id}", get(get_report))
        .route("/api/validate-integration", post(validate_integration))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    info!(path = %config.server.fjall_path.display(), "Opening report store");
    let store = ReportStore::open(&config.server.fjall_path)
        .map_err(|e| format!("Failed to open report store: {}", e))?;

    // Configured projects are the source of truth; re-seed on every boot
    for (key, project) in &config.projects {
        store
            .put_project(&project.to_record(key))
            .map_err(|e| format!("Failed to register project {}: {}", key, e))?;
    }
    info!(projects = config.projects.len(), "Project registry seeded");

    let storage = match config.storage.provider {
        StorageProvider::Memory => StorageClient::in_memory(),
        StorageProvider::Local => {
            let root = config
                .storage
                .root
                .clone()
                .ok_or("storage.root is required for the local provider")?;
            StorageClient::local(&root)
                .map_err(|e| format!("Failed to open attachment storage: {}", e))?
        }
    };

    let address = config.server.bind_addr;
    let state = AppState::new(config, store, storage);
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "QuickBug API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
