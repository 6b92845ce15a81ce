//! Axum server construction.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use gridclip_chain::JsonRpcProvider;
use gridclip_db::init_pool;

use crate::cache::LogCacheService;
use crate::config::Config;

pub mod error;
pub mod routes_logs;

/// Shared application context (Axum state). Cheaply cloneable.
#[derive(Clone)]
pub struct AppContext {
    /// The reconciliation service; `None` when no RPC endpoint is
    /// configured, in which case the log endpoint answers 500.
    pub cache: Option<Arc<LogCacheService>>,
}

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/logs", get(routes_logs::get_logs))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "not found"})),
    )
}

/// Start the HTTP server and block until shutdown.
pub async fn start_server(config: Config) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let cache = match config.rpc.url {
        Some(ref url) => {
            let contract = config
                .rpc
                .contract
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid contract address: {e}"))?;
            let provider = Arc::new(JsonRpcProvider::new(url.clone(), contract));

            let db_path = shellexpand::tilde(&config.cache.db_path).into_owned();
            tracing::info!("Opening cache database at {db_path}");
            let db = init_pool(&db_path)?;

            Some(Arc::new(LogCacheService::new(
                db,
                provider,
                &config.rpc,
                &config.cache,
            )))
        }
        None => {
            tracing::warn!("No RPC endpoint configured; log endpoint will answer 500");
            None
        }
    };

    let app = build_router(AppContext { cache });

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
