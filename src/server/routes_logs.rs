//! The log-cache endpoint.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use gridclip_core::LogEntry;

use crate::cache::CacheSource;
use crate::server::error::AppError;
use crate::server::AppContext;

/// Response body of `GET /api/logs`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    /// Deduplicated entries, newest first.
    pub logs: Vec<LogEntry>,
    /// Chain height the returned set covers.
    pub cached_up_to_block: u64,
    pub total_logs: usize,
    /// Which tier or fetch path served the request.
    pub source: CacheSource,
    /// When this response was assembled (ISO-8601).
    pub cache_timestamp: String,
}

/// Reconcile the cache tiers against the chain and return the merged set.
pub async fn get_logs(State(ctx): State<AppContext>) -> Result<Json<LogsResponse>, AppError> {
    let Some(cache) = ctx.cache.as_ref() else {
        return Err(AppError::new(gridclip_core::Error::internal(
            "RPC provider not configured",
        )));
    };

    let outcome = cache.reconcile().await?;

    Ok(Json(LogsResponse {
        total_logs: outcome.logs.len(),
        cached_up_to_block: outcome.covered_through_block,
        source: outcome.source,
        cache_timestamp: Utc::now().to_rfc3339(),
        logs: outcome.logs,
    }))
}
