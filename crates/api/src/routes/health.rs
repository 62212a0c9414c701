//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use lending::TransactionFilter;
use serde::Serialize;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub items: usize,
    pub open_loans: usize,
}

/// GET /health: returns service status with catalog and ledger sizes.
///
/// Reports `"degraded"` if open loans no longer add up to borrowed stock.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = match state.service.verify_consistency().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::error!(error = %err, "ledger consistency check failed");
            "degraded"
        }
    };
    let items = state.service.list_items().await.len();
    let open_loans = state
        .service
        .list_transactions(TransactionFilter::OpenOnly)
        .await
        .len();

    Json(HealthResponse {
        status,
        items,
        open_loans,
    })
}
