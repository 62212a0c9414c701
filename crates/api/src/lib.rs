//! HTTP API server with observability for the lending ledger.
//!
//! Exposes catalog maintenance, borrow/return and loan history as REST
//! endpoints, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use lending::{LendingPolicy, LoanService};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;
use routes::metrics::MetricsState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(MetricsState {
            handle: metrics_handle,
            app: state.clone(),
        });

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/items", get(routes::items::list).post(routes::items::add))
        .route(
            "/items/{id}",
            get(routes::items::get).delete(routes::items::remove),
        )
        .route("/items/{id}/reduce", post(routes::items::reduce))
        .route("/loans/borrow", post(routes::loans::borrow))
        .route("/loans/return", post(routes::loans::give_back))
        .route("/transactions", get(routes::loans::transactions))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state around a fresh lending service.
pub fn create_state(policy: LendingPolicy) -> Arc<AppState> {
    Arc::new(AppState {
        service: LoanService::new(policy),
    })
}
