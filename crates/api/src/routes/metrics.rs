//! Prometheus metrics endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use lending::TransactionFilter;
use metrics_exporter_prometheus::PrometheusHandle;

use super::AppState;

/// State for the metrics route: the exporter handle plus the lending state
/// sampled into gauges on each scrape.
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
    pub app: Arc<AppState>,
}

/// GET /metrics: returns Prometheus-formatted metrics.
pub async fn get(State(state): State<MetricsState>) -> impl IntoResponse {
    let items = state.app.service.list_items().await;
    let on_loan: u64 = items.iter().map(|item| u64::from(item.borrowed)).sum();
    let open_loans = state
        .app
        .service
        .list_transactions(TransactionFilter::OpenOnly)
        .await
        .len();

    metrics::gauge!("catalog_items").set(items.len() as f64);
    metrics::gauge!("lending_units_on_loan").set(on_loan as f64);
    metrics::gauge!("lending_open_loans").set(open_loans as f64);

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.handle.render(),
    )
}
