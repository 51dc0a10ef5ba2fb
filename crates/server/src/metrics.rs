//! Prometheus metrics

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Idempotent; later calls return the
/// already-installed handle.
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Render the current metric values.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Count one handled request.
pub fn record_request(endpoint: &'static str) {
    metrics::counter!("leaddesk_requests_total", "endpoint" => endpoint).increment(1);
}

/// Count one request error.
pub fn record_error(endpoint: &'static str) {
    metrics::counter!("leaddesk_errors_total", "endpoint" => endpoint).increment(1);
}
