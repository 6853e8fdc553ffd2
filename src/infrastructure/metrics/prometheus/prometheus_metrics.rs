//! Prometheus metrics implementation.
//!
//! Delegates to the sibling `counters.rs` and `recorder.rs` helpers, which
//! talk to the global `metrics` crate registry. A single global handle
//! renders everything collected in Prometheus text format.

use crate::domain::Metrics;
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Empty because metrics are registered globally through `counter!()` and
/// `histogram!()`; the recorder handle lives in `recorder.rs`.
pub struct PrometheusMetrics {
    // Empty - uses global metrics registry pattern
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_user_registered(&self) {
        tracing::debug!("Recording user registered event");
        super::increment_user_registered();
    }

    fn record_card_created(&self) {
        tracing::debug!("Recording card created event");
        super::increment_card_created();
    }

    fn record_market_simulation(&self, cards_repriced: usize) {
        tracing::debug!("Recording market simulation of {} cards", cards_repriced);
        super::record_market_run(cards_repriced);
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}
