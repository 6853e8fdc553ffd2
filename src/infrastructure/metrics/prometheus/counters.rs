use metrics::{counter, histogram};
use std::time::Instant;

pub fn increment_user_registered() {
    counter!("users_registered_total").increment(1);
}

pub fn increment_card_created() {
    counter!("cards_created_total").increment(1);
}

/// Count one simulation pass and the cards it repriced.
pub fn record_market_run(cards_repriced: usize) {
    counter!("market_simulations_total").increment(1);
    counter!("market_cards_repriced_total").increment(cards_repriced as u64);
}

/// Track HTTP request latency using a histogram labelled by route, method and status.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "http_request_duration_seconds",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
}
