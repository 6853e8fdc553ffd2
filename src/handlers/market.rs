use axum::{extract::State, Json};
use serde::Serialize;

use crate::app_state::AppState;
use crate::domain::MarketError;

#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub message: &'static str,
    pub updated: usize,
}

/// Runs one random-walk pass over the catalog.
pub async fn simulate_market(
    State(state): State<AppState>,
) -> Result<Json<SimulateResponse>, MarketError> {
    // ---
    let report = state.market().simulate().await?;
    state.metrics().record_market_simulation(report.updated);

    tracing::info!(
        "Market simulation repriced {} cards, skipped {}",
        report.updated,
        report.skipped
    );

    Ok(Json(SimulateResponse {
        message: "Market simulated",
        updated: report.updated,
    }))
}
