//! Random-walk price simulator.
//!
//! Each pass nudges every priced card by a uniform delta and saves it on
//! its own. There is no batching and no rollback: a failure part-way
//! leaves earlier cards repriced.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::domain::{MarketError, PriceSample, RepositoryPtr};

/// Largest absolute price change applied in one pass.
pub const MAX_DAILY_MOVE: f64 = 5.0;

/// Prices never fall below this.
pub const PRICE_FLOOR: f64 = 1.0;

/// Outcome of one simulation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// Cards that received a new price sample.
    pub updated: usize,
    /// Cards left alone: no current price, or deleted mid-run.
    pub skipped: usize,
}

#[derive(Clone)]
pub struct MarketSimulator {
    // ---
    repository: RepositoryPtr,
}

impl MarketSimulator {
    // ---
    pub fn new(repository: RepositoryPtr) -> Self {
        Self { repository }
    }

    /// Runs one pass with a freshly seeded generator.
    pub async fn simulate(&self) -> Result<SimulationReport, MarketError> {
        // ---
        let mut rng = StdRng::from_entropy();
        self.simulate_with(&mut rng).await
    }

    /// Runs one pass drawing deltas from `rng`.
    pub async fn simulate_with<R>(&self, rng: &mut R) -> Result<SimulationReport, MarketError>
    where
        R: Rng + Send,
    {
        // ---
        let cards = self
            .repository
            .list_cards()
            .await
            .map_err(MarketError::from_store)?;

        let mut report = SimulationReport::default();

        for card in cards {
            let Some(price) = card.price else {
                tracing::debug!("Skipping unpriced card {}", card.id);
                report.skipped += 1;
                continue;
            };

            let delta = rng.gen_range(-MAX_DAILY_MOVE..=MAX_DAILY_MOVE);
            let next = (price + delta).max(PRICE_FLOOR);

            let matched = self
                .repository
                .record_price(card.id, PriceSample::now(next))
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Simulation stopped at card {} after {} updates: {:#}",
                        card.id,
                        report.updated,
                        e
                    );
                    MarketError::from_store(e)
                })?;

            if matched {
                report.updated += 1;
            } else {
                tracing::warn!("Card {} vanished during simulation", card.id);
                report.skipped += 1;
            }
        }

        tracing::info!(
            "Market simulated: {} updated, {} skipped",
            report.updated,
            report.skipped
        );
        Ok(report)
    }
}
