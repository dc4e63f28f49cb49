// Candle-series helpers
pub mod synthetic;

pub use synthetic::{MarketScenario, SyntheticSeries};

use crate::models::Candle;

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}
