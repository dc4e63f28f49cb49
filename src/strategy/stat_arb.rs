use super::{Strategy, StrategyKind, StrategySignal};
use crate::indicators::{
    hurst_exponent, last, pct_change, require_len, rolling_kurt, rolling_skew, IndicatorError,
};
use crate::models::{Candle, Signal};
use crate::series::closes;
use std::collections::BTreeMap;

const DISTRIBUTION_WINDOW: usize = 63;
const MEAN_REVERTING_BELOW: f64 = 0.4;

/// Statistical arbitrage on the shape of the return distribution.
///
/// Only fires in a mean-reverting regime (Hurst < 0.4): positive return skew
/// reads bullish, negative skew bearish. Confidence grows as Hurst falls
/// below 0.5.
#[derive(Debug, Clone, Copy)]
pub struct StatArbStrategy {
    max_lag: usize,
}

impl Default for StatArbStrategy {
    fn default() -> Self {
        Self { max_lag: 20 }
    }
}

impl StatArbStrategy {
    pub fn new(max_lag: usize) -> Self {
        Self { max_lag }
    }
}

impl Strategy for StatArbStrategy {
    fn evaluate(&self, candles: &[Candle]) -> Result<StrategySignal, IndicatorError> {
        require_len(candles.len(), self.min_candles_required())?;

        let prices = closes(candles);
        let returns = pct_change(&prices);
        let skew = last(&rolling_skew(&returns, DISTRIBUTION_WINDOW));
        let kurt = last(&rolling_kurt(&returns, DISTRIBUTION_WINDOW));
        let hurst = hurst_exponent(&prices, self.max_lag);

        let metrics = BTreeMap::from([
            ("hurst_exponent".to_string(), hurst),
            ("skewness".to_string(), skew),
            ("kurtosis".to_string(), kurt),
        ]);

        let mean_reverting = hurst < MEAN_REVERTING_BELOW;
        let confidence = (0.5 - hurst) * 2.0;
        let signal = if mean_reverting && skew > 1.0 {
            StrategySignal::new(Signal::Bullish, confidence, metrics)
        } else if mean_reverting && skew < -1.0 {
            StrategySignal::new(Signal::Bearish, confidence, metrics)
        } else {
            StrategySignal::neutral(metrics)
        };
        Ok(signal)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::StatArb
    }

    fn min_candles_required(&self) -> usize {
        DISTRIBUTION_WINDOW + 1
    }
}
