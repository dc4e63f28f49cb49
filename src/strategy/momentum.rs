use super::{Strategy, StrategyKind, StrategySignal};
use crate::indicators::{
    last, obv_series, pct_change, require_len, rolling_mean, rolling_sum, IndicatorError,
};
use crate::models::{Candle, Signal};
use crate::series::{closes, volumes};
use std::collections::BTreeMap;

/// Lookbacks in periods, roughly 1, 3 and 6 months of daily candles
const LOOKBACKS: [(usize, f64); 3] = [(21, 0.4), (63, 0.3), (126, 0.3)];
const VOLUME_WINDOW: usize = 21;
const SCORE_THRESHOLD: f64 = 0.05;

/// Multi-horizon momentum with volume confirmation
///
/// Score is the weighted sum of cumulative returns over the three
/// lookbacks. A signal needs current volume above its 21-period average.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumStrategy;

impl Strategy for MomentumStrategy {
    fn evaluate(&self, candles: &[Candle]) -> Result<StrategySignal, IndicatorError> {
        require_len(candles.len(), self.min_candles_required())?;

        let returns = pct_change(&closes(candles));
        let cumulative: Vec<f64> = LOOKBACKS
            .iter()
            .map(|(window, _)| last(&rolling_sum(&returns, *window)))
            .collect();
        let score: f64 = cumulative
            .iter()
            .zip(LOOKBACKS)
            .map(|(ret, (_, weight))| ret * weight)
            .sum();

        let vols = volumes(candles);
        let volume_momentum = last(&vols) / last(&rolling_mean(&vols, VOLUME_WINDOW));
        let confirmed = volume_momentum > 1.0;

        let metrics = BTreeMap::from([
            ("momentum_1m".to_string(), cumulative[0]),
            ("momentum_3m".to_string(), cumulative[1]),
            ("momentum_6m".to_string(), cumulative[2]),
            ("volume_momentum".to_string(), volume_momentum),
            ("obv".to_string(), last(&obv_series(candles))),
        ]);

        let confidence = score.abs() * 5.0;
        let signal = if score > SCORE_THRESHOLD && confirmed {
            StrategySignal::new(Signal::Bullish, confidence, metrics)
        } else if score < -SCORE_THRESHOLD && confirmed {
            StrategySignal::new(Signal::Bearish, confidence, metrics)
        } else {
            StrategySignal::neutral(metrics)
        };
        Ok(signal)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Momentum
    }

    fn min_candles_required(&self) -> usize {
        // The first return is undefined
        LOOKBACKS[2].0 + 1
    }
}
