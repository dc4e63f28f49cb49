use super::{Strategy, StrategyKind, StrategySignal};
use crate::indicators::{
    atr_series, last, pct_change, require_len, rolling_mean, rolling_std, IndicatorError,
};
use crate::models::{Candle, Signal};
use crate::series::closes;
use std::collections::BTreeMap;

const VOL_WINDOW: usize = 21;
const REGIME_WINDOW: usize = 63;
const ANNUALIZATION: f64 = 252.0;

/// Volatility regime: compares realized volatility with its own history.
///
/// A quiet regime (ratio < 0.8, z < -1) tends to expand and reads bullish;
/// an excited regime (ratio > 1.2, z > 1) tends to contract and reads bearish.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolatilityStrategy;

impl Strategy for VolatilityStrategy {
    fn evaluate(&self, candles: &[Candle]) -> Result<StrategySignal, IndicatorError> {
        require_len(candles.len(), self.min_candles_required())?;

        let prices = closes(candles);
        let returns = pct_change(&prices);

        let hist_vol: Vec<f64> = rolling_std(&returns, VOL_WINDOW)
            .into_iter()
            .map(|std| std * ANNUALIZATION.sqrt())
            .collect();
        let current_vol = last(&hist_vol);
        let vol_ma = last(&rolling_mean(&hist_vol, REGIME_WINDOW));
        let vol_std = last(&rolling_std(&hist_vol, REGIME_WINDOW));

        let regime = current_vol / vol_ma;
        let vol_z = (current_vol - vol_ma) / vol_std;
        let atr_ratio = last(&atr_series(candles, 14)) / last(&prices);

        let metrics = BTreeMap::from([
            ("historical_volatility".to_string(), current_vol),
            ("volatility_regime".to_string(), regime),
            ("volatility_z_score".to_string(), vol_z),
            ("atr_ratio".to_string(), atr_ratio),
        ]);

        let confidence = vol_z.abs() / 3.0;
        let signal = if regime < 0.8 && vol_z < -1.0 {
            StrategySignal::new(Signal::Bullish, confidence, metrics)
        } else if regime > 1.2 && vol_z > 1.0 {
            StrategySignal::new(Signal::Bearish, confidence, metrics)
        } else {
            StrategySignal::neutral(metrics)
        };
        Ok(signal)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Volatility
    }

    fn min_candles_required(&self) -> usize {
        // One undefined return, a full volatility window, then a full
        // regime window of volatility readings
        VOL_WINDOW + REGIME_WINDOW
    }
}
