use super::{Strategy, StrategyKind, StrategySignal};
use crate::indicators::{adx_series, ema_series, ichimoku, last, macd, require_len, IndicatorError};
use crate::models::{Candle, Signal};
use crate::series::closes;
use std::collections::BTreeMap;

const ADX_PERIOD: usize = 14;

/// Trend following across three EMA horizons
///
/// - Bullish: EMA(8) > EMA(21) > EMA(55)
/// - Bearish: EMA(8) < EMA(21) < EMA(55)
///
/// Confidence is ADX(14) / 100 when the horizons agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendStrategy;

impl Strategy for TrendStrategy {
    fn evaluate(&self, candles: &[Candle]) -> Result<StrategySignal, IndicatorError> {
        require_len(candles.len(), self.min_candles_required())?;

        let prices = closes(candles);
        let ema_8 = last(&ema_series(&prices, 8));
        let ema_21 = last(&ema_series(&prices, 21));
        let ema_55 = last(&ema_series(&prices, 55));

        let directional = adx_series(candles, ADX_PERIOD);
        let adx = last(&directional.adx);
        let trend_strength = adx / 100.0;

        let (macd_line, macd_signal) = macd(&prices);
        let cloud = ichimoku(candles);

        let metrics = BTreeMap::from([
            ("adx".to_string(), adx),
            ("trend_strength".to_string(), trend_strength),
            ("plus_di".to_string(), last(&directional.plus_di)),
            ("minus_di".to_string(), last(&directional.minus_di)),
            ("macd".to_string(), last(&macd_line)),
            ("macd_signal".to_string(), last(&macd_signal)),
            ("tenkan_sen".to_string(), last(&cloud.conversion)),
            ("kijun_sen".to_string(), last(&cloud.base)),
        ]);

        let short_up = ema_8 > ema_21;
        let medium_up = ema_21 > ema_55;

        let signal = if short_up && medium_up {
            StrategySignal::new(Signal::Bullish, trend_strength, metrics)
        } else if !short_up && !medium_up {
            StrategySignal::new(Signal::Bearish, trend_strength, metrics)
        } else {
            StrategySignal::neutral(metrics)
        };
        Ok(signal)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Trend
    }

    fn min_candles_required(&self) -> usize {
        55
    }
}
