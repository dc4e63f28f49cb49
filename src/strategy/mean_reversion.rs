use super::{Strategy, StrategyKind, StrategySignal};
use crate::indicators::{
    bollinger_bands, last, require_len, rolling_mean, rolling_std, rsi_series, IndicatorError,
};
use crate::models::{Candle, Signal};
use crate::series::closes;
use std::collections::BTreeMap;

const Z_WINDOW: usize = 50;
const BAND_WINDOW: usize = 20;
const Z_EXTREME: f64 = 2.0;

/// Mean reversion on a 50-period z-score, confirmed by the close's position
/// inside the 20-period Bollinger band.
///
/// - Bullish: z < -2 and close in the bottom 20% of the band
/// - Bearish: z > 2 and close in the top 20% of the band
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversionStrategy;

impl Strategy for MeanReversionStrategy {
    fn evaluate(&self, candles: &[Candle]) -> Result<StrategySignal, IndicatorError> {
        require_len(candles.len(), self.min_candles_required())?;

        let prices = closes(candles);
        let close = last(&prices);
        let z_score = (close - last(&rolling_mean(&prices, Z_WINDOW)))
            / last(&rolling_std(&prices, Z_WINDOW));

        let bands = bollinger_bands(&prices, BAND_WINDOW, 2.0);
        let (upper, lower) = (last(&bands.upper), last(&bands.lower));
        // Flat bands make the position undefined (NaN), which never triggers
        let price_vs_bb = (close - lower) / (upper - lower);

        let metrics = BTreeMap::from([
            ("z_score".to_string(), z_score),
            ("price_vs_bb".to_string(), price_vs_bb),
            ("rsi_14".to_string(), last(&rsi_series(&prices, 14))),
            ("rsi_28".to_string(), last(&rsi_series(&prices, 28))),
        ]);

        let confidence = z_score.abs() / (2.0 * Z_EXTREME);
        let signal = if z_score < -Z_EXTREME && price_vs_bb < 0.2 {
            StrategySignal::new(Signal::Bullish, confidence, metrics)
        } else if z_score > Z_EXTREME && price_vs_bb > 0.8 {
            StrategySignal::new(Signal::Bearish, confidence, metrics)
        } else {
            StrategySignal::neutral(metrics)
        };
        Ok(signal)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::MeanReversion
    }

    fn min_candles_required(&self) -> usize {
        Z_WINDOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::{candles_from_closes, flat_volume};

    /// Alternating chop around 100 followed by one outlier close
    fn chop_then(outlier: f64) -> Vec<Candle> {
        let mut prices: Vec<f64> = (0..59)
            .map(|i| if i % 2 == 0 { 99.0 } else { 101.0 })
            .collect();
        prices.push(outlier);
        candles_from_closes(&prices, &flat_volume(prices.len()))
    }

    #[test]
    fn test_collapse_below_band_is_bullish() {
        let output = MeanReversionStrategy.evaluate(&chop_then(90.0)).unwrap();
        assert_eq!(output.signal, Signal::Bullish);
        assert!(output.metrics["z_score"] < -2.0);
        assert!(output.metrics["price_vs_bb"] < 0.2);
        assert_eq!(output.confidence, 1.0);
    }

    #[test]
    fn test_spike_above_band_is_bearish() {
        let output = MeanReversionStrategy.evaluate(&chop_then(110.0)).unwrap();
        assert_eq!(output.signal, Signal::Bearish);
        assert!(output.metrics["price_vs_bb"] > 0.8);
    }

    #[test]
    fn test_chop_is_neutral() {
        let output = MeanReversionStrategy.evaluate(&chop_then(101.0)).unwrap();
        assert_eq!(output.signal, Signal::Neutral);
        assert_eq!(output.confidence, 0.5);
        assert!(output.metrics["rsi_14"] > 0.0 && output.metrics["rsi_14"] < 100.0);
    }

    #[test]
    fn test_requires_fifty_closes() {
        let candles = candles_from_closes(&[100.0; 49], &flat_volume(49));
        assert_eq!(
            MeanReversionStrategy.evaluate(&candles).unwrap_err(),
            IndicatorError::InsufficientData { needed: 50, got: 49 }
        );
    }
}
