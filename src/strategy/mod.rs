// Strategy toolkit
// Five independent strategies over a candle series, each producing a
// (signal, confidence) pair, and a confidence-weighted combinator.
pub mod mean_reversion;
pub mod momentum;
pub mod stat_arb;
pub mod trend;
pub mod volatility;

pub use mean_reversion::MeanReversionStrategy;
pub use momentum::MomentumStrategy;
pub use stat_arb::StatArbStrategy;
pub use trend::TrendStrategy;
pub use volatility::VolatilityStrategy;

use crate::indicators::IndicatorError;
use crate::models::{Candle, Signal};
use serde::Serialize;
use std::collections::BTreeMap;

/// Confidence carried by every strategy's neutral verdict
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Normalized score a combined signal must clear to leave neutral
const COMBINED_THRESHOLD: f64 = 0.2;

/// Base trait for all strategies
pub trait Strategy: Send + Sync {
    /// Evaluate the latest candle of an ascending series
    fn evaluate(&self, candles: &[Candle]) -> Result<StrategySignal, IndicatorError>;

    fn kind(&self) -> StrategyKind;

    /// Get strategy name
    fn name(&self) -> &str {
        self.kind().as_str()
    }

    /// Minimum candles required for this strategy
    fn min_candles_required(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Trend,
    MeanReversion,
    Momentum,
    Volatility,
    StatArb,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Trend => "trend",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::Momentum => "momentum",
            StrategyKind::Volatility => "volatility",
            StrategyKind::StatArb => "stat_arb",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySignal {
    pub signal: Signal,
    /// Always within [0, 1]
    pub confidence: f64,
    pub metrics: BTreeMap<String, f64>,
}

impl StrategySignal {
    pub fn new(signal: Signal, confidence: f64, metrics: BTreeMap<String, f64>) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            signal,
            confidence,
            metrics,
        }
    }

    pub fn neutral(metrics: BTreeMap<String, f64>) -> Self {
        Self::new(Signal::Neutral, NEUTRAL_CONFIDENCE, metrics)
    }
}

/// Relative weight of each strategy in the combinator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyWeights {
    pub trend: f64,
    pub mean_reversion: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub stat_arb: f64,
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self {
            trend: 0.25,
            mean_reversion: 0.20,
            momentum: 0.25,
            volatility: 0.15,
            stat_arb: 0.15,
        }
    }
}

impl StrategyWeights {
    pub fn weight(&self, kind: StrategyKind) -> f64 {
        match kind {
            StrategyKind::Trend => self.trend,
            StrategyKind::MeanReversion => self.mean_reversion,
            StrategyKind::Momentum => self.momentum,
            StrategyKind::Volatility => self.volatility,
            StrategyKind::StatArb => self.stat_arb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CombinedSignal {
    pub signal: Signal,
    pub confidence: f64,
}

/// Merge strategy outputs into one signal.
///
/// Each vote counts `value * weight * confidence`; the sum is normalized by
/// the total weighted confidence. With no confidence at all the result is
/// neutral with confidence 0.
pub fn combine_signals(
    signals: &BTreeMap<StrategyKind, StrategySignal>,
    weights: &StrategyWeights,
) -> CombinedSignal {
    let mut weighted_sum = 0.0;
    let mut total_confidence = 0.0;

    for (kind, output) in signals {
        let weight = weights.weight(*kind);
        weighted_sum += output.signal.value() * weight * output.confidence;
        total_confidence += weight * output.confidence;
    }

    let score = if total_confidence > 0.0 {
        weighted_sum / total_confidence
    } else {
        0.0
    };

    let signal = if score > COMBINED_THRESHOLD {
        Signal::Bullish
    } else if score < -COMBINED_THRESHOLD {
        Signal::Bearish
    } else {
        Signal::Neutral
    };

    CombinedSignal {
        signal,
        confidence: score.abs(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub signals: BTreeMap<StrategyKind, StrategySignal>,
    pub combined: CombinedSignal,
}

/// All five strategies plus their combinator weights.
pub struct StrategySuite {
    strategies: Vec<Box<dyn Strategy>>,
    weights: StrategyWeights,
}

impl Default for StrategySuite {
    fn default() -> Self {
        Self {
            strategies: vec![
                Box::new(TrendStrategy),
                Box::new(MeanReversionStrategy),
                Box::new(MomentumStrategy),
                Box::new(VolatilityStrategy),
                Box::new(StatArbStrategy::default()),
            ],
            weights: StrategyWeights::default(),
        }
    }
}

impl StrategySuite {
    pub fn with_weights(mut self, weights: StrategyWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn min_candles_required(&self) -> usize {
        self.strategies
            .iter()
            .map(|s| s.min_candles_required())
            .max()
            .unwrap_or(0)
    }

    pub fn run(&self, candles: &[Candle]) -> Result<StrategyReport, IndicatorError> {
        let mut signals = BTreeMap::new();
        for strategy in &self.strategies {
            let output = strategy.evaluate(candles)?;
            tracing::debug!(
                "{}: {} (confidence {:.2})",
                strategy.name(),
                output.signal,
                output.confidence
            );
            signals.insert(strategy.kind(), output);
        }

        let combined = combine_signals(&signals, &self.weights);
        Ok(StrategyReport { signals, combined })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{MarketScenario, SyntheticSeries};

    fn output(signal: Signal, confidence: f64) -> StrategySignal {
        StrategySignal::new(signal, confidence, BTreeMap::new())
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = StrategyWeights::default();
        let total = w.trend + w.mean_reversion + w.momentum + w.volatility + w.stat_arb;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(output(Signal::Bullish, 1.7).confidence, 1.0);
        assert_eq!(output(Signal::Bearish, -0.3).confidence, 0.0);
        assert_eq!(output(Signal::Neutral, f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_combinator_zero_confidence_is_neutral() {
        let signals: BTreeMap<_, _> = [
            (StrategyKind::Trend, output(Signal::Bullish, 0.0)),
            (StrategyKind::Momentum, output(Signal::Bearish, 0.0)),
        ]
        .into_iter()
        .collect();

        let combined = combine_signals(&signals, &StrategyWeights::default());
        assert_eq!(combined.signal, Signal::Neutral);
        assert_eq!(combined.confidence, 0.0);

        let empty = combine_signals(&BTreeMap::new(), &StrategyWeights::default());
        assert_eq!(empty.signal, Signal::Neutral);
    }

    #[test]
    fn test_combinator_normalizes_by_confidence() {
        let signals: BTreeMap<_, _> = [
            (StrategyKind::Trend, output(Signal::Bullish, 0.8)),
            (StrategyKind::Momentum, output(Signal::Bullish, 0.6)),
            (StrategyKind::MeanReversion, output(Signal::Bearish, 0.5)),
            (StrategyKind::Volatility, output(Signal::Neutral, 0.5)),
        ]
        .into_iter()
        .collect();

        // (0.2 + 0.15 - 0.1) / (0.2 + 0.15 + 0.1 + 0.075)
        let combined = combine_signals(&signals, &StrategyWeights::default());
        assert_eq!(combined.signal, Signal::Bullish);
        assert!((combined.confidence - 0.25 / 0.525).abs() < 1e-12);
    }

    #[test]
    fn test_combinator_neutral_band() {
        let signals: BTreeMap<_, _> = [
            (StrategyKind::Trend, output(Signal::Bullish, 0.5)),
            (StrategyKind::Momentum, output(Signal::Bearish, 0.5)),
        ]
        .into_iter()
        .collect();

        let combined = combine_signals(&signals, &StrategyWeights::default());
        assert_eq!(combined.signal, Signal::Neutral);
    }

    #[test]
    fn test_suite_runs_every_strategy() {
        let suite = StrategySuite::default();
        let candles = SyntheticSeries::new(42).generate(
            MarketScenario::Uptrend,
            suite.min_candles_required() + 50,
            60,
        );

        let report = suite.run(&candles).unwrap();
        assert_eq!(report.signals.len(), 5);
        assert!(report
            .signals
            .values()
            .all(|s| (0.0..=1.0).contains(&s.confidence)));
        assert!((0.0..=1.0).contains(&report.combined.confidence));
    }

    #[test]
    fn test_suite_rejects_short_series() {
        let candles = SyntheticSeries::new(1).generate(MarketScenario::Sideways, 60, 60);
        let err = StrategySuite::default().run(&candles).unwrap_err();
        assert!(matches!(err, IndicatorError::InsufficientData { .. }));
    }
}
