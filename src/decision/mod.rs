// Decision module
// Fixed-weight consensus over the four signal modules, sized by the risk
// module's category and position cap.
use crate::metrics::format::{format_price, format_ratio, format_usd};
use crate::models::{RiskLevel, Signal, TradeAction};
use crate::risk::RiskAssessment;
use crate::signals::SignalSource;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Weight of each signal module in the consensus score. Sums to 1.0.
///
/// Keyed by `SignalSource`, the same type whose `key()` each module
/// publishes under.
pub const DECISION_WEIGHTS: [(SignalSource, f64); 4] = [
    (SignalSource::Valuation, 0.35),
    (SignalSource::Fundamental, 0.30),
    (SignalSource::Technical, 0.25),
    (SignalSource::Sentiment, 0.10),
];

const BUY_ABOVE: f64 = 0.15;
const SELL_BELOW: f64 = -0.15;

pub fn decision_weight(source: SignalSource) -> f64 {
    DECISION_WEIGHTS
        .iter()
        .find(|(s, _)| *s == source)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub max_position: String,
    pub risk_level: RiskLevel,
    pub details: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalAnalysis {
    pub bullish_signals: usize,
    pub bearish_signals: usize,
    pub weighted_score: String,
    pub base_action: TradeAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalDecision {
    pub action: TradeAction,
    pub size: String,
    pub price: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionReasoning {
    pub risk_assessment: RiskSummary,
    pub signal_analysis: SignalAnalysis,
    pub final_decision: FinalDecision,
}

/// The one decision of an evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub action: TradeAction,
    /// Dollar size, within `[0, max_position]`
    pub size: f64,
    pub price: f64,
    pub weighted_score: f64,
    pub reasoning: DecisionReasoning,
}

/// Weighted consensus: Σ weight × {+1, 0, -1}. Missing sources are skipped
/// without renormalizing the remaining weights.
pub fn weighted_score(signals: &BTreeMap<SignalSource, Signal>) -> f64 {
    DECISION_WEIGHTS
        .iter()
        .filter_map(|(source, weight)| signals.get(source).map(|s| s.value() * weight))
        .sum()
}

fn base_action(score: f64, available: usize) -> TradeAction {
    if available == 0 {
        TradeAction::Hold
    } else if score > BUY_ABOVE {
        TradeAction::Buy
    } else if score < SELL_BELOW {
        TradeAction::Sell
    } else {
        TradeAction::Hold
    }
}

/// Share of the risk cap a buy may use
fn size_fraction(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Low => 1.0,
        RiskLevel::Medium => 0.5,
        RiskLevel::High => 0.0,
    }
}

pub fn decide(
    signals: &BTreeMap<SignalSource, Signal>,
    risk: &RiskAssessment,
    price: f64,
) -> Decision {
    let score = weighted_score(signals);
    let available = DECISION_WEIGHTS
        .iter()
        .filter(|(source, _)| signals.contains_key(source))
        .count();
    let bullish = signals.values().filter(|s| **s == Signal::Bullish).count();
    let bearish = signals.values().filter(|s| **s == Signal::Bearish).count();

    let base = base_action(score, available);
    let buy_size = if base == TradeAction::Buy {
        risk.max_position * size_fraction(risk.level)
    } else {
        0.0
    };

    // A buy the risk budget cannot fund is a hold; sells carry no size
    let (action, size) = match base {
        TradeAction::Buy if buy_size > 0.0 => (TradeAction::Buy, buy_size),
        TradeAction::Sell => (TradeAction::Sell, 0.0),
        _ => (TradeAction::Hold, 0.0),
    };

    let consensus = if score > 0.0 {
        "bullish"
    } else if score < 0.0 {
        "bearish"
    } else {
        "neutral"
    };

    tracing::info!(
        "Decision: {} {} at {} (score {:.2}, {})",
        action,
        format_usd(size),
        format_price(price),
        score,
        risk.level
    );

    Decision {
        action,
        size,
        price,
        weighted_score: score,
        reasoning: DecisionReasoning {
            risk_assessment: RiskSummary {
                max_position: format_usd(risk.max_position),
                risk_level: risk.level,
                details: risk.reasoning_json(),
            },
            signal_analysis: SignalAnalysis {
                bullish_signals: bullish,
                bearish_signals: bearish,
                weighted_score: format_ratio(score),
                base_action: base,
            },
            final_decision: FinalDecision {
                action,
                size: format_usd(size),
                price: format_price(price),
                explanation: format!(
                    "Based on {} weighted consensus ({}) and {} risk assessment",
                    consensus,
                    format_ratio(score),
                    risk.level
                ),
            },
        },
    }
}
