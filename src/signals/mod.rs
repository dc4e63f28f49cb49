// Signal modules
// Four independent snapshot analyses sharing one aggregation law: each
// sub-signal is a threshold vote, and the module verdict is the strict
// majority of those votes.
pub mod fundamental;
pub mod sentiment;
pub mod technical;
pub mod valuation;

use crate::models::{Categorical, MarketSnapshot, Reasoning, ReasoningEntry, Signal};
use serde::Serialize;
use std::fmt::Display;

/// Strict majority over categorical votes; ties and pluralities resolve to
/// the middle category. An empty vote list is the middle category.
pub fn majority_vote<S: Categorical>(votes: &[S]) -> S {
    let n = votes.len();
    let favourable = votes.iter().filter(|v| **v == S::FAVOURABLE).count();
    let unfavourable = votes.iter().filter(|v| **v == S::UNFAVOURABLE).count();

    if favourable * 2 > n {
        S::FAVOURABLE
    } else if unfavourable * 2 > n {
        S::UNFAVOURABLE
    } else {
        S::MIDDLE
    }
}

/// Number of passed checks
pub(crate) fn score(checks: &[bool]) -> u8 {
    checks.iter().filter(|c| **c).count() as u8
}

/// A module's verdict and the per-sub-signal reasoning behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleReport<S> {
    pub signal: S,
    pub reasoning: Reasoning<S>,
}

/// Collects sub-signal votes for one module.
pub(crate) struct Tally<S> {
    module: &'static str,
    votes: Vec<S>,
    reasoning: Reasoning<S>,
}

impl<S: Categorical + Display> Tally<S> {
    pub(crate) fn new(module: &'static str) -> Self {
        Self {
            module,
            votes: Vec::new(),
            reasoning: Reasoning::new(),
        }
    }

    /// Record a sub-signal from its check score.
    pub(crate) fn record(&mut self, name: &str, score: u8, details: String) -> S {
        let signal = S::from_score(score);
        tracing::debug!("{} {}: {} ({})", self.module, name, signal, details);
        self.votes.push(signal);
        self.reasoning
            .insert(name.to_string(), ReasoningEntry { signal, details });
        signal
    }

    pub(crate) fn finish(self) -> ModuleReport<S> {
        let signal = majority_vote(&self.votes);
        tracing::info!("{} analysis: {}", self.module, signal);
        ModuleReport {
            signal,
            reasoning: self.reasoning,
        }
    }
}

/// The four signal modules, in display order.
///
/// `key()` is both the evaluation-context key a module publishes under and
/// the key of its decision weight, so the two can never drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    Technical,
    Fundamental,
    Sentiment,
    Valuation,
}

impl SignalSource {
    pub const ALL: [SignalSource; 4] = [
        SignalSource::Technical,
        SignalSource::Fundamental,
        SignalSource::Sentiment,
        SignalSource::Valuation,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SignalSource::Technical => "technical",
            SignalSource::Fundamental => "fundamental",
            SignalSource::Sentiment => "sentiment",
            SignalSource::Valuation => "valuation",
        }
    }

    pub fn analyze(&self, snapshot: &MarketSnapshot) -> ModuleReport<Signal> {
        match self {
            SignalSource::Technical => technical::analyze(snapshot),
            SignalSource::Fundamental => fundamental::analyze(snapshot),
            SignalSource::Sentiment => sentiment::analyze(snapshot),
            SignalSource::Valuation => valuation::analyze(snapshot),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{BaseToken, MarketSnapshot, TxnCounts, Windowed};

    /// Snapshot with every window set to the same quiet values
    pub fn snapshot() -> MarketSnapshot {
        let txns = TxnCounts { buys: 100, sells: 100 };
        MarketSnapshot {
            price_usd: 1.0,
            liquidity_usd: 1_000_000.0,
            fdv: 10_000_000.0,
            volume: Windowed {
                h1: 10_000.0,
                h6: 60_000.0,
                h24: 240_000.0,
            },
            price_change_pct: Windowed::default(),
            txns: Windowed {
                h1: txns,
                h6: txns,
                h24: txns,
            },
            base_token: BaseToken {
                symbol: "TEST".to_string(),
                name: "Test Token".to_string(),
            },
            chain_id: Some("base".to_string()),
            dex_id: Some("uniswap".to_string()),
            pair_address: None,
            pair_created_at: None,
        }
    }
}
