use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// One sampling period of a price/volume series.
///
/// Series are ordered by ascending timestamp. Duplicates and gaps are allowed,
/// nothing is resampled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A value reported independently for the 1h, 6h and 24h lookback windows.
///
/// The upstream feed does not guarantee consistency across windows (h1 volume
/// may exceed h6 volume), so nothing here assumes monotonicity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Windowed<T> {
    pub h1: T,
    pub h6: T,
    pub h24: T,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TxnCounts {
    pub buys: u64,
    pub sells: u64,
}

impl TxnCounts {
    pub fn total(&self) -> u64 {
        self.buys + self.sells
    }

    /// Buys divided by sells, or `fallback` when there were no sells.
    pub fn buy_sell_ratio_or(&self, fallback: f64) -> f64 {
        if self.sells > 0 {
            self.buys as f64 / self.sells as f64
        } else {
            fallback
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BaseToken {
    pub symbol: String,
    pub name: String,
}

/// Canonical input for one evaluation cycle.
///
/// Built once from the most liquid pair and shared read-only by every module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketSnapshot {
    pub price_usd: f64,
    pub liquidity_usd: f64,
    /// Fully diluted valuation, used as market cap
    pub fdv: f64,
    pub volume: Windowed<f64>,
    /// Signed percentages
    pub price_change_pct: Windowed<f64>,
    pub txns: Windowed<TxnCounts>,
    pub base_token: BaseToken,
    pub chain_id: Option<String>,
    pub dex_id: Option<String>,
    pub pair_address: Option<String>,
    /// Pool creation time, epoch milliseconds
    pub pair_created_at: Option<i64>,
}

/// Three-way vote used by the Signal Modules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Bullish,
    Neutral,
    Bearish,
}

impl Signal {
    /// Numeric mapping used by every weighted aggregation.
    pub fn value(&self) -> f64 {
        match self {
            Signal::Bullish => 1.0,
            Signal::Neutral => 0.0,
            Signal::Bearish => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Bullish => "bullish",
            Signal::Neutral => "neutral",
            Signal::Bearish => "bearish",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-way vote used by the Risk Module.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    #[serde(rename = "low_risk")]
    Low,
    #[serde(rename = "medium_risk")]
    Medium,
    #[serde(rename = "high_risk")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low_risk",
            RiskLevel::Medium => "medium_risk",
            RiskLevel::High => "high_risk",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorical vote that can be derived from a threshold score and
/// aggregated by strict majority.
pub trait Categorical: Copy + Eq {
    /// Category that wins on a strict majority of favourable votes
    const FAVOURABLE: Self;
    /// Category that wins on a strict majority of unfavourable votes
    const UNFAVOURABLE: Self;
    /// Everything else, including ties
    const MIDDLE: Self;

    /// Sub-signal tiering: two or more passed checks is favourable, none is
    /// unfavourable, anything in between is the middle category.
    fn from_score(score: u8) -> Self {
        match score {
            0 => Self::UNFAVOURABLE,
            1 => Self::MIDDLE,
            _ => Self::FAVOURABLE,
        }
    }
}

impl Categorical for Signal {
    const FAVOURABLE: Self = Signal::Bullish;
    const UNFAVOURABLE: Self = Signal::Bearish;
    const MIDDLE: Self = Signal::Neutral;
}

impl Categorical for RiskLevel {
    const FAVOURABLE: Self = RiskLevel::Low;
    const UNFAVOURABLE: Self = RiskLevel::High;
    const MIDDLE: Self = RiskLevel::Medium;
}

/// Final trade action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
            TradeAction::Hold => "hold",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sub-signal's vote plus the formatted inputs that produced it.
/// Diagnostic only, never read by downstream logic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReasoningEntry<S> {
    pub signal: S,
    pub details: String,
}

/// Sub-signal name -> vote and details, kept in evaluation order.
///
/// Serializes as a map whose keys follow insertion order, so reasoning
/// output reads in the order the checks ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Reasoning<S> {
    entries: Vec<(String, ReasoningEntry<S>)>,
}

impl<S> Default for Reasoning<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Reasoning<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a sub-signal. A repeated name replaces the earlier entry in
    /// place.
    pub fn insert(&mut self, name: impl Into<String>, entry: ReasoningEntry<S>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((name, entry)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ReasoningEntry<S>> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &ReasoningEntry<S>> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReasoningEntry<S>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<S> std::ops::Index<&str> for Reasoning<S> {
    type Output = ReasoningEntry<S>;

    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Some(entry) => entry,
            None => panic!("no reasoning recorded for {:?}", name),
        }
    }
}

impl<S: Serialize> Serialize for Reasoning<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, entry) in &self.entries {
            map.serialize_entry(name, entry)?;
        }
        map.end()
    }
}
