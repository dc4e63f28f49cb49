// Risk module
// Scores the snapshot on liquidity, volatility, transaction and market
// impact risk, then sizes the maximum position from the aggregate category.
pub mod position_limits;

pub use position_limits::{PositionLimit, PositionLimits};

use crate::metrics::format::format_usd;
use crate::models::{MarketSnapshot, Reasoning, RiskLevel};
use crate::signals::{score, Tally};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub max_position: f64,
    pub reasoning: Reasoning<RiskLevel>,
}

impl RiskAssessment {
    /// Sub-signal reasoning plus the resulting `position_limits` entry
    pub fn reasoning_json(&self) -> Value {
        let mut record = serde_json::Map::new();
        for (name, entry) in self.reasoning.iter() {
            record.insert(
                name.to_string(),
                json!({ "signal": entry.signal, "details": entry.details }),
            );
        }
        record.insert(
            "position_limits".to_string(),
            json!({
                "max_position": format_usd(self.max_position),
                "risk_level": self.level,
            }),
        );
        Value::Object(record)
    }
}

/// Maximum position for a risk category under the default limits
pub fn position_limit(level: RiskLevel, liquidity_usd: f64) -> f64 {
    PositionLimits::default().max_position(level, liquidity_usd)
}

pub fn assess(snapshot: &MarketSnapshot) -> RiskAssessment {
    assess_with(snapshot, &PositionLimits::default())
}

pub fn assess_with(snapshot: &MarketSnapshot, limits: &PositionLimits) -> RiskAssessment {
    let mut tally = Tally::<RiskLevel>::new("risk");

    let liquidity = snapshot.liquidity_usd;
    let daily_volume = snapshot.volume.h24;

    // Empty pools and one-sided flow read as maximally risky
    let volume_to_liquidity = if liquidity > 0.0 {
        daily_volume / liquidity
    } else {
        f64::INFINITY
    };
    tally.record(
        "liquidity_risk",
        score(&[liquidity > 5_000_000.0, volume_to_liquidity < 3.0]),
        format!(
            "Liquidity: {}, Volume/Liquidity Ratio: {:.2}",
            format_usd(liquidity),
            volume_to_liquidity
        ),
    );

    let move_1h = snapshot.price_change_pct.h1.abs();
    let move_24h = snapshot.price_change_pct.h24.abs();
    tally.record(
        "volatility_risk",
        score(&[move_1h < 5.0, move_24h < 20.0]),
        format!("1h Change: {:.2}%, 24h Change: {:.2}%", move_1h, move_24h),
    );

    let txns = snapshot.txns.h24;
    let total_txns = txns.total();
    let buy_sell_ratio = txns.buy_sell_ratio_or(f64::INFINITY);
    tally.record(
        "transaction_risk",
        score(&[
            total_txns > 1000,
            (0.5..=2.0).contains(&buy_sell_ratio),
        ]),
        format!(
            "Total Txns: {}, Buy/Sell Ratio: {:.2}",
            total_txns, buy_sell_ratio
        ),
    );

    let avg_trade = if total_txns > 0 {
        daily_volume / total_txns as f64
    } else {
        0.0
    };
    let max_trade = liquidity * 0.01;
    tally.record(
        "market_impact_risk",
        score(&[avg_trade < max_trade * 0.1, daily_volume > liquidity * 0.1]),
        format!(
            "Avg Trade: {}, Max Trade: {}",
            format_usd(avg_trade),
            format_usd(max_trade)
        ),
    );

    let report = tally.finish();
    let max_position = limits.max_position(report.signal, liquidity);
    tracing::info!(
        "Risk level {} caps position at {}",
        report.signal,
        format_usd(max_position)
    );

    RiskAssessment {
        level: report.signal,
        max_position,
        reasoning: report.reasoning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxnCounts;
    use crate::signals::test_support::snapshot;

    #[test]
    fn test_deep_balanced_market_is_low_risk() {
        let mut s = snapshot();
        s.liquidity_usd = 20_000_000.0;
        s.volume.h24 = 4_000_000.0;
        s.price_change_pct.h1 = 1.0;
        s.price_change_pct.h24 = -4.0;
        s.txns.h24 = TxnCounts { buys: 3000, sells: 2500 };

        let risk = assess(&s);
        assert_eq!(risk.level, RiskLevel::Low);
        assert_eq!(risk.max_position, 100_000.0);
        assert_eq!(
            risk.reasoning["volatility_risk"].details,
            "1h Change: 1.00%, 24h Change: 4.00%"
        );
        assert_eq!(
            risk.reasoning["market_impact_risk"].details,
            "Avg Trade: $727.27, Max Trade: $200,000.00"
        );
    }

    #[test]
    fn test_thin_volatile_market_is_high_risk() {
        let mut s = snapshot();
        s.liquidity_usd = 200_000.0;
        s.volume.h24 = 5_000.0;
        s.price_change_pct.h1 = 8.0;
        s.price_change_pct.h24 = 25.0;
        s.txns.h24 = TxnCounts { buys: 5, sells: 15 };

        let risk = assess(&s);
        assert_eq!(risk.reasoning["liquidity_risk"].signal, RiskLevel::Medium);
        assert_eq!(risk.reasoning["volatility_risk"].signal, RiskLevel::High);
        assert_eq!(risk.reasoning["transaction_risk"].signal, RiskLevel::High);
        assert_eq!(risk.reasoning["market_impact_risk"].signal, RiskLevel::High);
        assert_eq!(risk.level, RiskLevel::High);
        assert_eq!(risk.max_position, 200.0);
    }

    #[test]
    fn test_zero_denominators_bias_toward_high_risk() {
        let mut s = snapshot();
        s.liquidity_usd = 0.0;
        s.txns.h24 = TxnCounts { buys: 0, sells: 0 };

        let risk = assess(&s);
        assert_eq!(
            risk.reasoning["liquidity_risk"].details,
            "Liquidity: $0.00, Volume/Liquidity Ratio: inf"
        );
        assert_eq!(risk.reasoning["liquidity_risk"].signal, RiskLevel::High);
        assert_eq!(
            risk.reasoning["transaction_risk"].details,
            "Total Txns: 0, Buy/Sell Ratio: inf"
        );
        assert_eq!(risk.max_position, 0.0);
    }

    #[test]
    fn test_reasoning_json_includes_position_limits() {
        let risk = assess(&snapshot());
        let json = risk.reasoning_json();
        assert_eq!(json["position_limits"]["risk_level"], risk.level.as_str());
        assert_eq!(
            json["position_limits"]["max_position"],
            format_usd(risk.max_position)
        );
        assert!(json["liquidity_risk"]["details"].is_string());
    }

    #[test]
    fn test_reasoning_json_keeps_evaluation_order() {
        let risk = assess(&snapshot());
        let json = risk.reasoning_json();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "liquidity_risk",
                "volatility_risk",
                "transaction_risk",
                "market_impact_risk",
                "position_limits",
            ]
        );
    }
}
