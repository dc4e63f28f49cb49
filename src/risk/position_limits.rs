use crate::models::RiskLevel;
use serde::{Deserialize, Serialize};

/// Position cap for one risk category: a share of pool liquidity, bounded
/// by an absolute dollar ceiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PositionLimit {
    pub liquidity_fraction: f64,
    pub cap_usd: f64,
}

impl PositionLimit {
    pub fn max_position(&self, liquidity_usd: f64) -> f64 {
        (liquidity_usd * self.liquidity_fraction)
            .min(self.cap_usd)
            .max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionLimits {
    pub low: PositionLimit,
    pub medium: PositionLimit,
    pub high: PositionLimit,
}

impl Default for PositionLimits {
    fn default() -> Self {
        Self {
            low: PositionLimit {
                liquidity_fraction: 0.01, // 1% of liquidity
                cap_usd: 100_000.0,
            },
            medium: PositionLimit {
                liquidity_fraction: 0.005, // 0.5% of liquidity
                cap_usd: 50_000.0,
            },
            high: PositionLimit {
                liquidity_fraction: 0.001, // 0.1% of liquidity
                cap_usd: 10_000.0,
            },
        }
    }
}

impl PositionLimits {
    pub fn for_level(&self, level: RiskLevel) -> PositionLimit {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }

    pub fn max_position(&self, level: RiskLevel, liquidity_usd: f64) -> f64 {
        self.for_level(level).max_position(liquidity_usd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps() {
        let limits = PositionLimits::default();
        assert_eq!(limits.max_position(RiskLevel::Low, 50_000_000.0), 100_000.0);
        assert_eq!(limits.max_position(RiskLevel::Medium, 50_000_000.0), 50_000.0);
        assert_eq!(limits.max_position(RiskLevel::High, 50_000_000.0), 10_000.0);
    }

    #[test]
    fn test_liquidity_share_below_cap() {
        let limits = PositionLimits::default();
        assert_eq!(limits.max_position(RiskLevel::Low, 2_000_000.0), 20_000.0);
        assert_eq!(limits.max_position(RiskLevel::Medium, 2_000_000.0), 10_000.0);
        assert_eq!(limits.max_position(RiskLevel::High, 200_000.0), 200.0);
        assert_eq!(limits.max_position(RiskLevel::High, 0.0), 0.0);
    }
}
