use crate::models::Candle;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Price path shapes for exercising the strategy toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketScenario {
    /// Steady drift up (+2% per day) with light noise
    Uptrend,
    /// Steady drift down (-2% per day) with light noise
    Downtrend,
    /// Mean-reverting chop around the starting price
    Sideways,
    /// Large (±5%) swings per period
    Volatile,
}

impl MarketScenario {
    pub const ALL: [MarketScenario; 4] = [
        MarketScenario::Uptrend,
        MarketScenario::Downtrend,
        MarketScenario::Sideways,
        MarketScenario::Volatile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MarketScenario::Uptrend => "uptrend",
            MarketScenario::Downtrend => "downtrend",
            MarketScenario::Sideways => "sideways",
            MarketScenario::Volatile => "volatile",
        }
    }
}

/// Seeded generator of synthetic candle series, reproducible per seed.
pub struct SyntheticSeries {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticSeries {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 1.0,
            base_volume: 250_000.0,
        }
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Generate `num_candles` candles ending now, `interval_minutes` apart.
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_candles: usize,
        interval_minutes: i64,
    ) -> Vec<Candle> {
        let start = Utc::now() - Duration::minutes(num_candles as i64 * interval_minutes);
        let periods_per_day = 24.0 * 60.0 / interval_minutes as f64;
        let mut price = self.base_price;
        let mut candles = Vec::with_capacity(num_candles);

        for i in 0..num_candles {
            price = self.step(scenario, price, periods_per_day);
            let timestamp = start + Duration::minutes(i as i64 * interval_minutes);
            candles.push(self.candle_at(price, timestamp));
        }

        candles
    }

    fn step(&mut self, scenario: MarketScenario, price: f64, periods_per_day: f64) -> f64 {
        match scenario {
            MarketScenario::Uptrend | MarketScenario::Downtrend => {
                let daily = if scenario == MarketScenario::Uptrend { 0.02 } else { -0.02 };
                let drift = price * daily / periods_per_day;
                // Noise is kept small so the drift dominates
                price + drift + price * self.rng.gen_range(-0.001..0.001)
            }
            MarketScenario::Sideways => {
                let pull = (self.base_price - price) * 0.1;
                price + pull + price * self.rng.gen_range(-0.01..0.01)
            }
            MarketScenario::Volatile => {
                let next = price * (1.0 + self.rng.gen_range(-0.05..0.05));
                next.max(self.base_price * 0.5)
            }
        }
    }

    fn candle_at(&mut self, close: f64, timestamp: DateTime<Utc>) -> Candle {
        // ±0.2% intrabar range around the close
        let spread = 0.002;
        let high = close * (1.0 + self.rng.gen_range(0.0..spread));
        let low = close * (1.0 - self.rng.gen_range(0.0..spread));
        let open = (close * (1.0 + self.rng.gen_range(-spread..spread))).clamp(low, high);

        Candle {
            timestamp,
            open: Some(open),
            high,
            low,
            close,
            volume: self.base_volume * self.rng.gen_range(0.7..1.3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_scenarios_drift() {
        let mut gen = SyntheticSeries::new(42);
        let up = gen.generate(MarketScenario::Uptrend, 500, 60);
        assert_eq!(up.len(), 500);
        assert!(up.last().unwrap().close > up.first().unwrap().close);

        let mut gen = SyntheticSeries::new(42);
        let down = gen.generate(MarketScenario::Downtrend, 500, 60);
        assert!(down.last().unwrap().close < down.first().unwrap().close);
    }

    #[test]
    fn test_sideways_stays_near_base() {
        let mut gen = SyntheticSeries::new(42).with_base_price(150.0);
        for candle in gen.generate(MarketScenario::Sideways, 500, 60) {
            assert!(candle.close > 135.0 && candle.close < 165.0, "{}", candle.close);
        }
    }

    #[test]
    fn test_same_seed_same_series() {
        let a = SyntheticSeries::new(7).generate(MarketScenario::Volatile, 50, 60);
        let b = SyntheticSeries::new(7).generate(MarketScenario::Volatile, 50, 60);
        let closes_a: Vec<f64> = a.iter().map(|c| c.close).collect();
        let closes_b: Vec<f64> = b.iter().map(|c| c.close).collect();
        assert_eq!(closes_a, closes_b);
    }

    #[test]
    fn test_ohlc_consistency() {
        let mut gen = SyntheticSeries::new(42);
        for candle in gen.generate(MarketScenario::Volatile, 200, 60) {
            let open = candle.open.unwrap();
            assert!(candle.high >= candle.close && candle.high >= open);
            assert!(candle.low <= candle.close && candle.low <= open);
        }
        let candles = SyntheticSeries::new(1).generate(MarketScenario::Uptrend, 10, 60);
        assert!(candles.windows(2).all(|w| w[1].timestamp > w[0].timestamp));
    }
}
