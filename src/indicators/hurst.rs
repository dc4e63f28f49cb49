use super::stats::{linear_fit, population_std};

/// Random-walk value returned when the fit cannot be made
const RANDOM_WALK: f64 = 0.5;
const MIN_TAU: f64 = 1e-8;

/// Hurst exponent from the scaling of lagged differences.
///
/// - H < 0.5: mean reverting
/// - H = 0.5: random walk
/// - H > 0.5: trending
///
/// For each lag in `2..max_lag`, tau = sqrt(std(x[lag:] - x[:-lag])); the
/// exponent is the slope of log(tau) against log(lag). Degenerate input
/// (too short, non-finite) falls back to 0.5 instead of failing.
pub fn hurst_exponent(prices: &[f64], max_lag: usize) -> f64 {
    let mut log_lags = Vec::new();
    let mut log_taus = Vec::new();

    for lag in 2..max_lag {
        if lag >= prices.len() {
            break;
        }
        let diffs: Vec<f64> = prices[lag..]
            .iter()
            .zip(&prices[..prices.len() - lag])
            .map(|(a, b)| a - b)
            .collect();

        // NaN must survive the floor so the fit rejects it
        let spread = population_std(&diffs).sqrt();
        let tau = if spread.is_nan() { spread } else { spread.max(MIN_TAU) };
        log_lags.push((lag as f64).ln());
        log_taus.push(tau.ln());
    }

    match linear_fit(&log_lags, &log_taus) {
        Some((slope, _)) if slope.is_finite() => slope,
        _ => {
            tracing::debug!(
                "Hurst fit failed over {} prices, using random-walk default",
                prices.len()
            );
            RANDOM_WALK
        }
    }
}
