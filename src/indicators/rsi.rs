use super::stats::rolling_mean;
use super::{require_len, IndicatorError};

/// Relative Strength Index series
///
/// Average gain over average loss across a rolling window, mapped to
/// `100 - 100 / (1 + RS)`. A window with no losses is undefined (NaN).
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    let mut gains = vec![0.0; prices.len()];
    let mut losses = vec![0.0; prices.len()];

    for i in 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if l == 0.0 || l.is_nan() {
                f64::NAN
            } else {
                100.0 - 100.0 / (1.0 + g / l)
            }
        })
        .collect()
}

/// Calculate Relative Strength Index (RSI)
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// Fails with `Undefined` when the window holds no losses.
pub fn calculate_rsi(prices: &[f64], period: usize) -> Result<f64, IndicatorError> {
    require_len(prices.len(), period + 1)?;

    let rsi = rsi_series(prices, period)
        .last()
        .copied()
        .unwrap_or(f64::NAN);

    if rsi.is_nan() {
        return Err(IndicatorError::Undefined("RSI with zero average loss"));
    }
    Ok(rsi)
}
