use super::stats::rolling_mean;

/// Calculate Simple Moving Average (SMA)
pub fn calculate_sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let sum: f64 = prices.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// Calculate Exponential Moving Average (EMA)
pub fn calculate_ema(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }

    ema_series(prices, period).last().copied()
}

pub fn sma_series(values: &[f64], window: usize) -> Vec<f64> {
    rolling_mean(values, window)
}

/// Recursive EMA seeded with the first value, smoothing 2/(window+1).
pub fn ema_series(values: &[f64], window: usize) -> Vec<f64> {
    let multiplier = 2.0 / (window as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());

    let mut iter = values.iter();
    let Some(&first) = iter.next() else {
        return out;
    };

    let mut ema = first;
    out.push(ema);
    for value in iter {
        ema = (value - ema) * multiplier + ema;
        out.push(ema);
    }

    out
}

/// Bias-adjusted exponential mean: every value is the weighted average of
/// all observations so far with weights (1 - alpha)^age, alpha = 2/(span+1).
/// Unlike `ema_series`, the first value does not dominate early output.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let decay = 1.0 - 2.0 / (span as f64 + 1.0);
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    values
        .iter()
        .map(|value| {
            numerator = value + decay * numerator;
            denominator = 1.0 + decay * denominator;
            numerator / denominator
        })
        .collect()
}

/// MACD(12, 26) line and its 9-period signal line
pub fn macd(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let fast = ema_series(closes, 12);
    let slow = ema_series(closes, 26);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&line, 9);
    (line, signal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, Some(104.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let prices = vec![100.0, 102.0];
        let sma = calculate_sma(&prices, 5);
        assert!(sma.is_none());
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let ema = ema_series(&[10.0, 20.0, 20.0], 3);
        // smoothing = 0.5
        assert_eq!(ema, vec![10.0, 15.0, 17.5]);
    }

    #[test]
    fn test_ewm_mean_weights_history() {
        let mean = ewm_mean(&[10.0, 20.0], 3);
        assert_eq!(mean[0], 10.0);
        // (20 + 0.5 * 10) / (1 + 0.5)
        assert!((mean[1] - 50.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ema() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0];
        let ema = calculate_ema(&prices, 5);
        assert!(ema.is_some());
        // Lags a rising series but stays above its start
        let value = ema.unwrap();
        assert!(value > 100.0 && value < 110.0);
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let (line, signal) = macd(&closes);
        assert!(*line.last().unwrap() > 0.0);
        assert!(*signal.last().unwrap() > 0.0);
    }
}
