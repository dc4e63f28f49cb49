//! Bollinger Bands: simple moving average +/- a multiple of the sample
//! standard deviation over the same window.

use super::stats::{rolling_mean, rolling_std};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn bollinger_bands(closes: &[f64], window: usize, num_std: f64) -> BollingerBands {
    let middle = rolling_mean(closes, window);
    let std = rolling_std(closes, window);

    let upper = middle.iter().zip(&std).map(|(m, s)| m + num_std * s).collect();
    let lower = middle.iter().zip(&std).map(|(m, s)| m - num_std * s).collect();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// Latest (upper, middle, lower) for a 2-sigma band, or None during warm-up.
pub fn calculate_bollinger(closes: &[f64], window: usize) -> Option<(f64, f64, f64)> {
    let bands = bollinger_bands(closes, window, 2.0);
    let upper = *bands.upper.last()?;
    let middle = *bands.middle.last()?;
    let lower = *bands.lower.last()?;

    if middle.is_nan() {
        return None;
    }
    Some((upper, middle, lower))
}
