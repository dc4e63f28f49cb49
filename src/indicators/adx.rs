/// Average Directional Index (ADX) - Measures trend strength
///
/// ADX ranges from 0 to 100:
/// - ADX > 25: Strong trend (bull or bear)
/// - ADX 20-25: Moderate trend
/// - ADX < 20: Weak trend / choppy / ranging market
///
/// Also returns +DI and -DI to determine trend direction:
/// - +DI > -DI: Uptrend
/// - -DI > +DI: Downtrend

use super::atr::true_range_series;
use super::moving_average::ewm_mean;
use crate::models::Candle;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalIndex {
    pub adx: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
}

/// ADX, +DI and -DI series, smoothed with a bias-adjusted exponential mean
/// of span `period`.
pub fn adx_series(candles: &[Candle], period: usize) -> DirectionalIndex {
    let true_ranges = true_range_series(candles);

    // Directional Movement; the first candle has no predecessor
    let mut plus_dms = vec![0.0; candles.len()];
    let mut minus_dms = vec![0.0; candles.len()];
    for i in 1..candles.len() {
        let up_move = candles[i].high - candles[i - 1].high;
        let down_move = candles[i - 1].low - candles[i].low;

        if up_move > down_move && up_move > 0.0 {
            plus_dms[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dms[i] = down_move;
        }
    }

    let smoothed_tr = ewm_mean(&true_ranges, period);
    let smoothed_plus = ewm_mean(&plus_dms, period);
    let smoothed_minus = ewm_mean(&minus_dms, period);

    let di = |dm: &[f64]| -> Vec<f64> {
        dm.iter()
            .zip(&smoothed_tr)
            .map(|(&dm, &tr)| if tr > 0.0 { dm / tr * 100.0 } else { 0.0 })
            .collect()
    };
    let plus_di = di(&smoothed_plus);
    let minus_di = di(&smoothed_minus);

    let dx: Vec<f64> = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(&p, &m)| {
            let sum = p + m;
            if sum > 0.0 {
                (p - m).abs() / sum * 100.0
            } else {
                0.0
            }
        })
        .collect();

    DirectionalIndex {
        adx: ewm_mean(&dx, period),
        plus_di,
        minus_di,
    }
}

/// Calculate ADX, +DI, and -DI for trend strength and direction
///
/// Returns (adx, plus_di, minus_di) or None if insufficient data
pub fn calculate_adx(candles: &[Candle], period: usize) -> Option<(f64, f64, f64)> {
    if candles.len() < period + 1 {
        return None;
    }

    let index = adx_series(candles, period);
    Some((
        *index.adx.last()?,
        *index.plus_di.last()?,
        *index.minus_di.last()?,
    ))
}
