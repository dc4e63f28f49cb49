use crate::models::Candle;

/// On-balance volume, seeded at 0.
///
/// Adds the period's volume on an up close, subtracts it on a down close and
/// carries the total unchanged on a flat close.
pub fn obv_series(candles: &[Candle]) -> Vec<f64> {
    let mut out = Vec::with_capacity(candles.len());
    let mut total = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        if i > 0 {
            let prev = candles[i - 1].close;
            if candle.close > prev {
                total += candle.volume;
            } else if candle.close < prev {
                total -= candle.volume;
            }
        }
        out.push(total);
    }

    out
}
