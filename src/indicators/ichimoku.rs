use crate::models::Candle;

const CONVERSION_PERIOD: usize = 9;
const BASE_PERIOD: usize = 26;
const SPAN_B_PERIOD: usize = 52;
const DISPLACEMENT: usize = 26;

/// Ichimoku cloud components, each aligned with the input candles.
#[derive(Debug, Clone, PartialEq)]
pub struct Ichimoku {
    /// Tenkan-sen: 9-period high-low midpoint
    pub conversion: Vec<f64>,
    /// Kijun-sen: 26-period high-low midpoint
    pub base: Vec<f64>,
    /// Senkou span A, shifted forward 26 periods
    pub leading_a: Vec<f64>,
    /// Senkou span B (52-period midpoint), shifted forward 26 periods
    pub leading_b: Vec<f64>,
    /// Chikou span: close shifted back 26 periods
    pub lagging: Vec<f64>,
}

fn midpoint(candles: &[Candle], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; candles.len()];
    if period == 0 || candles.len() < period {
        return out;
    }

    for end in period..=candles.len() {
        let window = &candles[end - period..end];
        let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        out[end - 1] = (high + low) / 2.0;
    }
    out
}

/// Move values `by` periods forward; the head fills with NaN.
fn shift_forward(values: &[f64], by: usize) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| if i >= by { values[i - by] } else { f64::NAN })
        .collect()
}

/// Move values `by` periods back; the tail fills with NaN.
fn shift_back(values: &[f64], by: usize) -> Vec<f64> {
    let n = values.len();
    (0..n)
        .map(|i| if i + by < n { values[i + by] } else { f64::NAN })
        .collect()
}

pub fn ichimoku(candles: &[Candle]) -> Ichimoku {
    let conversion = midpoint(candles, CONVERSION_PERIOD);
    let base = midpoint(candles, BASE_PERIOD);

    let span_a: Vec<f64> = conversion
        .iter()
        .zip(&base)
        .map(|(c, b)| (c + b) / 2.0)
        .collect();
    let span_b = midpoint(candles, SPAN_B_PERIOD);
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    Ichimoku {
        leading_a: shift_forward(&span_a, DISPLACEMENT),
        leading_b: shift_forward(&span_b, DISPLACEMENT),
        lagging: shift_back(&closes, DISPLACEMENT),
        conversion,
        base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle {
                timestamp: Utc::now() + chrono::Duration::hours(i as i64),
                open: None,
                high: i as f64 + 1.0,
                low: i as f64 - 1.0,
                close: i as f64,
                volume: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_conversion_line() {
        let cloud = ichimoku(&candles(10));
        assert!(cloud.conversion[7].is_nan());
        // window 0..9: high max 9, low min -1
        assert_eq!(cloud.conversion[8], 4.0);
    }

    #[test]
    fn test_shifts() {
        let data = candles(80);
        let cloud = ichimoku(&data);

        // Lagging span at i is the close 26 periods later
        assert_eq!(cloud.lagging[0], 26.0);
        assert!(cloud.lagging[79 - 25].is_nan());

        // Leading span A first defined 26 periods after the base line
        assert!(cloud.leading_a[25 + 25].is_nan());
        let a_source = (cloud.conversion[25] + cloud.base[25]) / 2.0;
        assert_eq!(cloud.leading_a[25 + 26], a_source);

        // Span B needs 52 periods before its shift
        assert!(cloud.leading_b[51 + 25].is_nan());
        assert!(!cloud.leading_b[51 + 26].is_nan());
    }
}
