/// Rolling-window statistics with pandas semantics: a window that is not yet
/// full, or that contains NaN, yields NaN.

fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for end in window..=values.len() {
        let slice = &values[end - window..end];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[end - 1] = f(slice);
    }
    out
}

fn mean(slice: &[f64]) -> f64 {
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// Central moment of order `k` (population)
fn central_moment(slice: &[f64], k: i32) -> f64 {
    let m = mean(slice);
    slice.iter().map(|v| (v - m).powi(k)).sum::<f64>() / slice.len() as f64
}

/// Sample standard deviation (ddof = 1)
pub(crate) fn sample_std(slice: &[f64]) -> f64 {
    let n = slice.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(slice);
    let var = slice.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    var.sqrt()
}

/// Population standard deviation (ddof = 0)
pub(crate) fn population_std(slice: &[f64]) -> f64 {
    if slice.is_empty() {
        return f64::NAN;
    }
    central_moment(slice, 2).sqrt()
}

pub fn rolling_sum(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |s| s.iter().sum())
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, mean)
}

pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, sample_std)
}

/// Adjusted Fisher-Pearson skewness. Zero-variance windows are NaN.
pub fn rolling_skew(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |s| {
        let n = s.len() as f64;
        if s.len() < 3 {
            return f64::NAN;
        }
        let m2 = central_moment(s, 2);
        if m2 <= f64::EPSILON * f64::EPSILON {
            return f64::NAN;
        }
        let g1 = central_moment(s, 3) / m2.powf(1.5);
        (n * (n - 1.0)).sqrt() / (n - 2.0) * g1
    })
}

/// Unbiased excess kurtosis. Zero-variance windows are NaN.
pub fn rolling_kurt(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, |s| {
        let n = s.len() as f64;
        if s.len() < 4 {
            return f64::NAN;
        }
        let m2 = central_moment(s, 2);
        if m2 <= f64::EPSILON * f64::EPSILON {
            return f64::NAN;
        }
        let g2 = central_moment(s, 4) / (m2 * m2) - 3.0;
        ((n + 1.0) * g2 + 6.0) * (n - 1.0) / ((n - 2.0) * (n - 3.0))
    })
}

/// Simple returns; the first element is NaN.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        out[i] = values[i] / values[i - 1] - 1.0;
    }
    out
}

/// Least-squares fit `y = slope * x + intercept`.
///
/// None for fewer than two points, constant x, or non-finite input.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return None;
    }

    let mx = mean(xs);
    let my = mean(ys);
    let sxx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();

    let slope = sxy / sxx;
    Some((slope, my - slope * mx))
}

/// Latest value of a series, NaN when empty.
pub fn last(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean_warmup() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert_eq!(out[2], 2.0);
        assert_eq!(out[3], 3.0);
    }

    #[test]
    fn test_rolling_skips_nan_windows() {
        let returns = pct_change(&[100.0, 110.0, 99.0, 99.0]);
        let sums = rolling_sum(&returns, 2);
        assert!(sums[1].is_nan()); // window includes the leading NaN
        assert!((sums[2] - (0.1 - 0.1)).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // population std is 2.0, sample std is sqrt(32/7)
        assert!((out[7] - (32.0_f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_skew_sign() {
        let right_tail = [1.0, 1.0, 1.0, 1.0, 1.0, 10.0];
        let left_tail = [10.0, 10.0, 10.0, 10.0, 10.0, 1.0];
        assert!(last(&rolling_skew(&right_tail, 6)) > 1.0);
        assert!(last(&rolling_skew(&left_tail, 6)) < -1.0);
        assert!(last(&rolling_skew(&[3.0; 6], 6)).is_nan());
    }

    #[test]
    fn test_kurtosis_of_uniform_is_negative() {
        let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert!(last(&rolling_kurt(&values, 20)) < 0.0);
    }

    #[test]
    fn test_linear_fit() {
        let (slope, intercept) = linear_fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);

        assert!(linear_fit(&[1.0], &[1.0]).is_none());
        assert!(linear_fit(&[1.0, 1.0], &[1.0, 2.0]).is_none());
        assert!(linear_fit(&[1.0, 2.0], &[f64::NAN, 2.0]).is_none());
    }
}
