// Technical indicators module
// Pure functions over ascending price/volume series. Series forms are aligned
// with their input and hold NaN until the window has warmed up.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod hurst;
pub mod ichimoku;
pub mod moving_average;
pub mod obv;
pub mod rsi;
pub mod stats;

pub use adx::{adx_series, calculate_adx, DirectionalIndex};
pub use atr::{atr_series, calculate_atr, true_range_series};
pub use bollinger::{bollinger_bands, calculate_bollinger, BollingerBands};
pub use hurst::hurst_exponent;
pub use ichimoku::{ichimoku, Ichimoku};
pub use moving_average::{calculate_ema, calculate_sma, ema_series, ewm_mean, macd, sma_series};
pub use obv::obv_series;
pub use rsi::{calculate_rsi, rsi_series};
pub use stats::{
    last, linear_fit, pct_change, rolling_kurt, rolling_mean, rolling_skew, rolling_std,
    rolling_sum,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error("Insufficient data: {got} candles, need {needed}")]
    InsufficientData { needed: usize, got: usize },

    #[error("indicator undefined: {0}")]
    Undefined(&'static str),
}

/// Reject series shorter than `needed`.
pub(crate) fn require_len(got: usize, needed: usize) -> Result<(), IndicatorError> {
    if got < needed {
        Err(IndicatorError::InsufficientData { needed, got })
    } else {
        Ok(())
    }
}
