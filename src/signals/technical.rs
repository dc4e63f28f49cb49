use super::{score, ModuleReport, Tally};
use crate::metrics::format::format_usd;
use crate::models::{MarketSnapshot, Signal};

/// Buy/sell ratio above which a window counts as buy pressure
const PRESSURE_RATIO: f64 = 1.1;

/// Snapshot momentum, volume acceleration and buy/sell pressure.
///
/// Works on the feed's windowed aggregates only; the candle-based toolkit
/// lives in `strategy`.
pub fn analyze(snapshot: &MarketSnapshot) -> ModuleReport<Signal> {
    let mut tally = Tally::new("technical");

    let change = &snapshot.price_change_pct;
    tally.record(
        "momentum_signal",
        score(&[change.h1 > 0.0, change.h6 > 0.0, change.h24 > 0.0]),
        format!(
            "1h: {:.2}%, 6h: {:.2}%, 24h: {:.2}%",
            change.h1, change.h6, change.h24
        ),
    );

    let volume = &snapshot.volume;
    let hourly_6h = volume.h6 / 6.0;
    let hourly_24h = volume.h24 / 24.0;
    tally.record(
        "volume_signal",
        score(&[volume.h1 > hourly_6h, hourly_6h > hourly_24h]),
        format!(
            "1h Vol: {}, 6h Avg: {}, 24h Avg: {}",
            format_usd(volume.h1),
            format_usd(hourly_6h),
            format_usd(hourly_24h)
        ),
    );

    let txns = &snapshot.txns;
    let ratios = [
        txns.h1.buy_sell_ratio_or(1.0),
        txns.h6.buy_sell_ratio_or(1.0),
        txns.h24.buy_sell_ratio_or(1.0),
    ];
    tally.record(
        "pressure_signal",
        score(&ratios.map(|r| r > PRESSURE_RATIO)),
        format!(
            "1h B/S: {:.2}, 6h B/S: {:.2}, 24h B/S: {:.2}",
            ratios[0], ratios[1], ratios[2]
        ),
    );

    tally.finish()
}
