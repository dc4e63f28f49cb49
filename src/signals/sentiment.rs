use super::{score, ModuleReport, Tally};
use crate::metrics::format::format_usd;
use crate::models::{MarketSnapshot, Signal};

/// Acceleration of flow: is the most recent window stronger than the
/// longer ones for buy pressure, price change and hourly volume?
pub fn analyze(snapshot: &MarketSnapshot) -> ModuleReport<Signal> {
    let mut tally = Tally::new("sentiment");

    let txns = &snapshot.txns;
    let (r1, r6, r24) = (
        txns.h1.buy_sell_ratio_or(1.0),
        txns.h6.buy_sell_ratio_or(1.0),
        txns.h24.buy_sell_ratio_or(1.0),
    );
    tally.record(
        "transaction_pattern",
        score(&[r1 > r6, r6 > r24]),
        format!("1h B/S: {:.2}, 6h B/S: {:.2}, 24h B/S: {:.2}", r1, r6, r24),
    );

    let change = &snapshot.price_change_pct;
    tally.record(
        "price_impact",
        score(&[change.h1 > change.h6, change.h6 > change.h24]),
        format!(
            "1h: {:.2}%, 6h: {:.2}%, 24h: {:.2}%",
            change.h1, change.h6, change.h24
        ),
    );

    let hourly_1h = snapshot.volume.h1;
    let hourly_6h = snapshot.volume.h6 / 6.0;
    let hourly_24h = snapshot.volume.h24 / 24.0;
    tally.record(
        "volume_trend",
        score(&[hourly_1h > hourly_6h, hourly_6h > hourly_24h]),
        format!(
            "1h Avg: {}, 6h Avg: {}, 24h Avg: {}",
            format_usd(hourly_1h),
            format_usd(hourly_6h),
            format_usd(hourly_24h)
        ),
    );

    tally.finish()
}
