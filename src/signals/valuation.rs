use super::{score, ModuleReport, Tally};
use crate::metrics::format::format_usd;
use crate::models::{MarketSnapshot, Signal};

/// Valuation relative to pool depth and turnover, plus oversold reversals.
///
/// FDV stands in for market cap and pool liquidity for TVL.
pub fn analyze(snapshot: &MarketSnapshot) -> ModuleReport<Signal> {
    let mut tally = Tally::new("valuation");

    let market_cap = snapshot.fdv;
    let tvl = snapshot.liquidity_usd;
    let mcap_tvl = if tvl > 0.0 {
        market_cap / tvl
    } else {
        f64::INFINITY
    };
    tally.record(
        "mcap_tvl_analysis",
        score(&[mcap_tvl < 4.0, mcap_tvl < 2.0]),
        format!(
            "Market Cap: {}, TVL: {}, Ratio: {:.2}",
            format_usd(market_cap),
            format_usd(tvl),
            mcap_tvl
        ),
    );

    let daily_volume = snapshot.volume.h24;
    let volume_mcap = if market_cap > 0.0 {
        daily_volume / market_cap
    } else {
        0.0
    };
    tally.record(
        "volume_mcap_analysis",
        score(&[volume_mcap > 0.05, volume_mcap > 0.10]),
        format!(
            "24h Volume: {}, Volume/MCap Ratio: {:.3}",
            format_usd(daily_volume),
            volume_mcap
        ),
    );

    let change = &snapshot.price_change_pct;
    tally.record(
        "momentum_value_analysis",
        score(&[
            change.h24 < -10.0 && change.h6 > 0.0,
            change.h24 < -20.0 && change.h6 > 2.0,
        ]),
        format!("24h Change: {:.2}%, 6h Change: {:.2}%", change.h24, change.h6),
    );

    tally.finish()
}
