use super::{score, ModuleReport, Tally};
use crate::metrics::format::format_usd;
use crate::models::{MarketSnapshot, Signal};

/// Liquidity, volume, trend and activity tiers of the traded pair.
pub fn analyze(snapshot: &MarketSnapshot) -> ModuleReport<Signal> {
    let mut tally = Tally::new("fundamental");

    let liquidity = snapshot.liquidity_usd;
    tally.record(
        "liquidity_signal",
        score(&[liquidity > 1_000_000.0, liquidity > 5_000_000.0]),
        format!("Total Liquidity: {}", format_usd(liquidity)),
    );

    let daily_volume = snapshot.volume.h24;
    let volume_to_liquidity = if liquidity > 0.0 {
        daily_volume / liquidity
    } else {
        0.0
    };
    tally.record(
        "volume_signal",
        score(&[daily_volume > 1_000_000.0, volume_to_liquidity > 0.1]),
        format!(
            "24h Volume: {}, Volume/Liquidity Ratio: {:.2}",
            format_usd(daily_volume),
            volume_to_liquidity
        ),
    );

    let change = &snapshot.price_change_pct;
    tally.record(
        "price_signal",
        score(&[change.h24 > 0.0, change.h6 > 0.0]),
        format!("24h Change: {:.2}%, 6h Change: {:.2}%", change.h24, change.h6),
    );

    let txns = snapshot.txns.h24;
    let buy_sell_ratio = txns.buy_sell_ratio_or(1.0);
    tally.record(
        "transaction_signal",
        score(&[buy_sell_ratio > 1.5, txns.total() > 1000]),
        format!(
            "Buy/Sell Ratio: {:.2}, Total Transactions: {}",
            buy_sell_ratio,
            txns.total()
        ),
    );

    tally.finish()
}
