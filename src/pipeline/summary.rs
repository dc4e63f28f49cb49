use crate::metrics::format::{format_pct, format_price, format_trades, format_usd};
use crate::models::MarketSnapshot;
use serde::Serialize;

/// Display view of the snapshot, shown first in the reasoning output and
/// read back by the `market_data` record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub market_cap: String,
    #[serde(rename = "24h_volume")]
    pub volume_24h: String,
    pub liquidity: String,
    #[serde(rename = "24h_change")]
    pub change_24h: String,
    pub trades_24h: String,
    /// Pool creation time, epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<i64>,
}

impl From<&MarketSnapshot> for MarketSummary {
    fn from(snapshot: &MarketSnapshot) -> Self {
        let trades = snapshot.txns.h24;
        Self {
            symbol: snapshot.base_token.symbol.clone(),
            name: snapshot.base_token.name.clone(),
            price: format_price(snapshot.price_usd),
            market_cap: format_usd(snapshot.fdv),
            volume_24h: format_usd(snapshot.volume.h24),
            liquidity: format_usd(snapshot.liquidity_usd),
            change_24h: format_pct(snapshot.price_change_pct.h24),
            trades_24h: format_trades(trades.buys, trades.sells),
            creation_date: snapshot.pair_created_at,
        }
    }
}
