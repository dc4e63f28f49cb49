pub mod dexscreener;

pub use dexscreener::{liquidity_by_dex, select_pair, DexScreenerClient, PairData};

use crate::Result;
use async_trait::async_trait;

/// Source of raw trading-pair data for a token.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// All pairs the venue reports for `token_address`, across every chain.
    async fn fetch_pairs(&self, token_address: &str) -> Result<Vec<PairData>>;
}
