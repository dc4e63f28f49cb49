use super::MarketFeed;
use crate::config::FeedConfig;
use crate::models::{BaseToken, MarketSnapshot, TxnCounts, Windowed};
use crate::{Error, Result};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

const INITIAL_BACKOFF_MS: u64 = 2000; // Start with 2 seconds

type FeedRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Client for DexScreener API
///
/// Cloneable; all clones share one rate limiter.
#[derive(Clone)]
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    initial_backoff: Duration,
    rate_limiter: Arc<FeedRateLimiter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexScreenerResponse {
    #[serde(default)]
    pairs: Option<Vec<PairData>>,
    #[serde(default)]
    #[allow(dead_code)]
    schema_version: Option<String>,
}

/// One trading venue for a token, exactly as the feed reports it.
///
/// Every field is optional here; `MarketSnapshot::try_from` decides which
/// ones are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairData {
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub dex_id: Option<String>,
    #[serde(default)]
    pub pair_address: Option<String>,
    #[serde(default)]
    pub base_token: Option<TokenInfo>,
    #[serde(default)]
    pub price_usd: Option<Value>,
    #[serde(default)]
    pub fdv: Option<Value>,
    #[serde(default)]
    pub liquidity: Option<LiquidityData>,
    #[serde(default)]
    pub volume: Option<WindowData>,
    #[serde(default)]
    pub price_change: Option<WindowData>,
    #[serde(default)]
    pub txns: Option<TxnWindowData>,
    /// Pool creation time, epoch milliseconds
    #[serde(default)]
    pub pair_created_at: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiquidityData {
    #[serde(default)]
    pub usd: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowData {
    #[serde(default)]
    pub h1: Option<Value>,
    #[serde(default)]
    pub h6: Option<Value>,
    #[serde(default)]
    pub h24: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxnWindowData {
    #[serde(default)]
    pub h1: Option<TxnData>,
    #[serde(default)]
    pub h6: Option<TxnData>,
    #[serde(default)]
    pub h24: Option<TxnData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxnData {
    #[serde(default)]
    pub buys: Option<Value>,
    #[serde(default)]
    pub sells: Option<Value>,
}

impl PairData {
    /// Pool liquidity used for venue ranking; missing or unparsable counts as 0.
    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity
            .as_ref()
            .and_then(|l| l.usd.as_ref())
            .and_then(numeric)
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    fn chain_lowercase(&self) -> String {
        self.chain_id.as_deref().unwrap_or_default().to_lowercase()
    }
}

/// Numbers arrive either as JSON numbers or as numeric strings (`priceUsd`).
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn required_f64(value: Option<&Value>, field: &'static str) -> Result<f64> {
    let value = value.ok_or_else(|| Error::malformed(field, "is missing"))?;
    let parsed = numeric(value)
        .ok_or_else(|| Error::malformed(field, format!("is not numeric: {}", value)))?;
    if !parsed.is_finite() {
        return Err(Error::malformed(field, "is not finite"));
    }
    Ok(parsed)
}

fn required_non_negative(value: Option<&Value>, field: &'static str) -> Result<f64> {
    let parsed = required_f64(value, field)?;
    if parsed < 0.0 {
        return Err(Error::malformed(field, format!("is negative: {}", parsed)));
    }
    Ok(parsed)
}

fn required_count(value: Option<&Value>, field: &'static str) -> Result<u64> {
    let parsed = required_non_negative(value, field)?;
    if parsed.fract() != 0.0 {
        return Err(Error::malformed(field, format!("is not an integer: {}", parsed)));
    }
    Ok(parsed as u64)
}

fn window_values(
    window: Option<&WindowData>,
    fields: [&'static str; 3],
    signed: bool,
) -> Result<Windowed<f64>> {
    let read = |v: Option<&Value>, field| {
        if signed {
            required_f64(v, field)
        } else {
            required_non_negative(v, field)
        }
    };
    Ok(Windowed {
        h1: read(window.and_then(|w| w.h1.as_ref()), fields[0])?,
        h6: read(window.and_then(|w| w.h6.as_ref()), fields[1])?,
        h24: read(window.and_then(|w| w.h24.as_ref()), fields[2])?,
    })
}

fn txn_counts(
    data: Option<&TxnData>,
    buys_field: &'static str,
    sells_field: &'static str,
) -> Result<TxnCounts> {
    Ok(TxnCounts {
        buys: required_count(data.and_then(|d| d.buys.as_ref()), buys_field)?,
        sells: required_count(data.and_then(|d| d.sells.as_ref()), sells_field)?,
    })
}

/// Creation time is informational; anything that is not a whole number of
/// milliseconds is ignored rather than failing the snapshot.
fn created_at_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0)
                .map(|v| v as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl TryFrom<&PairData> for MarketSnapshot {
    type Error = Error;

    fn try_from(pair: &PairData) -> Result<Self> {
        let base = pair
            .base_token
            .as_ref()
            .ok_or_else(|| Error::malformed("baseToken", "is missing"))?;
        let symbol = base
            .symbol
            .clone()
            .ok_or_else(|| Error::malformed("baseToken.symbol", "is missing"))?;
        let name = base
            .name
            .clone()
            .ok_or_else(|| Error::malformed("baseToken.name", "is missing"))?;

        let txns = pair.txns.as_ref();

        Ok(MarketSnapshot {
            price_usd: required_non_negative(pair.price_usd.as_ref(), "priceUsd")?,
            liquidity_usd: required_non_negative(
                pair.liquidity.as_ref().and_then(|l| l.usd.as_ref()),
                "liquidity.usd",
            )?,
            fdv: required_non_negative(pair.fdv.as_ref(), "fdv")?,
            volume: window_values(
                pair.volume.as_ref(),
                ["volume.h1", "volume.h6", "volume.h24"],
                false,
            )?,
            price_change_pct: window_values(
                pair.price_change.as_ref(),
                ["priceChange.h1", "priceChange.h6", "priceChange.h24"],
                true,
            )?,
            txns: Windowed {
                h1: txn_counts(
                    txns.and_then(|t| t.h1.as_ref()),
                    "txns.h1.buys",
                    "txns.h1.sells",
                )?,
                h6: txn_counts(
                    txns.and_then(|t| t.h6.as_ref()),
                    "txns.h6.buys",
                    "txns.h6.sells",
                )?,
                h24: txn_counts(
                    txns.and_then(|t| t.h24.as_ref()),
                    "txns.h24.buys",
                    "txns.h24.sells",
                )?,
            },
            base_token: BaseToken { symbol, name },
            chain_id: pair.chain_id.clone(),
            dex_id: pair.dex_id.clone(),
            pair_address: pair.pair_address.clone(),
            pair_created_at: pair.pair_created_at.as_ref().and_then(created_at_millis),
        })
    }
}

/// Pick the canonical venue for a token: filter by chain (case-insensitive)
/// when one is requested, then take the deepest pool.
pub fn select_pair<'a>(
    pairs: &'a [PairData],
    token_address: &str,
    chain_id: Option<&str>,
) -> Result<&'a PairData> {
    if pairs.is_empty() {
        return Err(Error::NoPairsFound {
            token: token_address.to_string(),
        });
    }

    let wanted = chain_id.map(str::to_lowercase);
    let mut best: Option<&PairData> = None;
    for pair in pairs {
        if let Some(chain) = &wanted {
            if pair.chain_lowercase() != *chain {
                continue;
            }
        }
        // First pair wins ties
        if best.map_or(true, |current| pair.liquidity_usd() > current.liquidity_usd()) {
            best = Some(pair);
        }
    }

    best.ok_or_else(|| {
        let available: BTreeSet<String> = pairs
            .iter()
            .map(PairData::chain_lowercase)
            .filter(|chain| !chain.is_empty())
            .collect();
        Error::NoPairsOnChain {
            token: token_address.to_string(),
            chain: wanted.unwrap_or_default(),
            available: available.into_iter().collect(),
        }
    })
}

/// Total pool liquidity per DEX, optionally restricted to one chain.
pub fn liquidity_by_dex(pairs: &[PairData], chain_id: Option<&str>) -> BTreeMap<String, f64> {
    let wanted = chain_id.map(str::to_lowercase);
    let mut by_dex = BTreeMap::new();

    for pair in pairs {
        if let Some(chain) = &wanted {
            if pair.chain_lowercase() != *chain {
                continue;
            }
        }
        let dex = pair.dex_id.clone().unwrap_or_else(|| "unknown".to_string());
        *by_dex.entry(dex).or_insert(0.0) += pair.liquidity_usd();
    }

    by_dex
}

/// Outcome of one HTTP attempt
enum Attempt {
    Done(Vec<PairData>),
    Retryable(String),
    Fatal(String),
}

impl DexScreenerClient {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        let per_minute = NonZeroU32::new(config.rate_limit_per_minute)
            .ok_or_else(|| Error::Config("feed rate limit must be greater than 0".into()))?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            rate_limiter,
        })
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Fetch all pairs for a token
    /// Includes retry logic with exponential backoff for transient failures
    async fn fetch_with_retry(&self, token_address: &str) -> Result<Vec<PairData>> {
        let url = format!("{}/tokens/{}", self.base_url, token_address);
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=self.max_retries {
            self.rate_limiter.until_ready().await;
            tracing::debug!("Fetching data from: {}", url);

            match self.fetch_once(&url).await {
                Attempt::Done(pairs) => {
                    if attempt > 1 {
                        tracing::info!(
                            "✓ Successfully fetched {} after {} attempts",
                            token_address,
                            attempt
                        );
                    }
                    tracing::info!("Found {} pairs for token {}", pairs.len(), token_address);
                    return Ok(pairs);
                }
                Attempt::Fatal(reason) => return Err(Error::FeedUnavailable(reason)),
                Attempt::Retryable(reason) => {
                    last_error = reason;
                    if attempt < self.max_retries {
                        let backoff = self.initial_backoff * 2_u32.pow(attempt - 1);
                        tracing::warn!(
                            "Attempt {}/{} failed for {}: {}. Retrying in {}ms...",
                            attempt,
                            self.max_retries,
                            token_address,
                            last_error,
                            backoff.as_millis()
                        );
                        sleep(backoff).await;
                    }
                }
            }
        }

        Err(Error::FeedUnavailable(format!(
            "all {} attempts failed: {}",
            self.max_retries, last_error
        )))
    }

    async fn fetch_once(&self, url: &str) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Attempt::Retryable(format!("network error: {}", e)),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Attempt::Retryable(format!("HTTP {}", status));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Attempt::Fatal(format!("Error fetching data: {} - {}", status, body));
        }

        match response.json::<DexScreenerResponse>().await {
            Ok(body) => Attempt::Done(body.pairs.unwrap_or_default()),
            Err(e) => Attempt::Fatal(format!("undecodable response: {}", e)),
        }
    }
}

#[async_trait]
impl MarketFeed for DexScreenerClient {
    async fn fetch_pairs(&self, token_address: &str) -> Result<Vec<PairData>> {
        self.fetch_with_retry(token_address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair_json(chain: &str, dex: &str, liquidity: f64) -> Value {
        json!({
            "chainId": chain,
            "dexId": dex,
            "pairAddress": format!("{}-{}", chain, dex),
            "baseToken": {"address": "0xabc", "name": "Test Token", "symbol": "TEST"},
            "priceUsd": "1.2500",
            "fdv": 2_500_000.0,
            "liquidity": {"usd": liquidity},
            "volume": {"h1": 10_000.0, "h6": 50_000.0, "h24": 150_000.0},
            "priceChange": {"h1": 0.5, "h6": -1.2, "h24": 3.4},
            "txns": {
                "h1": {"buys": 12, "sells": 8},
                "h6": {"buys": 80, "sells": 60},
                "h24": {"buys": 300, "sells": 250}
            }
        })
    }

    fn pair(chain: &str, dex: &str, liquidity: f64) -> PairData {
        serde_json::from_value(pair_json(chain, dex, liquidity)).unwrap()
    }

    #[test]
    fn test_snapshot_from_pair() {
        let snapshot = MarketSnapshot::try_from(&pair("base", "uniswap", 400_000.0)).unwrap();

        assert_eq!(snapshot.price_usd, 1.25);
        assert_eq!(snapshot.liquidity_usd, 400_000.0);
        assert_eq!(snapshot.fdv, 2_500_000.0);
        assert_eq!(snapshot.volume.h24, 150_000.0);
        assert_eq!(snapshot.price_change_pct.h6, -1.2);
        assert_eq!(snapshot.txns.h24, TxnCounts { buys: 300, sells: 250 });
        assert_eq!(snapshot.base_token.symbol, "TEST");
        assert_eq!(snapshot.chain_id.as_deref(), Some("base"));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let mut raw = pair_json("base", "uniswap", 1.0);
        raw["volume"].as_object_mut().unwrap().remove("h6");
        let pair: PairData = serde_json::from_value(raw).unwrap();

        match MarketSnapshot::try_from(&pair) {
            Err(Error::MalformedSnapshot { field, .. }) => assert_eq!(field, "volume.h6"),
            other => panic!("expected MalformedSnapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_price_is_malformed() {
        let mut raw = pair_json("base", "uniswap", 1.0);
        raw["priceUsd"] = json!("n/a");
        let pair: PairData = serde_json::from_value(raw).unwrap();

        match MarketSnapshot::try_from(&pair) {
            Err(Error::MalformedSnapshot { field, .. }) => assert_eq!(field, "priceUsd"),
            other => panic!("expected MalformedSnapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_select_most_liquid_pair() {
        let pairs = vec![
            pair("base", "uniswap", 100_000.0),
            pair("base", "aerodrome", 900_000.0),
            pair("ethereum", "uniswap", 5_000_000.0),
        ];

        let chosen = select_pair(&pairs, "0xabc", Some("BASE")).unwrap();
        assert_eq!(chosen.dex_id.as_deref(), Some("aerodrome"));

        let chosen = select_pair(&pairs, "0xabc", None).unwrap();
        assert_eq!(chosen.chain_id.as_deref(), Some("ethereum"));
    }

    #[test]
    fn test_select_pair_errors() {
        assert!(matches!(
            select_pair(&[], "0xabc", None),
            Err(Error::NoPairsFound { .. })
        ));

        let pairs = vec![pair("solana", "raydium", 1.0), pair("base", "uniswap", 1.0)];
        match select_pair(&pairs, "0xabc", Some("arbitrum")) {
            Err(Error::NoPairsOnChain { chain, available, .. }) => {
                assert_eq!(chain, "arbitrum");
                assert_eq!(available, vec!["base".to_string(), "solana".to_string()]);
            }
            other => panic!("expected NoPairsOnChain, got {:?}", other),
        }
    }

    #[test]
    fn test_unlabelled_chain_not_listed_as_available() {
        let mut unlabelled = pair_json("base", "uniswap", 5.0);
        unlabelled.as_object_mut().unwrap().remove("chainId");
        let pairs = vec![
            pair("solana", "raydium", 1.0),
            serde_json::from_value::<PairData>(unlabelled).unwrap(),
        ];

        match select_pair(&pairs, "0xabc", Some("base")) {
            Err(Error::NoPairsOnChain { available, .. }) => {
                assert_eq!(available, vec!["solana".to_string()]);
            }
            other => panic!("expected NoPairsOnChain, got {:?}", other),
        }
    }

    #[test]
    fn test_pair_creation_time_carried_through() {
        let mut raw = pair_json("base", "uniswap", 5.0);
        raw["pairCreatedAt"] = json!(1_700_000_000_000i64);
        let snapshot = MarketSnapshot::try_from(&serde_json::from_value::<PairData>(raw).unwrap())
            .unwrap();
        assert_eq!(snapshot.pair_created_at, Some(1_700_000_000_000));

        let mut odd = pair_json("base", "uniswap", 5.0);
        odd["pairCreatedAt"] = json!("soon");
        let snapshot = MarketSnapshot::try_from(&serde_json::from_value::<PairData>(odd).unwrap())
            .unwrap();
        assert_eq!(snapshot.pair_created_at, None);
    }

    #[test]
    fn test_liquidity_by_dex() {
        let pairs = vec![
            pair("base", "uniswap", 100.0),
            pair("base", "uniswap", 50.0),
            pair("base", "aerodrome", 25.0),
            pair("ethereum", "uniswap", 1000.0),
        ];

        let by_dex = liquidity_by_dex(&pairs, Some("base"));
        assert_eq!(by_dex.get("uniswap"), Some(&150.0));
        assert_eq!(by_dex.get("aerodrome"), Some(&25.0));
    }

    #[tokio::test]
    async fn test_fetch_pairs_from_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({"schemaVersion": "1.0.0", "pairs": [pair_json("base", "uniswap", 10.0)]});
        let mock = server
            .mock("GET", "/tokens/0xabc")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let config = FeedConfig {
            base_url: server.url(),
            ..FeedConfig::default()
        };
        let client = DexScreenerClient::new(&config).unwrap();
        let pairs = client.fetch_pairs("0xabc").await.unwrap();

        mock.assert_async().await;
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].dex_id.as_deref(), Some("uniswap"));
    }

    #[tokio::test]
    async fn test_null_pairs_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tokens/0xdead")
            .with_status(200)
            .with_body(r#"{"schemaVersion":"1.0.0","pairs":null}"#)
            .create_async()
            .await;

        let config = FeedConfig {
            base_url: server.url(),
            ..FeedConfig::default()
        };
        let client = DexScreenerClient::new(&config).unwrap();
        assert!(client.fetch_pairs("0xdead").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_errors_exhaust_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tokens/0xabc")
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let config = FeedConfig {
            base_url: server.url(),
            max_retries: 2,
            ..FeedConfig::default()
        };
        let client = DexScreenerClient::new(&config)
            .unwrap()
            .with_initial_backoff(Duration::from_millis(1));

        let result = client.fetch_pairs("0xabc").await;
        mock.assert_async().await;
        assert!(matches!(result, Err(Error::FeedUnavailable(_))));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tokens/0xabc")
            .with_status(404)
            .with_body("not found")
            .expect(1)
            .create_async()
            .await;

        let config = FeedConfig {
            base_url: server.url(),
            ..FeedConfig::default()
        };
        let client = DexScreenerClient::new(&config).unwrap();

        let result = client.fetch_pairs("0xabc").await;
        mock.assert_async().await;
        assert!(matches!(result, Err(Error::FeedUnavailable(_))));
    }
}
