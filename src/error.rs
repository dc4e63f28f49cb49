use thiserror::Error;

/// Failures of a single token evaluation cycle.
///
/// Everything except `DownstreamWriteFailure` aborts the cycle; no partial
/// decision is ever produced.
#[derive(Debug, Error)]
pub enum Error {
    #[error("market data feed unavailable: {0}")]
    FeedUnavailable(String),

    #[error("no pairs found for token {token}")]
    NoPairsFound { token: String },

    #[error(
        "no pairs found for token {token} on chain {chain}. Available chains: {}",
        available.join(", ")
    )]
    NoPairsOnChain {
        token: String,
        chain: String,
        available: Vec<String>,
    },

    #[error("malformed snapshot: field `{field}` {reason}")]
    MalformedSnapshot { field: &'static str, reason: String },

    #[error("metrics sink write failed: {0}")]
    DownstreamWriteFailure(String),

    #[error("{module} module failed: {reason}")]
    ModuleFailed { module: &'static str, reason: String },

    #[error("evaluation context key `{key}` already set")]
    ContextConflict { key: &'static str },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Error::MalformedSnapshot {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the cycle can still hand its decision back to the caller.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::DownstreamWriteFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pairs_on_chain_lists_available_chains() {
        let err = Error::NoPairsOnChain {
            token: "0xabc".to_string(),
            chain: "base".to_string(),
            available: vec!["ethereum".to_string(), "solana".to_string()],
        };

        let msg = err.to_string();
        assert!(msg.contains("on chain base"));
        assert!(msg.contains("ethereum, solana"));
    }

    #[test]
    fn test_only_downstream_failures_are_non_fatal() {
        assert!(!Error::DownstreamWriteFailure("timeout".into()).is_fatal());
        assert!(Error::FeedUnavailable("503".into()).is_fatal());
        assert!(Error::malformed("priceUsd", "is missing").is_fatal());
    }
}
