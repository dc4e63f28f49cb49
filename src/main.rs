use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use dexsignal::api::DexScreenerClient;
use dexsignal::config::AppConfig;
use dexsignal::metrics::InfluxSink;
use dexsignal::{EvaluationRequest, Orchestrator};
use tracing_subscriber::EnvFilter;

/// Score one token's current market and emit a bounded trade decision
#[derive(Parser)]
#[command(name = "dexsignal")]
#[command(version, about = "Signal aggregation over DexScreener market data")]
struct Cli {
    /// Token contract address
    #[arg(long)]
    token_address: String,

    /// Only consider pairs on this chain (e.g. base, ethereum, solana)
    #[arg(long)]
    chain_id: Option<String>,

    /// Start date (YYYY-MM-DD), reserved for historical mode
    #[arg(long, value_parser = parse_date)]
    start_date: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), reserved for historical mode
    #[arg(long, value_parser = parse_date)]
    end_date: Option<NaiveDate>,

    /// Print every module's reasoning
    #[arg(long)]
    show_reasoning: bool,
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got {:?}: {}", raw, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("loading configuration")?;
    setup_logging(&config.log_filter);
    if config.influx.is_none() {
        if config.missing_influx_vars.is_empty() {
            tracing::warn!("No InfluxDB configuration, decisions will not be recorded");
        } else {
            tracing::warn!(
                "Metrics sink disabled, missing InfluxDB variables: {}",
                config.missing_influx_vars.join(", ")
            );
        }
    }

    if let (Some(start), Some(end)) = (cli.start_date, cli.end_date) {
        anyhow::ensure!(start <= end, "start date {} is after end date {}", start, end);
    }
    if cli.start_date.is_some() || cli.end_date.is_some() {
        tracing::info!("Date range accepted but not used for live evaluation");
    }

    let feed = DexScreenerClient::new(&config.feed)?;
    let sink = match &config.influx {
        Some(influx) => Some(InfluxSink::new(influx)?),
        None => None,
    };
    let orchestrator = Orchestrator::new(feed, sink);

    let mut request = EvaluationRequest::new(&cli.token_address).with_reasoning(cli.show_reasoning);
    if let Some(chain) = &cli.chain_id {
        request = request.on_chain(chain);
    }

    match orchestrator.evaluate(&request).await {
        Ok(evaluation) => {
            println!("{}", serde_json::to_string_pretty(&evaluation.decision)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Evaluation failed: {}", e);
            Err(e.into())
        }
    }
}

/// `RUST_LOG` wins over the configured filter
fn setup_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
