use super::line::LinePoint;
use super::MetricsSink;
use crate::config::InfluxConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use tokio::time::Duration;

const WRITE_TIMEOUT_SECS: u64 = 10;

/// InfluxDB v2 writer over the HTTP line-protocol endpoint.
///
/// One request per batch, no retries; a failed write is reported to the
/// caller and the records are dropped.
#[derive(Clone)]
pub struct InfluxSink {
    client: Client,
    write_url: String,
    org: String,
    bucket: String,
    token: String,
}

impl InfluxSink {
    pub fn new(config: &InfluxConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WRITE_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            write_url: format!("{}/api/v2/write", config.url.trim_end_matches('/')),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl MetricsSink for InfluxSink {
    async fn write(&self, points: &[LinePoint]) -> Result<()> {
        let body: Vec<String> = points.iter().filter_map(LinePoint::to_line).collect();
        if body.is_empty() {
            tracing::debug!("No metrics to write");
            return Ok(());
        }

        let response = self
            .client
            .post(&self.write_url)
            .query(&[
                ("org", self.org.as_str()),
                ("bucket", self.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body.join("\n"))
            .send()
            .await
            .map_err(|e| Error::DownstreamWriteFailure(format!("network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::DownstreamWriteFailure(format!(
                "HTTP {} - {}",
                status, detail
            )));
        }

        tracing::info!("Wrote {} records to bucket {}", body.len(), self.bucket);
        Ok(())
    }
}
