// Metrics sink
// Display strings shared with the console, their reverse parsers, the four
// evaluation records and the InfluxDB writer they are shipped through.
pub mod format;
pub mod influx;
pub mod line;
pub mod records;

pub use influx::InfluxSink;
pub use line::{FieldValue, LinePoint};
pub use records::evaluation_points;

use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Time-series store for evaluation records.
///
/// Write failures are reported as `Error::DownstreamWriteFailure`; the
/// caller decides whether they are fatal.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn write(&self, points: &[LinePoint]) -> Result<()>;
}

#[async_trait]
impl<T: MetricsSink + ?Sized> MetricsSink for Arc<T> {
    async fn write(&self, points: &[LinePoint]) -> Result<()> {
        (**self).write(points).await
    }
}

impl From<format::ParseError> for crate::Error {
    fn from(err: format::ParseError) -> Self {
        crate::Error::DownstreamWriteFailure(err.to_string())
    }
}
