use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::granularity::Granularity;
use crate::range::DateRange;
use crate::series::SparseRow;

/// The metric a chart or sparkline plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Pageviews,
    Visitors,
}

impl Metric {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("pageviews") => Ok(Self::Pageviews),
            Some("visitors") => Ok(Self::Visitors),
            Some(other) => Err(anyhow!(
                "unknown metric '{other}' (expected pageviews or visitors)"
            )),
        }
    }

    /// Field name carried into comparison maps and responses.
    pub fn data_key(&self) -> &'static str {
        match self {
            Self::Pageviews => "pageviews",
            Self::Visitors => "visitors",
        }
    }
}

/// Storage abstraction the presenter's callers fetch through.
///
/// Implementations return sparse rows only — one row per bucket that saw at
/// least one event, bucket starts expressed as raw timestamp strings in the
/// requested timezone's wall time. Gap-filling is the presenter's job.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch_series(
        &self,
        website_id: &str,
        metric: Metric,
        range: &DateRange,
        granularity: Granularity,
        tz: Tz,
    ) -> Result<Vec<SparseRow>>;
}
