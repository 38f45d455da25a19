use anyhow::Result;
use async_trait::async_trait;
use chrono_tz::Tz;

use plotline_core::{DateRange, Granularity, Metric, SeriesSource, SparseRow};

use crate::DuckDbBackend;

#[async_trait]
impl SeriesSource for DuckDbBackend {
    async fn fetch_series(
        &self,
        website_id: &str,
        metric: Metric,
        range: &DateRange,
        granularity: Granularity,
        tz: Tz,
    ) -> Result<Vec<SparseRow>> {
        DuckDbBackend::fetch_series(self, website_id, metric, range, granularity, tz).await
    }
}
