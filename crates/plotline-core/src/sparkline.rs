use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::granularity::Granularity;
use crate::range::DateRange;
use crate::series::{materialize, SparseRow};

/// One point of a compact inline trend visual.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SparklinePoint {
    pub date: DateTime<Utc>,
    pub value: f64,
}

/// Flat one-value-per-bucket series for sparklines.
///
/// A projection of [`materialize`] rather than a separate bucketing path, so
/// a sparkline can never disagree with the full chart about bucket
/// boundaries for the same data.
pub fn to_sparkline(
    rows: &[SparseRow],
    granularity: Granularity,
    range: &DateRange,
    tz: Tz,
) -> Result<Vec<SparklinePoint>> {
    materialize(rows, granularity, range, tz)?
        .into_iter()
        .map(|point| {
            let date = DateTime::<Utc>::from_timestamp_millis(point.date)
                .ok_or_else(|| anyhow!("point date {} out of range", point.date))?;
            Ok(SparklinePoint {
                date,
                value: point.primary(),
            })
        })
        .collect()
}
