use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::granularity::Granularity;
use crate::interval::Interval;
use crate::series::DenseChartPoint;

/// Result of splitting a dense series around not-yet-closed trailing buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncompleteSplit {
    /// Index of the first bucket whose end boundary is after `now`; `None`
    /// when every bucket has already closed.
    pub first_incomplete_index: Option<usize>,
    pub should_split: bool,
    /// Fully-closed prefix when split; the whole series otherwise.
    pub solid: Vec<DenseChartPoint>,
    /// The last solid bucket (kept so the dashed tail joins the solid line)
    /// plus every trailing open bucket. Absent when not splitting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incomplete: Option<Vec<DenseChartPoint>>,
}

impl IncompleteSplit {
    /// Start index of the incomplete slice within the original series.
    pub fn incomplete_start(&self) -> Option<usize> {
        if !self.should_split {
            return None;
        }
        self.first_incomplete_index.map(|i| i.saturating_sub(1))
    }
}

/// Split `series` into a solid prefix and an incomplete tail.
///
/// A bucket counts as incomplete when its end boundary (start advanced by one
/// bucket) lies strictly after `now`. The split only happens when the caller
/// flagged the range as reaching the present (`bucket_incomplete`), an open
/// bucket exists, and the tail would carry at least two points; a single
/// dangling point renders as a meaningless dash and is left in the solid
/// series instead.
pub fn split_incomplete(
    series: &[DenseChartPoint],
    granularity: Granularity,
    now: DateTime<Utc>,
    tz: Tz,
    bucket_incomplete: bool,
) -> Result<IncompleteSplit> {
    let interval = Interval::new(granularity, tz);

    let mut first_incomplete_index = None;
    for (i, point) in series.iter().enumerate() {
        let start = DateTime::<Utc>::from_timestamp_millis(point.date)
            .ok_or_else(|| anyhow!("point date {} out of range", point.date))?;
        if interval.offset(start, 1)? > now {
            first_incomplete_index = Some(i);
            break;
        }
    }

    let should_split = match first_incomplete_index {
        Some(first) if bucket_incomplete => {
            // Tail length includes the join point at first - 1 (when any).
            series.len() - first.saturating_sub(1) >= 2
        }
        _ => false,
    };

    if !should_split {
        return Ok(IncompleteSplit {
            first_incomplete_index,
            should_split: false,
            solid: series.to_vec(),
            incomplete: None,
        });
    }

    // should_split guarantees Some(first) here.
    let first = first_incomplete_index.unwrap_or(0);
    Ok(IncompleteSplit {
        first_incomplete_index,
        should_split: true,
        solid: series[..first].to_vec(),
        incomplete: Some(series[first.saturating_sub(1)..].to_vec()),
    })
}
