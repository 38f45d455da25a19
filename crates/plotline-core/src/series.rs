use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::granularity::Granularity;
use crate::interval::Interval;
use crate::range::{local_to_utc, DateRange};

/// Hard cap on points in one dense series. Matches the upstream range
/// validation bound (7 days of minute buckets); anything past it indicates a
/// caller bug rather than a legitimate chart.
pub const MAX_SERIES_POINTS: usize = 10_080;

/// One aggregation row as returned by the storage layer: the raw bucket-start
/// timestamp string and the metric value. Buckets with no events are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseRow {
    pub date: String,
    pub value: f64,
}

/// One gap-filled chart point.
///
/// `date` is the bucket start in epoch milliseconds. `value[0]` is the
/// primary series; `value[1]` is the comparison series when one is aligned.
/// A `None` primary value marks a point that must not be drawn solid (the
/// masked tail of an incomplete series under comparison).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseChartPoint {
    pub date: i64,
    pub value: Vec<Option<f64>>,
}

impl DenseChartPoint {
    /// The primary value, zero when masked or absent.
    pub fn primary(&self) -> f64 {
        self.value.first().copied().flatten().unwrap_or(0.0)
    }
}

/// Parse a storage-layer bucket timestamp, whatever shape the backend chose.
///
/// Accepts RFC 3339 as well as the naive `date_trunc` shapes
/// (`Y-m-d H:M:S[.f]`, `Y-m-dTH:M:S`, `Y-m-d`, `Y-m`); naive forms are
/// interpreted as wall time in `tz`, since bucket boundaries are local.
/// An unparseable date is a storage-contract violation and fatal.
pub fn parse_bucket_date(raw: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return local_to_utc(naive, tz);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid date '{raw}'"))?;
        return local_to_utc(naive, tz);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid date '{raw}'"))?;
        return local_to_utc(naive, tz);
    }
    Err(anyhow!("unparseable bucket date '{raw}'"))
}

/// Gap-fill sparse rows into one point per bucket across `range`, inclusive.
///
/// Rows are keyed by their normalized bucket-start epoch millis; generation
/// walks from the start of the bucket containing `start` one bucket at a
/// time until the bucket start passes `end`, emitting the row's value or
/// zero. Snapping the cursor onto the bucket grid keeps generated keys in
/// lockstep with the storage layer's `date_trunc` keys even when the range
/// opens mid-week or mid-month. Pure: the clock is never read here.
pub fn materialize(
    rows: &[SparseRow],
    granularity: Granularity,
    range: &DateRange,
    tz: Tz,
) -> Result<Vec<DenseChartPoint>> {
    let interval = Interval::new(granularity, tz);
    let range = range.truncated_to_minute()?;

    let mut lookup: HashMap<i64, f64> = HashMap::with_capacity(rows.len());
    for row in rows {
        let bucket = parse_bucket_date(&row.date, tz)
            .with_context(|| format!("bad row date '{}'", row.date))?;
        lookup.insert(bucket.timestamp_millis(), row.value);
    }

    let mut points = Vec::new();
    let mut cursor = interval.align(range.start)?;
    while cursor <= range.end {
        if points.len() >= MAX_SERIES_POINTS {
            return Err(anyhow!(
                "series exceeds {MAX_SERIES_POINTS} points for granularity {}",
                granularity.as_str()
            ));
        }
        let millis = cursor.timestamp_millis();
        points.push(DenseChartPoint {
            date: millis,
            value: vec![Some(lookup.get(&millis).copied().unwrap_or(0.0))],
        });
        cursor = interval.offset(cursor, 1)?;
    }
    Ok(points)
}
