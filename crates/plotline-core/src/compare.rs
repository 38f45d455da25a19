use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::range::{local_to_utc, DateRange};
use crate::series::DenseChartPoint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    #[default]
    None,
    PreviousPeriod,
    PreviousYear,
    Custom,
}

impl CompareMode {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") | Some("none") => Ok(Self::None),
            Some("previous_period") => Ok(Self::PreviousPeriod),
            Some("previous_year") => Ok(Self::PreviousYear),
            Some("custom") => Ok(Self::Custom),
            Some(_) => Err(anyhow!(
                "compare_mode must be one of: none, previous_period, previous_year, custom"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRange {
    pub mode: CompareMode,
    pub primary: DateRange,
    pub comparison: DateRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonMetadata {
    pub mode: CompareMode,
    pub primary_range: [String; 2],
    pub comparison_range: [String; 2],
}

impl ComparisonRange {
    pub fn to_metadata(&self) -> ComparisonMetadata {
        ComparisonMetadata {
            mode: self.mode.clone(),
            primary_range: [
                self.primary.start.to_rfc3339(),
                self.primary.end.to_rfc3339(),
            ],
            comparison_range: [
                self.comparison.start.to_rfc3339(),
                self.comparison.end.to_rfc3339(),
            ],
        }
    }
}

/// Resolve the comparison window for a primary range.
///
/// `previous_period` shifts both bounds back by the primary's wall-clock
/// width so the two windows hold the same number of buckets;
/// `previous_year` shifts back 365 days; `custom` takes the caller's range
/// as-is. Shifts happen in `tz`'s local frame: a window opening at local
/// midnight still opens at local midnight after crossing a DST transition,
/// where a fixed UTC-duration shift would drift an hour off. Calendar
/// asymmetries (a 28-day month against a 31-day one) are allowed here — the
/// aligner degrades on bucket-count mismatch later.
pub fn resolve_comparison_range(
    primary: &DateRange,
    mode: CompareMode,
    custom: Option<DateRange>,
    tz: Tz,
) -> Result<Option<ComparisonRange>> {
    if matches!(mode, CompareMode::None) {
        return Ok(None);
    }

    let comparison = match mode {
        CompareMode::PreviousPeriod => {
            let start_local = primary.start.with_timezone(&tz).naive_local();
            let end_local = primary.end.with_timezone(&tz).naive_local();
            let width = end_local - start_local + Duration::minutes(1);
            shift_back(primary, width, tz)?
        }
        CompareMode::PreviousYear => shift_back(primary, Duration::days(365), tz)?,
        CompareMode::Custom => {
            custom.ok_or_else(|| anyhow!("custom compare requires compare_start_date and compare_end_date"))?
        }
        CompareMode::None => unreachable!(),
    };

    if comparison.inclusive_width() > primary.inclusive_width() * 2 {
        return Err(anyhow!(
            "comparison range cannot exceed primary range duration x 2"
        ));
    }

    Ok(Some(ComparisonRange {
        mode,
        primary: *primary,
        comparison,
    }))
}

/// Shift both bounds back by `by` as local wall time in `tz`.
///
/// Errors if a shifted wall time lands in a DST spring-forward gap.
fn shift_back(range: &DateRange, by: Duration, tz: Tz) -> Result<DateRange> {
    let start = local_to_utc(range.start.with_timezone(&tz).naive_local() - by, tz)?;
    let end = local_to_utc(range.end.with_timezone(&tz).naive_local() - by, tz)?;
    DateRange::new(start, end)
}

/// One bucket of the comparison overlay: the primary bucket paired with its
/// index-wise historical counterpart, regardless of calendar dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonMapping {
    pub current_date: i64,
    pub compare_date: i64,
    pub current_values: BTreeMap<String, f64>,
    pub compare_values: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedComparison {
    /// The primary series with the compare value appended at position 1.
    pub combined: Vec<DenseChartPoint>,
    pub map: Vec<ComparisonMapping>,
}

/// Zip a primary and a compare dense series index-wise.
///
/// Returns `None` when the compare series is empty or the bucket counts
/// differ. A count mismatch is an expected degraded mode (e.g. a 28-day
/// month compared against a 31-day one), so the chart silently drops the
/// overlay instead of failing the whole request.
pub fn align_comparison(
    primary: &[DenseChartPoint],
    compare: &[DenseChartPoint],
    data_key: &str,
) -> Option<AlignedComparison> {
    if compare.is_empty() || primary.len() != compare.len() {
        return None;
    }

    let mut combined = Vec::with_capacity(primary.len());
    let mut map = Vec::with_capacity(primary.len());
    for (cur, prev) in primary.iter().zip(compare) {
        let cur_value = cur.primary();
        let prev_value = prev.primary();
        combined.push(DenseChartPoint {
            date: cur.date,
            value: vec![Some(cur_value), Some(prev_value)],
        });
        map.push(ComparisonMapping {
            current_date: cur.date,
            compare_date: prev.date,
            current_values: BTreeMap::from([(data_key.to_string(), cur_value)]),
            compare_values: BTreeMap::from([(data_key.to_string(), prev_value)]),
        });
    }
    Some(AlignedComparison { combined, map })
}
