use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::compare::{align_comparison, ComparisonMapping};
use crate::granularity::Granularity;
use crate::range::DateRange;
use crate::series::{materialize, DenseChartPoint, SparseRow};
use crate::split::split_incomplete;

/// Everything the presenter needs, passed explicitly — including `now`, so
/// incomplete-bucket behavior is deterministic under test.
#[derive(Debug)]
pub struct ChartRequest<'a> {
    pub rows: &'a [SparseRow],
    pub compare_rows: Option<&'a [SparseRow]>,
    /// Field name carried into the comparison map (e.g. "pageviews").
    pub data_key: &'a str,
    pub granularity: Granularity,
    pub range: DateRange,
    pub compare_range: Option<DateRange>,
    pub timezone: Tz,
    pub now: DateTime<Utc>,
    /// Caller-computed: does the requested range reach the present?
    pub bucket_incomplete: bool,
}

/// Chart-ready output: a dense series plus the optional dashed tail and
/// comparison overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub data: Vec<DenseChartPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incomplete: Option<Vec<DenseChartPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_map: Option<Vec<ComparisonMapping>>,
}

/// Run the full presentation pipeline: materialize, align, split.
///
/// Without a comparison, `data` is the solid prefix and `incomplete` the
/// dashed tail. With one, `data` stays full length (the historical overlay
/// is complete and renders solid throughout) and the primary position is
/// masked to `None` across the open tail; `incomplete` carries the same
/// index range with real values for both series.
pub fn present(req: &ChartRequest<'_>) -> Result<ChartSeries> {
    let dense = materialize(req.rows, req.granularity, &req.range, req.timezone)?;

    let aligned = match (req.compare_rows, req.compare_range) {
        (Some(rows), Some(range)) => {
            let compare_dense = materialize(rows, req.granularity, &range, req.timezone)?;
            align_comparison(&dense, &compare_dense, req.data_key)
        }
        _ => None,
    };

    let split = split_incomplete(
        &dense,
        req.granularity,
        req.now,
        req.timezone,
        req.bucket_incomplete,
    )?;

    let Some(aligned) = aligned else {
        return Ok(ChartSeries {
            data: split.solid,
            incomplete: split.incomplete,
            comparison_map: None,
        });
    };

    let Some(tail_start) = split.incomplete_start() else {
        return Ok(ChartSeries {
            data: aligned.combined,
            incomplete: None,
            comparison_map: Some(aligned.map),
        });
    };

    // split.should_split implies first_incomplete_index is set.
    let first = split.first_incomplete_index.unwrap_or(0);
    let mut data = aligned.combined.clone();
    for point in data.iter_mut().skip(first) {
        if let Some(primary) = point.value.get_mut(0) {
            *primary = None;
        }
    }

    Ok(ChartSeries {
        data,
        incomplete: Some(aligned.combined[tail_start..].to_vec()),
        comparison_map: Some(aligned.map),
    })
}
