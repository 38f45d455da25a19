use anyhow::Result;
use chrono_tz::Tz;

use plotline_core::{DateRange, Granularity, Interval, Metric, SparseRow};

use crate::DuckDbBackend;

/// SQL expression producing the bucket start for one event, as local wall
/// time in the dashboard timezone (bound as `?4`).
///
/// `timezone(tz, TIMESTAMPTZ)` yields a naive local TIMESTAMP, so
/// `date_trunc`/`time_bucket` land on local boundaries — a "day" bucket is
/// local midnight to local midnight, not UTC.
fn bucket_expr(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Minute => "date_trunc('minute', timezone(?4, created_at))",
        Granularity::Minutes5 => {
            "time_bucket(INTERVAL '5 minutes', timezone(?4, created_at))"
        }
        Granularity::Minutes15 => {
            "time_bucket(INTERVAL '15 minutes', timezone(?4, created_at))"
        }
        Granularity::Minutes30 => {
            "time_bucket(INTERVAL '30 minutes', timezone(?4, created_at))"
        }
        Granularity::Hour => "date_trunc('hour', timezone(?4, created_at))",
        Granularity::Day => "date_trunc('day', timezone(?4, created_at))",
        Granularity::Week => "date_trunc('week', timezone(?4, created_at))",
        Granularity::Month => "date_trunc('month', timezone(?4, created_at))",
    }
}

impl DuckDbBackend {
    /// Sparse per-bucket aggregates for one website and metric.
    ///
    /// Returns only buckets that saw at least one event; the presenter in
    /// `plotline-core` is responsible for gap-filling, so no bucket
    /// generation happens in SQL. The filter window runs from `start` to the
    /// end of the bucket containing `end`, exclusive: the end bucket is
    /// included whole, everything past it excluded.
    pub async fn fetch_series(
        &self,
        website_id: &str,
        metric: Metric,
        range: &DateRange,
        granularity: Granularity,
        tz: Tz,
    ) -> Result<Vec<SparseRow>> {
        let range = range.truncated_to_minute()?;
        let interval = Interval::new(granularity, tz);
        let end_exclusive = interval.offset(interval.align(range.end)?, 1)?;

        let bucket = bucket_expr(granularity);
        let value = match metric {
            Metric::Pageviews => "COUNT(*)",
            Metric::Visitors => "COUNT(DISTINCT visitor_id)",
        };
        let sql = format!(
            r#"
            SELECT
                CAST({bucket} AS VARCHAR) AS bucket,
                CAST({value} AS DOUBLE) AS value
            FROM events
            WHERE website_id = ?1
              AND created_at >= ?2::TIMESTAMPTZ
              AND created_at < ?3::TIMESTAMPTZ
            GROUP BY bucket
            ORDER BY bucket
            "#
        );

        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            duckdb::params![
                website_id,
                range.start.to_rfc3339(),
                end_exclusive.to_rfc3339(),
                tz.name(),
            ],
            |row| {
                let date: String = row.get(0)?;
                let value: f64 = row.get(1)?;
                Ok(SparseRow { date, value })
            },
        )?;

        let mut series = Vec::new();
        for row in rows {
            series.push(row?);
        }
        Ok(series)
    }
}
