use anyhow::{anyhow, Result};
use chrono::{DateTime, DurationRound, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// An inclusive `[start, end]` chart range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(anyhow!("range end must be on or after range start"));
        }
        Ok(Self { start, end })
    }

    /// Build a range from two local calendar days: `start` at local midnight
    /// through the last whole minute of `end`, expressed in UTC.
    pub fn from_local_days(start: NaiveDate, end: NaiveDate, tz: Tz) -> Result<Self> {
        let start_local = start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("invalid start date"))?;
        let end_local = end
            .and_hms_opt(23, 59, 0)
            .ok_or_else(|| anyhow!("invalid end date"))?;
        Self::new(local_to_utc(start_local, tz)?, local_to_utc(end_local, tz)?)
    }

    /// Both bounds truncated down to the minute. Bucketing always starts from
    /// the truncated range so sub-minute jitter in caller-supplied bounds
    /// cannot shift bucket boundaries.
    pub fn truncated_to_minute(&self) -> Result<Self> {
        Ok(Self {
            start: truncate_to_minute(self.start)?,
            end: truncate_to_minute(self.end)?,
        })
    }

    /// The `bucket_incomplete` boundary flag: does this range reach the
    /// current wall-clock time (so its trailing buckets may still be open)?
    pub fn extends_past(&self, now: DateTime<Utc>) -> bool {
        self.end >= now
    }

    /// Inclusive calendar-day count, used for auto-granularity and
    /// previous-period resolution.
    pub fn num_days(&self) -> i64 {
        (self.end.date_naive() - self.start.date_naive()).num_days() + 1
    }

    /// Inclusive width at minute resolution, as a duration.
    pub fn inclusive_width(&self) -> chrono::Duration {
        self.end - self.start + chrono::Duration::minutes(1)
    }
}

pub(crate) fn truncate_to_minute(ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
    ts.duration_trunc(chrono::Duration::minutes(1))
        .map_err(|e| anyhow!("timestamp truncation failed: {e}"))
}

/// Resolve a naive local wall time in `tz` to UTC.
///
/// DST fall-back repeats an hour of wall time; the earlier instant wins.
/// Spring-forward gaps have no valid instant and are an input error.
pub(crate) fn local_to_utc(naive: chrono::NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        chrono::LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        chrono::LocalResult::None => Err(anyhow!(
            "local time {naive} does not exist in timezone {tz}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::America::New_York;
    use chrono_tz::UTC;

    use super::*;

    #[test]
    fn rejects_inverted_bounds() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(DateRange::new(start, end).is_err());
    }

    #[test]
    fn truncation_drops_seconds() {
        let range = DateRange {
            start: Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 45).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 59).unwrap(),
        };
        let truncated = range.truncated_to_minute().unwrap();
        assert_eq!(
            truncated.start,
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap()
        );
        assert_eq!(
            truncated.end,
            Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap()
        );
    }

    #[test]
    fn from_local_days_uses_local_midnight() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let range = DateRange::from_local_days(start, end, New_York).unwrap();
        // New York is UTC-4 in June.
        assert_eq!(
            range.start,
            Utc.with_ymd_and_hms(2024, 6, 1, 4, 0, 0).unwrap()
        );
        assert_eq!(
            range.end,
            Utc.with_ymd_and_hms(2024, 6, 3, 3, 59, 0).unwrap()
        );
    }

    #[test]
    fn extends_past_flags_open_ranges() {
        let range = DateRange::from_local_days(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            UTC,
        )
        .unwrap();
        let mid = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap();
        assert!(range.extends_past(mid));
        assert!(!range.extends_past(after));
    }

    #[test]
    fn num_days_is_inclusive() {
        let range = DateRange::from_local_days(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            UTC,
        )
        .unwrap();
        assert_eq!(range.num_days(), 7);
    }
}
