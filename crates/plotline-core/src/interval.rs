use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

use crate::granularity::Granularity;
use crate::range::local_to_utc;

/// A bucket stepper bound to a granularity and a timezone.
///
/// Minute and hour buckets are fixed-width, so stepping is plain duration
/// arithmetic. Day, week and month buckets follow the local calendar of the
/// bound timezone: stepping a day bucket lands on the next local midnight
/// even across a DST transition where the elapsed UTC time is 23 or 25 hours.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    granularity: Granularity,
    tz: Tz,
}

impl Interval {
    pub fn new(granularity: Granularity, tz: Tz) -> Self {
        Self { granularity, tz }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Advance `ts` by `n` buckets (`n` may be negative).
    ///
    /// Errors on arithmetic overflow or when the shifted local wall time does
    /// not exist in the bound timezone (a DST spring-forward gap).
    pub fn offset(&self, ts: DateTime<Utc>, n: i64) -> Result<DateTime<Utc>> {
        if let Some(minutes) = self.granularity.fixed_minutes() {
            let step = minutes
                .checked_mul(n)
                .ok_or_else(|| anyhow!("interval offset overflow"))?;
            return ts
                .checked_add_signed(Duration::minutes(step))
                .ok_or_else(|| anyhow!("interval offset overflow"));
        }

        // Calendar granularities step in the local frame and convert back.
        let local = ts.with_timezone(&self.tz);
        let shifted = match self.granularity {
            Granularity::Day => shift_days(local, n),
            Granularity::Week => shift_days(local, n.checked_mul(7).unwrap_or(i64::MAX)),
            Granularity::Month => {
                let months = u32::try_from(n.unsigned_abs())
                    .map_err(|_| anyhow!("interval offset overflow"))?;
                if n >= 0 {
                    local.checked_add_months(Months::new(months))
                } else {
                    local.checked_sub_months(Months::new(months))
                }
            }
            _ => unreachable!("fixed-width granularities handled above"),
        };

        shifted
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| anyhow!("interval offset out of range"))
    }

    /// Snap `ts` down to the start of the bucket containing it, in the bound
    /// timezone's local frame.
    ///
    /// This is the same grid the storage layer's `date_trunc`/`time_bucket`
    /// produces: hours snap to local :00, days to local midnight, weeks to
    /// local Monday midnight, months to the local 1st. Materialization walks
    /// from the snapped range start so generated bucket keys always meet the
    /// keys coming back from SQL, whatever instant the caller's range starts
    /// at.
    pub fn align(&self, ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let local = ts.with_timezone(&self.tz).naive_local();
        let date = local.date();
        let naive = match self.granularity {
            Granularity::Minute
            | Granularity::Minutes5
            | Granularity::Minutes15
            | Granularity::Minutes30
            | Granularity::Hour => {
                let step = match self.granularity {
                    Granularity::Minute => 1,
                    Granularity::Minutes5 => 5,
                    Granularity::Minutes15 => 15,
                    Granularity::Minutes30 => 30,
                    _ => 60,
                };
                let minute = local.minute() - local.minute() % step;
                date.and_hms_opt(local.hour(), minute, 0)
            }
            Granularity::Day => date.and_hms_opt(0, 0, 0),
            Granularity::Week => {
                let monday =
                    date - Duration::days(date.weekday().num_days_from_monday() as i64);
                monday.and_hms_opt(0, 0, 0)
            }
            Granularity::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
                .and_then(|first| first.and_hms_opt(0, 0, 0)),
        }
        .ok_or_else(|| anyhow!("bucket alignment out of range"))?;
        local_to_utc(naive, self.tz)
    }
}

fn shift_days(local: DateTime<Tz>, n: i64) -> Option<DateTime<Tz>> {
    let days = Days::new(n.unsigned_abs());
    if n >= 0 {
        local.checked_add_days(days)
    } else {
        local.checked_sub_days(days)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::{Europe::Warsaw, Tz, UTC};

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn hour_steps_are_fixed_width() {
        let iv = Interval::new(Granularity::Hour, UTC);
        let start = utc(2024, 1, 1, 0, 0);
        assert_eq!(iv.offset(start, 1).unwrap(), utc(2024, 1, 1, 1, 0));
        assert_eq!(iv.offset(start, 24).unwrap(), utc(2024, 1, 2, 0, 0));
        assert_eq!(iv.offset(start, -1).unwrap(), utc(2023, 12, 31, 23, 0));
    }

    #[test]
    fn five_minute_steps() {
        let iv = Interval::new(Granularity::Minutes5, UTC);
        assert_eq!(
            iv.offset(utc(2024, 1, 1, 0, 0), 3).unwrap(),
            utc(2024, 1, 1, 0, 15)
        );
    }

    #[test]
    fn day_step_crosses_dst_spring_forward() {
        // Warsaw jumps CET -> CEST on 2024-03-31; local midnight to local
        // midnight is only 23 hours of elapsed UTC time.
        let iv = Interval::new(Granularity::Day, Warsaw);
        let local_midnight = Warsaw
            .with_ymd_and_hms(2024, 3, 31, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let next = iv.offset(local_midnight, 1).unwrap();
        assert_eq!(next - local_midnight, Duration::hours(23));
        let next_local = next.with_timezone(&Warsaw);
        assert_eq!(next_local.to_string()[..10].to_string(), "2024-04-01");
    }

    #[test]
    fn month_step_respects_calendar_lengths() {
        let iv = Interval::new(Granularity::Month, UTC);
        assert_eq!(
            iv.offset(utc(2024, 1, 1, 0, 0), 1).unwrap(),
            utc(2024, 2, 1, 0, 0)
        );
        // Jan 31 + 1 month clamps to Feb 29 (2024 is a leap year).
        assert_eq!(
            iv.offset(utc(2024, 1, 31, 0, 0), 1).unwrap(),
            utc(2024, 2, 29, 0, 0)
        );
    }

    #[test]
    fn align_snaps_sub_day_buckets_to_the_local_grid() {
        let iv = Interval::new(Granularity::Minutes15, UTC);
        assert_eq!(
            iv.align(utc(2024, 1, 1, 10, 47)).unwrap(),
            utc(2024, 1, 1, 10, 45)
        );
        let iv = Interval::new(Granularity::Hour, UTC);
        assert_eq!(
            iv.align(utc(2024, 1, 1, 10, 47)).unwrap(),
            utc(2024, 1, 1, 10, 0)
        );
    }

    #[test]
    fn align_snaps_weeks_to_monday_and_months_to_the_first() {
        // 2024-01-17 is a Wednesday.
        let iv = Interval::new(Granularity::Week, UTC);
        assert_eq!(
            iv.align(utc(2024, 1, 17, 9, 30)).unwrap(),
            utc(2024, 1, 15, 0, 0)
        );
        let iv = Interval::new(Granularity::Month, UTC);
        assert_eq!(
            iv.align(utc(2024, 3, 20, 9, 30)).unwrap(),
            utc(2024, 3, 1, 0, 0)
        );
    }

    #[test]
    fn align_uses_the_local_calendar() {
        // Warsaw is CET (UTC+1) in February: the local 1st starts at
        // Jan 31 23:00 UTC.
        let iv = Interval::new(Granularity::Month, Warsaw);
        assert_eq!(
            iv.align(utc(2024, 2, 15, 12, 0)).unwrap(),
            utc(2024, 1, 31, 23, 0)
        );
    }

    #[test]
    fn week_step_is_seven_local_days() {
        let iv = Interval::new(Granularity::Week, Tz::UTC);
        assert_eq!(
            iv.offset(utc(2024, 1, 1, 0, 0), 2).unwrap(),
            utc(2024, 1, 15, 0, 0)
        );
    }
}
