use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::range::DateRange;

/// Bucket width for a chart request.
///
/// Sub-day granularities are fixed-width and timezone-invariant; day, week and
/// month follow timezone-local calendar boundaries (see [`crate::Interval`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Minute,
    #[serde(rename = "five_minutes")]
    Minutes5,
    #[serde(rename = "fifteen_minutes")]
    Minutes15,
    #[serde(rename = "thirty_minutes")]
    Minutes30,
    Hour,
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some("minute") => Ok(Some(Self::Minute)),
            Some("five_minutes") => Ok(Some(Self::Minutes5)),
            Some("fifteen_minutes") => Ok(Some(Self::Minutes15)),
            Some("thirty_minutes") => Ok(Some(Self::Minutes30)),
            Some("hour") => Ok(Some(Self::Hour)),
            Some("day") => Ok(Some(Self::Day)),
            Some("week") => Ok(Some(Self::Week)),
            Some("month") => Ok(Some(Self::Month)),
            Some(other) => Err(anyhow!(
                "unknown granularity '{other}' (expected minute, five_minutes, \
                 fifteen_minutes, thirty_minutes, hour, day, week or month)"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Minutes5 => "five_minutes",
            Self::Minutes15 => "fifteen_minutes",
            Self::Minutes30 => "thirty_minutes",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Bucket width in minutes for the fixed-width granularities; `None` for
    /// the calendar-based ones whose width depends on the timezone and date.
    pub fn fixed_minutes(&self) -> Option<i64> {
        match self {
            Self::Minute => Some(1),
            Self::Minutes5 => Some(5),
            Self::Minutes15 => Some(15),
            Self::Minutes30 => Some(30),
            Self::Hour => Some(60),
            Self::Day | Self::Week | Self::Month => None,
        }
    }

    /// Auto-granularity: ≤2 days → hour, 3–60 → day, >60 → month.
    pub fn auto(range: &DateRange) -> Self {
        let days = range.num_days();
        if days <= 2 {
            Self::Hour
        } else if days <= 60 {
            Self::Day
        } else {
            Self::Month
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn range(days: i64) -> DateRange {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        DateRange {
            start,
            end: start + chrono::Duration::days(days - 1) + chrono::Duration::hours(23),
        }
    }

    #[test]
    fn parse_accepts_all_variants() {
        for raw in [
            "minute",
            "five_minutes",
            "fifteen_minutes",
            "thirty_minutes",
            "hour",
            "day",
            "week",
            "month",
        ] {
            let parsed = Granularity::parse(Some(raw)).expect("valid").expect("some");
            assert_eq!(parsed.as_str(), raw);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!(Granularity::parse(Some("fortnight")).is_err());
    }

    #[test]
    fn parse_none_and_empty_are_absent() {
        assert_eq!(Granularity::parse(None).unwrap(), None);
        assert_eq!(Granularity::parse(Some("")).unwrap(), None);
    }

    #[test]
    fn auto_thresholds() {
        assert_eq!(Granularity::auto(&range(1)), Granularity::Hour);
        assert_eq!(Granularity::auto(&range(2)), Granularity::Hour);
        assert_eq!(Granularity::auto(&range(3)), Granularity::Day);
        assert_eq!(Granularity::auto(&range(60)), Granularity::Day);
        assert_eq!(Granularity::auto(&range(61)), Granularity::Month);
    }
}
