use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use plotline_core::{
    resolve_comparison_range, CompareMode, ComparisonRange, DateRange, Granularity, Metric,
};

use crate::{error::AppError, state::AppState};

/// Query parameters shared by the chart and sparkline endpoints.
#[derive(Debug, Deserialize)]
pub struct ChartParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub granularity: Option<String>,
    pub timezone: Option<String>,
    pub metric: Option<String>,
    pub compare_mode: Option<String>,
    pub compare_start_date: Option<String>,
    pub compare_end_date: Option<String>,
}

/// Fully resolved chart request parameters: defaults applied, strings
/// validated, the comparison window computed.
pub struct ResolvedChartQuery {
    pub range: DateRange,
    pub granularity: Granularity,
    pub timezone: Tz,
    pub metric: Metric,
    pub comparison: Option<ComparisonRange>,
}

fn parse_local_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Resolve raw query params against website settings and config defaults.
///
/// Missing or malformed dates fall back to the last 7 local days; unknown
/// granularity/metric/timezone/compare values are rejected as 400s since
/// they indicate a caller bug rather than an absent preference.
pub async fn resolve(
    state: &AppState,
    website_id: &str,
    params: &ChartParams,
) -> Result<ResolvedChartQuery, AppError> {
    let tz_name = match &params.timezone {
        Some(tz) => tz.clone(),
        None => state
            .db
            .website_timezone(website_id)
            .await
            .map_err(AppError::Internal)?
            .unwrap_or_else(|| state.config.default_timezone.clone()),
    };
    let timezone = Tz::from_str(&tz_name)
        .map_err(|_| AppError::BadRequest(format!("unknown timezone '{tz_name}'")))?;

    let today = Utc::now().with_timezone(&timezone).date_naive();
    let start_date = parse_local_date(params.start_date.as_deref())
        .unwrap_or_else(|| today - chrono::Duration::days(6));
    let end_date = parse_local_date(params.end_date.as_deref()).unwrap_or(today);
    let range = DateRange::from_local_days(start_date, end_date, timezone)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let granularity = Granularity::parse(params.granularity.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .unwrap_or_else(|| Granularity::auto(&range));

    let metric = Metric::parse(params.metric.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let compare_mode = CompareMode::parse(params.compare_mode.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let custom = match (
        parse_local_date(params.compare_start_date.as_deref()),
        parse_local_date(params.compare_end_date.as_deref()),
    ) {
        (Some(start), Some(end)) => Some(
            DateRange::from_local_days(start, end, timezone)
                .map_err(|e| AppError::BadRequest(e.to_string()))?,
        ),
        _ => None,
    };
    let comparison = resolve_comparison_range(&range, compare_mode, custom, timezone)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(ResolvedChartQuery {
        range,
        granularity,
        timezone,
        metric,
        comparison,
    })
}
