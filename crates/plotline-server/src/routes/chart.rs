use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use plotline_core::{present, ChartRequest, SeriesSource};

use crate::routes::query::{self, ChartParams};
use crate::{error::AppError, state::AppState};

/// `GET /api/websites/{id}/chart` — the dense, gap-filled chart series.
///
/// The primary fetch and the optional comparison fetch run in parallel; the
/// presenter then shapes both row sets in one pass. A comparison that turns
/// out to have a different bucket count simply disappears from the response.
pub async fn get_chart(
    State(state): State<Arc<AppState>>,
    Path(website_id): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<impl IntoResponse, AppError> {
    if !state.is_valid_website(&website_id).await {
        return Err(AppError::NotFound("Website not found".to_string()));
    }

    let q = query::resolve(&state, &website_id, &params).await?;
    let now = Utc::now();
    let bucket_incomplete = q.range.extends_past(now);

    let source: &dyn SeriesSource = state.series.as_ref();
    let (rows, compare_rows) = match &q.comparison {
        Some(comparison) => {
            let (primary, compare) = tokio::join!(
                source.fetch_series(&website_id, q.metric, &q.range, q.granularity, q.timezone),
                source.fetch_series(
                    &website_id,
                    q.metric,
                    &comparison.comparison,
                    q.granularity,
                    q.timezone,
                ),
            );
            (
                primary.map_err(AppError::Internal)?,
                Some(compare.map_err(AppError::Internal)?),
            )
        }
        None => (
            source
                .fetch_series(&website_id, q.metric, &q.range, q.granularity, q.timezone)
                .await
                .map_err(AppError::Internal)?,
            None,
        ),
    };

    let chart = present(&ChartRequest {
        rows: &rows,
        compare_rows: compare_rows.as_deref(),
        data_key: q.metric.data_key(),
        granularity: q.granularity,
        range: q.range,
        compare_range: q.comparison.as_ref().map(|c| c.comparison),
        timezone: q.timezone,
        now,
        bucket_incomplete,
    })
    .map_err(AppError::Internal)?;

    Ok(Json(json!({
        "data": chart,
        "granularity": q.granularity.as_str(),
        "timezone": q.timezone.name(),
        "metric": q.metric.data_key(),
        "compare": q.comparison.as_ref().map(|c| c.to_metadata()),
    })))
}
