use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use plotline_core::to_sparkline;

use crate::routes::query::{self, ChartParams};
use crate::{error::AppError, state::AppState};

/// `GET /api/websites/{id}/sparkline` — flat one-value-per-bucket series for
/// compact inline trend visuals. Comparison and incomplete-split parameters
/// are accepted but ignored; only the shape matters here.
pub async fn get_sparkline(
    State(state): State<Arc<AppState>>,
    Path(website_id): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<impl IntoResponse, AppError> {
    if !state.is_valid_website(&website_id).await {
        return Err(AppError::NotFound("Website not found".to_string()));
    }

    let q = query::resolve(&state, &website_id, &params).await?;
    let rows = state
        .series
        .fetch_series(&website_id, q.metric, &q.range, q.granularity, q.timezone)
        .await
        .map_err(AppError::Internal)?;

    let series = to_sparkline(&rows, q.granularity, &q.range, q.timezone)
        .map_err(AppError::Internal)?;

    Ok(Json(json!({
        "data": series,
        "granularity": q.granularity.as_str(),
        "timezone": q.timezone.name(),
        "metric": q.metric.data_key(),
    })))
}
