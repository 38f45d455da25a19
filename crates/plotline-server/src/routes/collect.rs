use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use plotline_core::event::{CollectPayload, Pageview};

use crate::{error::AppError, state::AppState};

/// `POST /api/collect` — ingest one pageview.
///
/// Events for unknown sites are rejected before they touch the events table.
pub async fn collect(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CollectPayload>,
) -> Result<impl IntoResponse, AppError> {
    if !state.is_valid_website(&payload.website_id).await {
        return Err(AppError::NotFound("Website not found".to_string()));
    }

    let event = Pageview {
        id: uuid::Uuid::new_v4().to_string(),
        website_id: payload.website_id,
        visitor_id: payload.visitor_id,
        url: payload.url,
        created_at: Utc::now(),
    };
    state
        .db
        .insert_events(&[event])
        .await
        .map_err(AppError::Internal)?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "accepted": 1 }))))
}
