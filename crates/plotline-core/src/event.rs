use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The payload the client sends to POST /api/collect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectPayload {
    pub website_id: String,
    pub url: String,
    /// Client-persisted visitor identifier (localStorage on the tracked site).
    pub visitor_id: String,
}

/// The stored version of a pageview — mirrors the `events` table columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pageview {
    pub id: String,
    pub website_id: String,
    pub visitor_id: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
