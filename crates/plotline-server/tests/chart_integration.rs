use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use plotline_core::config::Config;
use plotline_core::event::Pageview;
use plotline_duckdb::DuckDbBackend;
use plotline_server::app::build_app;
use plotline_server::state::AppState;

fn test_config() -> Config {
    Config {
        port: 0,
        data_dir: "/tmp/plotline-test".to_string(),
        duckdb_memory_limit: "1GB".to_string(),
        cors_origins: vec![],
        default_timezone: "UTC".to_string(),
    }
}

fn pageview(visitor_id: &str, at: DateTime<Utc>) -> Pageview {
    Pageview {
        id: uuid::Uuid::new_v4().to_string(),
        website_id: "site_test".to_string(),
        visitor_id: visitor_id.to_string(),
        url: "/".to_string(),
        created_at: at,
    }
}

fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
}

async fn setup() -> (Arc<AppState>, axum::Router) {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.seed_website("site_test", "example.com")
        .await
        .expect("seed website");
    let state = Arc::new(AppState::new(db, test_config()));
    let app = build_app(Arc::clone(&state));
    (state, app)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn collect_accepts_pageviews_for_known_sites() {
    let (_state, app) = setup().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/collect",
            json!({
                "website_id": "site_test",
                "url": "/pricing",
                "visitor_id": "visitor_1"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(json_body(response).await["accepted"], 1);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/collect",
            json!({
                "website_id": "site_nope",
                "url": "/",
                "visitor_id": "visitor_1"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chart_returns_dense_zero_filled_series() {
    let (state, app) = setup().await;
    state
        .db
        .insert_events(&[
            pageview("visitor_a", utc(2024, 1, 1, 10)),
            pageview("visitor_b", utc(2024, 1, 1, 11)),
            pageview("visitor_a", utc(2024, 1, 3, 9)),
        ])
        .await
        .expect("insert");

    let response = app
        .oneshot(get_request(
            "/api/websites/site_test/chart?start_date=2024-01-01&end_date=2024-01-03\
             &granularity=day&timezone=UTC",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["granularity"], "day");
    assert_eq!(json["timezone"], "UTC");
    assert_eq!(json["metric"], "pageviews");

    let points = json["data"]["data"].as_array().expect("data array");
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["value"], json!([2.0]));
    assert_eq!(points[1]["value"], json!([0.0]));
    assert_eq!(points[2]["value"], json!([1.0]));
    assert!(json["data"].get("incomplete").is_none());
    assert!(json["data"].get("comparison_map").is_none());
}

#[tokio::test]
async fn chart_overlays_previous_period_comparison() {
    let (state, app) = setup().await;
    state
        .db
        .insert_events(&[
            pageview("visitor_a", utc(2024, 1, 2, 10)),
            pageview("visitor_b", utc(2023, 12, 30, 12)),
        ])
        .await
        .expect("insert");

    let response = app
        .oneshot(get_request(
            "/api/websites/site_test/chart?start_date=2024-01-01&end_date=2024-01-03\
             &granularity=day&timezone=UTC&compare_mode=previous_period",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["compare"]["mode"], "previous_period");

    let points = json["data"]["data"].as_array().expect("data array");
    assert_eq!(points.len(), 3);
    // Jan 2 current vs Dec 30 previous, aligned index-wise.
    assert_eq!(points[1]["value"], json!([1.0, 1.0]));
    assert_eq!(points[0]["value"], json!([0.0, 0.0]));

    let map = json["data"]["comparison_map"].as_array().expect("map");
    assert_eq!(map.len(), 3);
    assert_eq!(map[1]["current_values"]["pageviews"], 1.0);
    assert_eq!(map[1]["compare_values"]["pageviews"], 1.0);
}

#[tokio::test]
async fn sparkline_shares_chart_bucketing() {
    let (state, app) = setup().await;
    state
        .db
        .insert_events(&[pageview("visitor_a", utc(2024, 1, 2, 10))])
        .await
        .expect("insert");

    let response = app
        .oneshot(get_request(
            "/api/websites/site_test/sparkline?start_date=2024-01-01&end_date=2024-01-03\
             &granularity=day&timezone=UTC",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let points = json["data"].as_array().expect("data array");
    assert_eq!(points.len(), 3);
    let values: Vec<f64> = points
        .iter()
        .map(|p| p["value"].as_f64().expect("value"))
        .collect();
    assert_eq!(values, vec![0.0, 1.0, 0.0]);
}

#[tokio::test]
async fn chart_rejects_unknown_granularity() {
    let (_state, app) = setup().await;
    let response = app
        .oneshot(get_request(
            "/api/websites/site_test/chart?granularity=fortnight",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn chart_rejects_unknown_website() {
    let (_state, app) = setup().await;
    let response = app
        .oneshot(get_request("/api/websites/site_nope/chart"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
