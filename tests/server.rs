//! HTTP adapter tests against the axum router.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use infra_map::config::AppConfig;
use infra_map::server::{router, AppState};
use infra_map::Dataset;
use serde_json::Value;
use tower::ServiceExt;

fn app_with(config: AppConfig) -> Router {
    router(AppState::new(config, Arc::new(Dataset::builtin().unwrap())))
}

fn app() -> Router {
    app_with(AppConfig::default())
}

async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

#[tokio::test]
async fn state_lists_every_record_initially() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/api/state").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filtered_subset"].as_array().map(Vec::len), Some(10));
    assert_eq!(body["aggregates"]["category_counts"]["hospital"], 6);
    assert_eq!(body["selection"]["state"], "idle");
}

#[tokio::test]
async fn filter_and_select_round_trip() {
    let app = app();
    let (status, body) = call(&app, Method::POST, "/api/filter/school").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["aggregates"]["category_counts"]["school"], 4);
    assert_eq!(body["aggregates"]["category_counts"]["hospital"], 0);

    let (status, _) = call(&app, Method::POST, "/api/select/3").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, Method::POST, "/api/select/8").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selection"]["id"], 8);

    let (status, body) = call(&app, Method::GET, "/api/view").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"]["id"], 8);
    assert_eq!(body["chart"]["values"], serde_json::json!([0, 4]));
}

#[tokio::test]
async fn bad_references_are_client_errors() {
    let app = app();
    let (status, body) = call(&app, Method::POST, "/api/select/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap_or_default().contains("99"));

    let (status, _) = call(&app, Method::POST, "/api/filter/clinic").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn query_finds_nearest_visible_marker() {
    let app = app();
    let (_, body) = call(&app, Method::GET, "/api/query?lat=5.962&lon=8.719").await;
    assert_eq!(body["id"], 1);

    call(&app, Method::POST, "/api/filter/school").await;
    let (_, body) = call(&app, Method::GET, "/api/query?lat=5.962&lon=8.719").await;
    assert_eq!(body["id"], 7);

    let (_, body) = call(&app, Method::GET, "/api/query?lat=0&lon=0").await;
    assert!(body.is_null());
}

#[tokio::test]
async fn features_are_geojson_points() {
    let app = app();
    call(&app, Method::POST, "/api/filter/hospital").await;
    let (status, body) = call(&app, Method::GET, "/api/features").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "FeatureCollection");
    assert_eq!(body["features"].as_array().map(Vec::len), Some(6));
    assert_eq!(body["features"][0]["geometry"]["type"], "Point");
}

#[tokio::test]
async fn unsupported_fullscreen_stays_off_with_notice() {
    let mut config = AppConfig::default();
    config.fullscreen.supported = false;
    let app = app_with(config);

    let (status, body) = call(&app, Method::POST, "/api/fullscreen/toggle").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view_mode"]["fullscreen"], false);

    let body = poll_state(&app, |s| s["view_mode"]["pending"].is_null()).await;
    assert_eq!(body["view_mode"]["fullscreen"], false);
    assert!(body["notice"]["message"].is_string());

    let (_, view) = call(&app, Method::GET, "/api/view").await;
    assert_eq!(view["layout"]["side_panel_visible"], true);
}

#[tokio::test]
async fn browser_exit_resynchronises_fullscreen() {
    let app = app();
    call(&app, Method::POST, "/api/fullscreen/toggle").await;
    poll_state(&app, |s| s["view_mode"]["fullscreen"] == true).await;

    let (_, view) = call(&app, Method::GET, "/api/view").await;
    assert_eq!(view["layout"]["map_expanded"], true);
    assert!(view["chart"].is_null());

    let (status, _) = call(&app, Method::POST, "/api/fullscreen/exited").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    poll_state(&app, |s| s["view_mode"]["fullscreen"] == false).await;
}

async fn poll_state<F>(app: &Router, done: F) -> Value
where
    F: Fn(&Value) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let (_, body) = call(app, Method::GET, "/api/state").await;
            if done(&body) {
                return body;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("state reached in time")
}
