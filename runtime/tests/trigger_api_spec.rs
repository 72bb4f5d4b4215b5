use std::io::Write as _;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use runtime::config::RuntimeConfig;
use runtime::server::{create_app, AppState};

const REGIONS_YAML: &str = r#"
- regionId: zone-a
  name: Zone A - Northern District
  farmerCount: 245
  poolBalance: 50000
  cropTypes: [Rice, Wheat, Sugarcane]
  thresholds:
    drought:
      maxDailyRainfallMm: 20.0
      consecutiveDays: 5
    flood:
      cumulativeRainfallMm: 200.0
      windowDays: 2
    heat:
      minTempC: 42.0
      consecutiveDays: 5
    payoutPerFarmer: 10
- regionId: zone-b
  name: Zone B - Central Valley
  farmerCount: 45
  poolBalance: 5000
  thresholds:
    drought:
      maxDailyRainfallMm: 15.0
      consecutiveDays: 3
    flood:
      cumulativeRainfallMm: 180.0
      windowDays: 2
    heat:
      minTempC: 40.0
      consecutiveDays: 3
    payoutPerFarmer: 50
"#;

fn setup_test_app() -> (Router, AppState, tempfile::NamedTempFile) {
    let mut seed = tempfile::NamedTempFile::new().expect("tempfile");
    seed.write_all(REGIONS_YAML.as_bytes()).expect("seed write");
    let regions = triggers::RegionRegistry::load(seed.path()).expect("load regions");
    let state = AppState::new(RuntimeConfig::default(), regions);
    (create_app(state.clone()), state, seed)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn dry_series() -> serde_json::Value {
    json!([
        {"date": "2024-02-01", "rainfallMm": 2.0, "maxTempC": 31.0},
        {"date": "2024-02-02", "rainfallMm": 1.0, "maxTempC": 32.0},
        {"date": "2024-02-03", "rainfallMm": 0.0, "maxTempC": 33.0}
    ])
}

#[tokio::test]
async fn regions_are_seeded_from_yaml() {
    let (app, _state, _seed) = setup_test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/regions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["regions"].as_array().unwrap().len(), 2);
    assert_eq!(listed["regions"][0]["regionId"], "zone-a");

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/regions/zone-b")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let region = body_json(response).await;
    assert_eq!(region["farmerCount"], 45);
    assert_eq!(region["thresholds"]["payoutPerFarmer"], 50);
}

#[tokio::test]
async fn drought_evaluation_records_a_payout_and_publishes_an_event() {
    let (app, state, _seed) = setup_test_app();
    let mut events = state.payouts.subscribe();

    let payload = json!({"series": dry_series()});
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/regions/zone-b/evaluate")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["recorded"], true);
    assert_eq!(outcome["verdict"]["kind"], "drought");
    assert_eq!(outcome["verdict"]["amount"], 2250);

    let event = events.recv().await.expect("payout event");
    assert_eq!(event.region_id, "zone-b");
    assert_eq!(event.amount, 2250);

    let region = state.regions.get("zone-b").await.unwrap();
    assert_eq!(region.pool_balance, 2750);
    assert!(region.last_payout.is_some());
}

#[tokio::test]
async fn re_evaluating_the_same_series_keeps_the_verdict_but_records_nothing() {
    let (app, state, _seed) = setup_test_app();
    let payload = json!({"series": dry_series()});

    for expected_recorded in [true, false] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/regions/zone-b/evaluate")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = body_json(response).await;
        assert_eq!(outcome["recorded"], expected_recorded);
        assert_eq!(outcome["verdict"]["kind"], "drought");
    }

    assert_eq!(state.regions.get("zone-b").await.unwrap().pool_balance, 2750);
}

#[tokio::test]
async fn calm_series_yields_no_verdict() {
    let (app, _state, _seed) = setup_test_app();
    let payload = json!({"series": [
        {"date": "2024-02-01", "rainfallMm": 60.0, "maxTempC": 28.0},
        {"date": "2024-02-02", "rainfallMm": 55.0, "maxTempC": 27.0},
        {"date": "2024-02-03", "rainfallMm": 48.0, "maxTempC": 29.0}
    ]});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/regions/zone-b/evaluate")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["recorded"], false);
    assert!(outcome["verdict"].is_null());
}

#[tokio::test]
async fn unknown_region_and_empty_series_map_to_api_errors() {
    let (app, _state, _seed) = setup_test_app();

    let payload = json!({"series": dry_series()});
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/regions/nowhere/evaluate")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let payload = json!({"series": []});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/regions/zone-b/evaluate")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
