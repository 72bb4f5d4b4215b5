use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

use runtime::config::RuntimeConfig;
use runtime::server::{create_app, AppState};

fn setup_test_app() -> (Router, AppState) {
    let config = RuntimeConfig {
        admin_token: Some("test-admin-token".to_string()),
        ..RuntimeConfig::default()
    };
    let state = AppState::new(config, triggers::RegionRegistry::default());
    (create_app(state.clone()), state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn admin_post(uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-admin-token", "test-admin-token")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn member_lifecycle_with_unique_ids() {
    let (app, _state) = setup_test_app();

    let payload = json!({
        "memberId": "member-001",
        "name": "Dr. Priya Sharma",
        "role": "Agricultural Ethics Specialist"
    });
    let response = app
        .clone()
        .oneshot(admin_post("/api/council/members", payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same id again is a conflict.
    let response = app
        .clone()
        .oneshot(admin_post("/api/council/members", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/council/members/member-001")
                .header("x-admin-token", "test-admin-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "removed");

    // Removed members disappear from the default listing.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/council/members")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(body_json(response).await["members"].as_array().unwrap().is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/council/members?includeRemoved=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await["members"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn member_mutations_require_the_admin_token() {
    let (app, _state) = setup_test_app();

    let payload = json!({"name": "James Ochieng", "role": "Community Leader"});
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/council/members")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/council/members/member-001")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn removing_a_missing_member_is_404() {
    let (app, _state) = setup_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/council/members/member-404")
                .header("x-admin-token", "test-admin-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn decisions_are_recorded_and_listed_newest_first() {
    let (app, _state) = setup_test_app();

    let first = json!({
        "title": "Payout dispute in zone-b",
        "summary": "Flood payout contested by neighboring zone",
        "outcome": "approved"
    });
    let second = json!({"title": "Membership appeal", "outcome": "rejected"});
    for payload in [first, second] {
        let response = app
            .clone()
            .oneshot(admin_post("/api/council/decisions", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/council/decisions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    let decisions = listed["decisions"].as_array().unwrap();
    assert_eq!(decisions.len(), 2);
    assert_eq!(decisions[0]["title"], "Membership appeal");
    assert_eq!(decisions[1]["outcome"], "approved");
}
