use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use ::council::{CouncilError, DecisionOutcome};

use super::{require_admin, AppState};

/// Build the ethics council API router.
pub fn routes() -> Router {
    Router::new()
        .route("/members", get(list_members).post(add_member))
        .route("/members/:member_id", delete(remove_member))
        .route("/decisions", get(list_decisions).post(record_decision))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMembersQuery {
    #[serde(default)]
    include_removed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddMemberRequest {
    name: String,
    role: String,
    #[serde(default)]
    member_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordDecisionRequest {
    title: String,
    #[serde(default)]
    summary: String,
    outcome: DecisionOutcome,
}

async fn list_members(
    Extension(state): Extension<AppState>,
    Query(query): Query<ListMembersQuery>,
) -> Response {
    let members = state.council.list_members(query.include_removed).await;
    (StatusCode::OK, Json(json!({ "members": members }))).into_response()
}

async fn add_member(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(request): Json<AddMemberRequest>,
) -> Response {
    if let Err(response) = require_admin(&headers, &state.config) {
        return response;
    }

    let result = match &request.member_id {
        Some(member_id) => {
            state
                .council
                .add_member_with_id(member_id, &request.name, &request.role)
                .await
        }
        None => state.council.add_member(&request.name, &request.role).await,
    };

    match result {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(err) => {
            warn!(name = %request.name, error = %err, "failed to add council member");
            council_error_response(err)
        }
    }
}

async fn remove_member(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Path(member_id): Path<String>,
) -> Response {
    if let Err(response) = require_admin(&headers, &state.config) {
        return response;
    }

    match state.council.remove_member(&member_id).await {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(err) => council_error_response(err),
    }
}

async fn list_decisions(Extension(state): Extension<AppState>) -> Response {
    let decisions = state.council.decisions().await;
    (StatusCode::OK, Json(json!({ "decisions": decisions }))).into_response()
}

async fn record_decision(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(request): Json<RecordDecisionRequest>,
) -> Response {
    if let Err(response) = require_admin(&headers, &state.config) {
        return response;
    }
    if request.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Field 'title' must be provided"})),
        )
            .into_response();
    }

    let record = state
        .council
        .record_decision(&request.title, &request.summary, request.outcome)
        .await;
    (StatusCode::CREATED, Json(record)).into_response()
}

fn council_error_response(err: CouncilError) -> Response {
    let status = match err {
        CouncilError::DuplicateMember { .. } | CouncilError::AlreadyRemoved { .. } => {
            StatusCode::CONFLICT
        }
        CouncilError::MemberNotFound { .. } => StatusCode::NOT_FOUND,
        CouncilError::EmptyName => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
