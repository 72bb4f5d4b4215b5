use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use ::governance::{GovernanceError, ProposalKind, ProposalStatus, VoteChoice};

use super::ledger::credit_vote_reward;
use super::AppState;
use crate::metrics::PlatformMetrics;

/// Build the governance API router.
pub fn routes() -> Router {
    Router::new()
        .route("/proposals", post(submit_proposal).get(list_proposals))
        .route("/proposals/:proposal_id", get(get_proposal))
        .route("/proposals/:proposal_id/votes", post(cast_vote))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitProposalRequest {
    title: String,
    #[serde(default)]
    description: String,
    kind: ProposalKind,
    proposer: String,
    deadline: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ListProposalsQuery {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CastVoteRequest {
    account: String,
    choice: VoteChoice,
}

async fn submit_proposal(
    Extension(state): Extension<AppState>,
    Json(request): Json<SubmitProposalRequest>,
) -> Response {
    if request.proposer.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Field 'proposer' must be provided"})),
        )
            .into_response();
    }

    match state
        .governance
        .submit(
            &request.title,
            &request.description,
            request.kind,
            &request.proposer,
            request.deadline,
        )
        .await
    {
        Ok(proposal) => (StatusCode::CREATED, Json(proposal)).into_response(),
        Err(err) => {
            warn!(proposer = %request.proposer, error = %err, "failed to submit proposal");
            governance_error_response(err)
        }
    }
}

async fn list_proposals(
    Extension(state): Extension<AppState>,
    Query(query): Query<ListProposalsQuery>,
) -> Response {
    let status_filter = match query.status.as_deref() {
        Some(raw) => match ProposalStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "Invalid status filter",
                        "allowed": ["Active", "Passed", "Failed"],
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let proposals = state.governance.list(status_filter).await;
    let summaries: Vec<_> = proposals.iter().map(|p| p.summary()).collect();
    (StatusCode::OK, Json(json!({ "proposals": summaries }))).into_response()
}

async fn get_proposal(
    Extension(state): Extension<AppState>,
    Path(proposal_id): Path<String>,
) -> Response {
    match state.governance.get(&proposal_id).await {
        Some(proposal) => (StatusCode::OK, Json(proposal)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Proposal not found",
                "proposalId": proposal_id,
            })),
        )
            .into_response(),
    }
}

async fn cast_vote(
    Extension(state): Extension<AppState>,
    Path(proposal_id): Path<String>,
    Json(request): Json<CastVoteRequest>,
) -> Response {
    if request.account.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Field 'account' must be provided"})),
        )
            .into_response();
    }

    match state
        .governance
        .cast_vote(&request.account, &proposal_id, request.choice)
        .await
    {
        Ok(proposal) => {
            PlatformMetrics::increment_votes_cast(match request.choice {
                VoteChoice::For => "for",
                VoteChoice::Against => "against",
            });
            credit_vote_reward(&state, &request.account).await;
            (StatusCode::OK, Json(proposal)).into_response()
        }
        Err(err) => {
            warn!(proposal = %proposal_id, account = %request.account, error = %err, "vote rejected");
            governance_error_response(err)
        }
    }
}

fn governance_error_response(err: GovernanceError) -> Response {
    let status = match err {
        GovernanceError::AlreadyVoted { .. } | GovernanceError::ProposalClosed { .. } => {
            StatusCode::CONFLICT
        }
        GovernanceError::ProposalNotFound { .. } => StatusCode::NOT_FOUND,
        GovernanceError::DeadlineInPast | GovernanceError::EmptyTitle => StatusCode::BAD_REQUEST,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
