use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use ::ledger::{Amount, LedgerError, TxCategory};

use super::{require_admin, AppState};
use crate::metrics::PlatformMetrics;

/// Build the ledger API router.
pub fn routes() -> Router {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts/:account", get(get_balance))
        .route("/accounts/:account/transactions", get(list_transactions))
        .route("/transfer", post(transfer))
        .route("/airdrop", post(airdrop))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferRequest {
    from: String,
    to: String,
    amount: Amount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AirdropRequest {
    accounts: Vec<String>,
    amount_each: Amount,
    #[serde(default)]
    description: Option<String>,
}

async fn list_accounts(Extension(state): Extension<AppState>) -> Response {
    let accounts = state.ledger.accounts().await;
    let total_supply = state.ledger.total_supply().await;
    (
        StatusCode::OK,
        Json(json!({ "accounts": accounts, "totalSupply": total_supply })),
    )
        .into_response()
}

async fn get_balance(
    Extension(state): Extension<AppState>,
    Path(account): Path<String>,
) -> Response {
    match state.ledger.balance(&account).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({ "account": account, "balance": balance })),
        )
            .into_response(),
        Err(err) => ledger_error_response(err),
    }
}

async fn list_transactions(
    Extension(state): Extension<AppState>,
    Path(account): Path<String>,
) -> Response {
    let transactions = state.ledger.transactions(&account).await;
    (
        StatusCode::OK,
        Json(json!({ "account": account, "transactions": transactions })),
    )
        .into_response()
}

async fn transfer(
    Extension(state): Extension<AppState>,
    Json(request): Json<TransferRequest>,
) -> Response {
    if request.from.trim().is_empty() || request.to.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Fields 'from' and 'to' must be provided"})),
        )
            .into_response();
    }

    match state
        .ledger
        .transfer(&request.from, &request.to, request.amount)
        .await
    {
        Ok((debit, credit)) => {
            PlatformMetrics::increment_ledger_operation("transfer", "ok");
            (
                StatusCode::OK,
                Json(json!({ "debit": debit, "credit": credit })),
            )
                .into_response()
        }
        Err(err) => {
            PlatformMetrics::increment_ledger_operation("transfer", "error");
            warn!(from = %request.from, to = %request.to, error = %err, "transfer failed");
            ledger_error_response(err)
        }
    }
}

async fn airdrop(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Json(request): Json<AirdropRequest>,
) -> Response {
    if let Err(response) = require_admin(&headers, &state.config) {
        return response;
    }
    if request.accounts.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Field 'accounts' must list at least one recipient"})),
        )
            .into_response();
    }

    match state
        .ledger
        .airdrop(&request.accounts, request.amount_each, request.description)
        .await
    {
        Ok(transactions) => {
            PlatformMetrics::increment_ledger_operation("airdrop", "ok");
            (
                StatusCode::OK,
                Json(json!({
                    "recipients": transactions.len(),
                    "transactions": transactions,
                })),
            )
                .into_response()
        }
        Err(err) => {
            PlatformMetrics::increment_ledger_operation("airdrop", "error");
            ledger_error_response(err)
        }
    }
}

fn ledger_error_response(err: LedgerError) -> Response {
    let status = match err {
        LedgerError::InsufficientFunds { .. } | LedgerError::BalanceOverflow { .. } => {
            StatusCode::CONFLICT
        }
        LedgerError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::ZeroAmount | LedgerError::SelfTransfer | LedgerError::AmountTooLarge { .. } => {
            StatusCode::BAD_REQUEST
        }
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

/// Credit a vote participation reward; used by the governance routes.
pub(crate) async fn credit_vote_reward(state: &AppState, account: &str) {
    if state.config.vote_reward == 0 {
        return;
    }
    if let Err(err) = state
        .ledger
        .credit(
            account,
            state.config.vote_reward,
            TxCategory::Reward,
            Some("Voting participation reward".to_string()),
        )
        .await
    {
        warn!(%account, error = %err, "failed to credit vote reward");
    }
}
