//! REST API server tying the domain services together.

pub mod council;
pub mod governance;
pub mod ledger;
pub mod regions;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::RuntimeConfig;
use crate::events::PayoutBus;

/// Shared handles to every domain service. Cheap to clone; every service is an
/// `Arc` internally.
#[derive(Clone)]
pub struct AppState {
    pub ledger: ::ledger::TokenLedger,
    pub governance: ::governance::GovernanceEngine,
    pub regions: ::triggers::RegionRegistry,
    pub council: ::council::CouncilRegistry,
    pub payouts: PayoutBus,
    pub config: Arc<RuntimeConfig>,
}

impl AppState {
    pub fn new(config: RuntimeConfig, regions: ::triggers::RegionRegistry) -> Self {
        Self {
            ledger: ::ledger::TokenLedger::new(),
            governance: ::governance::GovernanceEngine::new(),
            regions,
            council: ::council::CouncilRegistry::new(),
            payouts: PayoutBus::new(),
            config: Arc::new(config),
        }
    }
}

/// Create the REST API application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/ledger", ledger::routes())
        .nest("/api/governance", governance::routes())
        .nest("/api/regions", regions::routes())
        .nest("/api/council", council::routes())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}

/// Start the REST API server.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_app(state);

    info!("Starting REST API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check the shared admin token on privileged endpoints. With no token
/// configured every privileged request is rejected.
pub(crate) fn require_admin(headers: &HeaderMap, config: &RuntimeConfig) -> Result<(), Response> {
    let presented = headers
        .get("x-admin-token")
        .and_then(|value| value.to_str().ok());
    match (&config.admin_token, presented) {
        (Some(expected), Some(token)) if constant_time_eq(expected.as_bytes(), token.as_bytes()) => {
            Ok(())
        }
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized: missing or invalid admin token"})),
        )
            .into_response()),
    }
}

/// Compare the full length of both secrets instead of short-circuiting on the
/// first mismatched byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
