use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use ::triggers::{Observation, TriggerError, TriggerKind};

use super::AppState;
use crate::metrics::PlatformMetrics;

/// Build the regions/trigger API router.
pub fn routes() -> Router {
    Router::new()
        .route("/", get(list_regions))
        .route("/:region_id", get(get_region))
        .route("/:region_id/evaluate", post(evaluate_region))
        .route("/payouts/stream", get(stream_payouts))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateRequest {
    series: Vec<Observation>,
}

async fn list_regions(Extension(state): Extension<AppState>) -> Response {
    let regions = state.regions.list().await;
    (StatusCode::OK, Json(json!({ "regions": regions }))).into_response()
}

async fn get_region(
    Extension(state): Extension<AppState>,
    Path(region_id): Path<String>,
) -> Response {
    match state.regions.get(&region_id).await {
        Some(region) => (StatusCode::OK, Json(region)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Region not found",
                "regionId": region_id,
            })),
        )
            .into_response(),
    }
}

async fn evaluate_region(
    Extension(state): Extension<AppState>,
    Path(region_id): Path<String>,
    Json(request): Json<EvaluateRequest>,
) -> Response {
    match state
        .regions
        .evaluate_and_record(&region_id, &request.series)
        .await
    {
        Ok(outcome) => {
            if outcome.recorded {
                if let Some(event) = &outcome.verdict {
                    PlatformMetrics::increment_payout_triggered(match event.kind {
                        TriggerKind::Drought => "drought",
                        TriggerKind::Flood => "flood",
                        TriggerKind::Heat => "heat",
                    });
                    state.payouts.publish(event.clone());
                }
            }
            (StatusCode::OK, Json(outcome)).into_response()
        }
        Err(err) => {
            warn!(region = %region_id, error = %err, "evaluation failed");
            trigger_error_response(err)
        }
    }
}

/// Stream payout events as they are recorded.
async fn stream_payouts(Extension(state): Extension<AppState>) -> Response {
    let mut rx = state.payouts.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Ok(sse) = axum::response::sse::Event::default().json_data(&event) {
                        yield Ok::<_, std::convert::Infallible>(sse);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    let ev = json!({
                        "type": "warning",
                        "message": format!("{} payout events dropped", skipped),
                    });
                    if let Ok(sse) = axum::response::sse::Event::default().json_data(&ev) {
                        yield Ok::<_, std::convert::Infallible>(sse);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    axum::response::Sse::new(stream)
        .keep_alive(
            axum::response::sse::KeepAlive::new()
                .interval(std::time::Duration::from_secs(15))
                .text(": keep-alive"),
        )
        .into_response()
}

fn trigger_error_response(err: TriggerError) -> Response {
    let status = match err {
        TriggerError::RegionNotFound { .. } => StatusCode::NOT_FOUND,
        TriggerError::EmptySeries => StatusCode::BAD_REQUEST,
        TriggerError::DuplicateRegion { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
