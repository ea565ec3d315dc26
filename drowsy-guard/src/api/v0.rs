//! API v0 endpoints.
//!
//! Version 0 signals an unstable API -- breaking changes are expected
//! until the daemon reaches 1.0.

use axum::{Json, extract::State, http::StatusCode};
use std::time::Duration;

use tokio::sync::oneshot;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::commands::DriverCommand;
use super::server::SharedState;
use crate::alert::StopOutcome;
use crate::api_client::types::{AlertStatus, DetectionRequest, DetectionResponse, StopResponse};

/// Upper bound on waiting for the driver. Stop commands may themselves wait
/// up to the configured stop bound, so this stays well above it.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the v0 API routes with OpenAPI metadata.
pub fn routes() -> OpenApiRouter<SharedState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(post_detections))
        .routes(routes!(get_alert))
        .routes(routes!(stop_alert))
        .routes(routes!(stop_session))
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = OK, description = "Server is running", body = String),
    ),
)]
async fn health() -> &'static str {
    "OK"
}

/// Run one detection cycle on a frame's detector output.
#[utoipa::path(
    post,
    path = "/detections",
    tag = "detections",
    request_body = DetectionRequest,
    responses(
        (status = OK, description = "Cycle result", body = DetectionResponse),
        (status = BAD_REQUEST, description = "Confidence outside [0, 1]"),
        (status = INTERNAL_SERVER_ERROR, description = "Driver unavailable"),
    ),
)]
async fn post_detections(
    State(state): State<SharedState>,
    Json(req): Json<DetectionRequest>,
) -> Result<Json<DetectionResponse>, StatusCode> {
    if req
        .detections
        .iter()
        .any(|d| !(0.0..=1.0).contains(&d.confidence))
    {
        return Err(StatusCode::BAD_REQUEST);
    }

    let (tx, rx) = oneshot::channel();
    let command = DriverCommand::ProcessDetections {
        detections: req.detections,
        reply: tx,
    };
    let report = request(&state, command, rx).await?;

    Ok(Json(DetectionResponse {
        drowsy: report.drowsy,
        detections: report.render,
        actions: report.actions.names(),
        window_count: report.window_count,
        continuous_active: state.engine.is_running(),
    }))
}

/// Return the current alert status.
#[utoipa::path(
    get,
    path = "/alert",
    tag = "alert",
    responses(
        (status = OK, description = "Current alert status", body = AlertStatus),
        (status = INTERNAL_SERVER_ERROR, description = "Driver unavailable"),
    ),
)]
async fn get_alert(State(state): State<SharedState>) -> Result<Json<AlertStatus>, StatusCode> {
    let (tx, rx) = oneshot::channel();
    let status = request(&state, DriverCommand::Status { reply: tx }, rx).await?;
    Ok(Json(status))
}

/// Silence the continuous alert, keeping the drowsy event history.
#[utoipa::path(
    post,
    path = "/alert/stop",
    tag = "alert",
    responses(
        (status = OK, description = "Stop result", body = StopResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Driver unavailable"),
    ),
)]
async fn stop_alert(State(state): State<SharedState>) -> Result<Json<StopResponse>, StatusCode> {
    let (tx, rx) = oneshot::channel();
    let outcome = request(&state, DriverCommand::StopBeep { reply: tx }, rx).await?;
    Ok(Json(stop_response(outcome)))
}

/// Stop the detection session: silence everything and reset the window.
#[utoipa::path(
    post,
    path = "/session/stop",
    tag = "session",
    responses(
        (status = OK, description = "Stop result", body = StopResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Driver unavailable"),
    ),
)]
async fn stop_session(State(state): State<SharedState>) -> Result<Json<StopResponse>, StatusCode> {
    let (tx, rx) = oneshot::channel();
    let outcome = request(&state, DriverCommand::StopAll { reply: tx }, rx).await?;
    Ok(Json(stop_response(outcome)))
}

/// Send a command to the driver task and wait for its reply.
async fn request<T>(
    state: &SharedState,
    cmd: DriverCommand,
    rx: oneshot::Receiver<T>,
) -> Result<T, StatusCode> {
    state
        .driver_cmd_tx
        .send(cmd)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    // Result layers: timeout / channel-closed.
    let Ok(Ok(reply)) = tokio::time::timeout(COMMAND_TIMEOUT, rx).await else {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    };
    Ok(reply)
}

fn stop_response(outcome: StopOutcome) -> StopResponse {
    match outcome {
        StopOutcome::NotRunning => StopResponse {
            outcome: "not_running".to_string(),
            task_id: None,
            exit: None,
        },
        StopOutcome::Stopped { task_id, exit } => StopResponse {
            outcome: "stopped".to_string(),
            task_id: Some(task_id),
            exit: Some(exit.to_string()),
        },
        StopOutcome::Detached { task_id } => StopResponse {
            outcome: "detached".to_string(),
            task_id: Some(task_id),
            exit: None,
        },
    }
}
