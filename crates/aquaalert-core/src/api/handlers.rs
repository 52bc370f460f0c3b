//! Axum request handlers for the AquaAlert REST API.
//!
//! JSON bodies are taken as `Result<Json<T>, JsonRejection>` so that parse
//! failures render through [`ApiError`] instead of axum's plain-text
//! rejection.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};

use super::dto::*;
use super::error::{ApiError, ApiResult};
use super::state::AppState;
use crate::alerting::DashboardData;
use crate::auth::Session;
use crate::domain::{NewHealthReport, NewWaterQualityReport, Role};

// ============================================================================
// Ingestion Handlers
// ============================================================================

/// Record a health report from a signed-in worker.
///
/// ```yaml
/// /api/submit-report/:
///   post:
///     security: [bearer]
///     responses:
///       200: {"status": "success", "message": "Report saved."}
///       400: malformed body
///       401: no session
///       403: session is not a worker
///       500: store failure
/// ```
#[tracing::instrument(skip(state, headers, body))]
pub async fn submit_health_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SubmitHealthReportRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let session = require_session(&state, &headers)?;
    if session.role != Role::Worker {
        return Err(ApiError::forbidden(
            "Only health workers can submit health reports.",
        ));
    }
    let Json(request) = body?;

    state.submit_health_report(NewHealthReport {
        village: request.village,
        age_group: request.age_group,
        symptoms: request.symptoms,
        reported_by: session.user_id,
    })?;

    Ok(Json(StatusResponse::success("Report saved.")))
}

/// Record a water-quality reading from the sensor feed.
///
/// ```yaml
/// /api/water-quality/:
///   post:
///     responses:
///       200: {"status": "success", "message": "Water quality data received."}
///       400: malformed body or out-of-range value
///       500: store failure
/// ```
#[tracing::instrument(skip(state, body))]
pub async fn submit_water_quality(
    State(state): State<AppState>,
    body: Result<Json<WaterQualityRequest>, JsonRejection>,
) -> ApiResult<Json<StatusResponse>> {
    let Json(request) = body?;

    state.submit_water_report(NewWaterQualityReport {
        village: request.village,
        ph: request.ph,
        turbidity: request.turbidity,
        contaminants: request.contaminants,
    })?;

    Ok(Json(StatusResponse::success("Water quality data received.")))
}

// ============================================================================
// Dashboard Handlers
// ============================================================================

/// Alerts, map points and chart series for the trailing window.
#[tracing::instrument(skip(state))]
pub async fn dashboard_data(State(state): State<AppState>) -> Json<DashboardData> {
    Json(state.dashboard())
}

/// Whether the caller holds a session, and with which role.
#[tracing::instrument(skip(state, headers))]
pub async fn session_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionStatusResponse> {
    let session = state.session_from_headers(&headers);
    Json(SessionStatusResponse {
        authenticated: session.is_some(),
        role: session.map(|s| s.role),
    })
}

// ============================================================================
// Auth Handlers
// ============================================================================

/// Create an account and sign it in.
#[tracing::instrument(skip(state, body))]
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = body?;
    let session = state
        .auth()
        .signup(&request.identifier, &request.password, request.role)?;
    Ok(Json(session_to_response(session)))
}

/// Sign in with a phone number, username or email.
#[tracing::instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(request) = body?;
    let session = state.auth().login(&request.identifier, &request.password)?;
    Ok(Json(session_to_response(session)))
}

/// End the caller's session, if any.
#[tracing::instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<StatusResponse> {
    if let Some(session) = state.session_from_headers(&headers) {
        state.auth().logout(&session.token);
    }
    Json(StatusResponse::success("Logged out."))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn require_session(state: &AppState, headers: &HeaderMap) -> ApiResult<Session> {
    state
        .session_from_headers(headers)
        .ok_or(ApiError::Unauthenticated)
}

fn session_to_response(session: Session) -> AuthResponse {
    AuthResponse {
        status: "success".to_string(),
        token: session.token,
        username: session.username,
        role: session.role,
    }
}
