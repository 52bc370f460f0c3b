//! REST API for AquaAlert ingestion and the officials' dashboard.
//!
//! ## Endpoints
//!
//! ### Ingestion
//! - `POST /api/submit-report/` - Health report from a signed-in worker
//! - `POST /api/water-quality/` - Sensor reading
//!
//! ### Dashboard
//! - `GET /api/dashboard-data/` - Alerts, map points and chart series
//! - `GET /api/session-status/` - Caller's session and role
//!
//! ### Auth
//! - `POST /api/auth/signup/` - Create an account
//! - `POST /api/auth/login/` - Obtain a bearer token
//! - `POST /api/auth/logout/` - Drop the caller's token

pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};

pub use dto::*;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Create the AquaAlert API router with all endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use aquaalert_core::api::{create_router, AppState};
///
/// #[tokio::main]
/// async fn main() {
///     let state = AppState::new();
///     let app = create_router(state);
///     // ... serve with axum
/// }
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Ingestion endpoints
        .route("/api/submit-report/", post(handlers::submit_health_report))
        .route("/api/water-quality/", post(handlers::submit_water_quality))
        // Dashboard endpoints
        .route("/api/dashboard-data/", get(handlers::dashboard_data))
        .route("/api/session-status/", get(handlers::session_status))
        // Auth endpoints
        .route("/api/auth/signup/", post(handlers::signup))
        .route("/api/auth/login/", post(handlers::login))
        .route("/api/auth/logout/", post(handlers::logout))
        .with_state(state)
}
