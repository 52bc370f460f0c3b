//! # AquaAlert core
//!
//! Community health surveillance for a fixed set of villages: health workers
//! submit symptom reports, a sensor feed posts water-quality readings, and
//! officials poll a dashboard that correlates recent case counts with water
//! turbidity.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      aquaalert-core                      │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌─────────────────┐   │
//! │  │    API     │──▶│   Store    │◀──│    Alerting     │   │
//! │  │ (ingest +  │   │ (reports,  │   │  (aggregator)   │   │
//! │  │ dashboard) │   │   users)   │   └─────────────────┘   │
//! │  └─────┬──────┘   └────────────┘                         │
//! │        │          ┌────────────┐   ┌─────────────────┐   │
//! │        └─────────▶│    Auth    │   │   Simulation    │   │
//! │                   │ (sessions) │   │ (sensor states) │   │
//! │                   └────────────┘   └─────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use aquaalert_core::api::{create_router, AppState};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let app = create_router(AppState::new());
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await
//! }
//! ```

#![warn(missing_docs)]

pub mod alerting;
pub mod api;
pub mod auth;
pub mod clock;
pub mod domain;
pub mod simulation;
pub mod store;

pub use alerting::{AggregatorConfig, AlertAggregator, ChartData, DashboardData, MapPoint};
pub use api::{create_router, AppState};
pub use auth::{AuthError, AuthService, Session};
pub use clock::{Clock, SystemClock};
pub use domain::{
    Alert, AlertKind, Decimal2, HealthReport, NewHealthReport, NewWaterQualityReport, Role,
    User, UserId, Village, VillageRegistry, WaterQualityReport,
};
pub use simulation::{SensorReading, SimulatorConfig, SimulatorState, VillageStatus};
pub use store::{InMemoryStore, ReportStore, StoreError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Unified error type for core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A value failed domain validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Authentication error
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}
