//! Persistence for reports and user accounts.

mod memory;

pub use memory::InMemoryStore;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{HealthReport, User, WaterQualityReport};

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Journal file could not be read or written
    #[error("Journal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Journal holds a line that is not a valid record
    #[error("Journal is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Unique key already present
    #[error("Duplicate {field}: {value}")]
    Duplicate {
        /// Field that must be unique
        field: &'static str,
        /// Offending value
        value: String,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Report and user repository.
///
/// Writes are append-only; nothing is updated or deleted.
pub trait ReportStore: Send + Sync {
    /// Persist a health report.
    fn insert_health_report(&self, report: HealthReport) -> StoreResult<HealthReport>;

    /// Persist a water-quality reading.
    fn insert_water_report(&self, report: WaterQualityReport) -> StoreResult<WaterQualityReport>;

    /// Health reports with `timestamp >= since`, oldest first.
    fn health_reports_since(&self, since: DateTime<Utc>) -> Vec<HealthReport>;

    /// Most recently created reading for `village`.
    fn latest_water_report(&self, village: &str) -> Option<WaterQualityReport>;

    /// Persist a new user. Username and email must be unique.
    fn insert_user(&self, user: User) -> StoreResult<User>;

    /// Look up a user by login key.
    fn find_user_by_username(&self, username: &str) -> Option<User>;

    /// Look up a user by email.
    fn find_user_by_email(&self, email: &str) -> Option<User>;

    /// Number of registered users.
    fn user_count(&self) -> usize;
}
