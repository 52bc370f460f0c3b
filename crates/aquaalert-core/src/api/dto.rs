//! Data Transfer Objects (DTOs) for the AquaAlert API.
//!
//! Request and response bodies. Field names follow what the worker and
//! dashboard front-ends already send and read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Decimal2, Role};

/// Health report submitted by a worker.
///
/// ## Example
///
/// ```json
/// {
///   "village": "ziro_arunachal",
///   "ageGroup": "18-45",
///   "symptoms": ["fever", "diarrhea"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitHealthReportRequest {
    /// Village identifier
    pub village: String,
    /// Age bucket label
    #[serde(rename = "ageGroup")]
    pub age_group: String,
    /// Observed symptoms
    pub symptoms: Vec<String>,
}

/// Reading posted by the sensor feed.
///
/// ## Example
///
/// ```json
/// {
///   "village": "pelling_sikkim",
///   "ph": 7.21,
///   "turbidity": 1.84,
///   "contaminants": {"e-coli": "low", "arsenic": "safe"}
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct WaterQualityRequest {
    /// Village identifier
    pub village: String,
    /// pH
    pub ph: Decimal2,
    /// Turbidity in NTU
    pub turbidity: Decimal2,
    /// Contaminant name to severity label
    #[serde(default)]
    pub contaminants: BTreeMap<String, String>,
}

/// Generic outcome body used by ingestion and logout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    /// "success" or "error"
    pub status: String,
    /// Human-readable message
    pub message: String,
}

impl StatusResponse {
    /// Successful outcome with `message`.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

/// Who is calling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionStatusResponse {
    /// Whether a valid session token was presented
    pub authenticated: bool,
    /// Role of the caller, when authenticated
    pub role: Option<Role>,
}

/// Account creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    /// Phone number for workers, email for officials
    pub identifier: String,
    /// Plain-text password
    pub password: String,
    /// Requested role
    pub role: Role,
}

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Phone number, username or email
    pub identifier: String,
    /// Plain-text password
    pub password: String,
}

/// Issued session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    /// "success"
    pub status: String,
    /// Bearer token for subsequent requests
    pub token: String,
    /// Login key
    pub username: String,
    /// Role of the account
    pub role: Role,
}
