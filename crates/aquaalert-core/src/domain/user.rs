//! User accounts and roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Domain used for the placeholder email of phone-registered workers.
pub const WORKER_EMAIL_DOMAIN: &str = "worker.aquaalert.com";

/// Unique identifier for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Create a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submits health reports from the field
    Worker,
    /// Reads the surveillance dashboard
    Official,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Worker => write!(f, "worker"),
            Role::Official => write!(f, "official"),
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worker" => Ok(Role::Worker),
            "official" => Ok(Role::Official),
            other => Err(CoreError::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Login key: the phone number for workers, derived from the email for officials
    pub username: String,
    /// Email address (placeholder for workers)
    pub email: String,
    /// Phone number, workers only
    pub phone_number: Option<String>,
    /// Argon2id PHC string; carries its own salt and cost parameters
    pub password_hash: String,
    /// Account role
    pub role: Role,
}

impl User {
    /// Placeholder email for a worker registered by phone number.
    pub fn worker_email(phone: &str) -> String {
        format!("{phone}@{WORKER_EMAIL_DOMAIN}")
    }

    /// Username derived from an official's email: the part before `@`.
    pub fn official_username(email: &str) -> &str {
        email.split('@').next().unwrap_or(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("worker".parse::<Role>().unwrap(), Role::Worker);
        assert_eq!("official".parse::<Role>().unwrap(), Role::Official);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Official.to_string(), "official");
    }

    #[test]
    fn test_derived_identities() {
        assert_eq!(
            User::worker_email("9876543210"),
            "9876543210@worker.aquaalert.com"
        );
        assert_eq!(User::official_username("asha@health.gov.in"), "asha");
        assert_eq!(User::official_username("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Worker).unwrap(), "\"worker\"");
    }
}
