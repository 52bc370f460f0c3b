//! API error types and handling for the AquaAlert API.
//!
//! A closed set of failures. Every variant renders a fixed or
//! validator-authored message; internal causes are logged, never returned.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;
use crate::CoreError;

/// API error type that converts to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body missing, unparseable or failing validation (400)
    #[error("{message}")]
    MalformedPayload {
        /// Safe, caller-facing explanation
        message: String,
    },

    /// The record could not be stored (500)
    #[error("The record could not be saved. Please try again later.")]
    PersistenceFailure {
        /// Underlying store failure, logged only
        #[source]
        source: StoreError,
    },

    /// No valid session (401)
    #[error("Authentication required.")]
    Unauthenticated,

    /// Session role not allowed for this action (403)
    #[error("{message}")]
    Forbidden {
        /// Safe, caller-facing explanation
        message: String,
    },

    /// Identifier already registered (409)
    #[error("{message}")]
    Conflict {
        /// Safe, caller-facing explanation
        message: String,
    },

    /// Login failed (401)
    #[error("Invalid phone number/email or password.")]
    InvalidCredentials,

    /// Unexpected server-side failure (500)
    #[error("Something went wrong. Please try again later.")]
    Internal {
        /// Logged only
        detail: String,
    },
}

impl ApiError {
    /// Create a malformed-payload error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            Self::PersistenceFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
            Self::PersistenceFailure { .. } => "PERSISTENCE_FAILURE",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::Conflict { .. } => "CONFLICT",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(source: StoreError) -> Self {
        Self::PersistenceFailure { source }
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(message) => Self::MalformedPayload { message },
            CoreError::Store(source) => Self::PersistenceFailure { source },
            CoreError::Auth(auth) => auth.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::PasswordTooShort | AuthError::InvalidIdentifier(_) => {
                Self::malformed(error.to_string())
            }
            AuthError::AlreadyRegistered { .. } => Self::Conflict {
                message: error.to_string(),
            },
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::Hashing(detail) => Self::Internal { detail },
            AuthError::Store(source) => Self::PersistenceFailure { source },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "rejected request body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Request body must be sent as application/json."
            }
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON.",
            JsonRejection::JsonDataError(_) => {
                "Request body is missing required fields or has fields of the wrong type."
            }
            _ => "Request body could not be read.",
        };
        Self::malformed(message)
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always "error"
    pub status: &'static str,
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::PersistenceFailure { source } => {
                tracing::error!(error = %self, %source, "API error");
            }
            ApiError::Internal { detail } => {
                tracing::error!(error = %self, %detail, "API error");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let body = ErrorResponse {
            status: "error",
            code: self.error_code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
