//! Account signup, login and bearer-token sessions.

mod password;

pub use password::PasswordHashing;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::{Role, User, UserId};
use crate::store::{ReportStore, StoreError};

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Lifetime of a session token after it is issued.
pub const DEFAULT_SESSION_TTL: Duration = Duration::weeks(2);

/// Authentication failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password shorter than [`MIN_PASSWORD_LEN`]
    #[error("Password must be at least 6 characters long.")]
    PasswordTooShort,

    /// Identifier is empty or otherwise unusable
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Phone number or email already has an account
    #[error("This {kind} is already registered.")]
    AlreadyRegistered {
        /// "phone number" or "email"
        kind: &'static str,
    },

    /// Unknown identifier or wrong password
    #[error("Invalid phone number/email or password.")]
    InvalidCredentials,

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Underlying store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    fn hashing(error: argon2::password_hash::Error) -> Self {
        Self::Hashing(error.to_string())
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    /// Signed-in user
    pub user_id: UserId,
    /// Login key
    pub username: String,
    /// Role of the signed-in user
    pub role: Role,
    /// When the token was handed out
    pub issued_at: DateTime<Utc>,
}

/// Creates accounts and tracks live sessions.
pub struct AuthService {
    store: Arc<dyn ReportStore>,
    clock: Arc<dyn Clock>,
    hashing: PasswordHashing,
    session_ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl AuthService {
    /// Create a service over `store` with default hashing cost and session
    /// lifetime.
    pub fn new(store: Arc<dyn ReportStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            hashing: PasswordHashing::default(),
            session_ttl: DEFAULT_SESSION_TTL,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Use `hashing` for new passwords.
    pub fn with_hashing(mut self, hashing: PasswordHashing) -> Self {
        self.hashing = hashing;
        self
    }

    /// Expire sessions `ttl` after they are issued.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Register an account and open a session for it.
    ///
    /// Workers sign up with a phone number, which becomes their username.
    /// Officials sign up with an email; their username is the local part,
    /// suffixed with the user count when already taken.
    pub fn signup(&self, identifier: &str, password: &str, role: Role) -> Result<Session, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AuthError::InvalidIdentifier("identifier is required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        let already_registered = AuthError::AlreadyRegistered {
            kind: identifier_kind(role),
        };
        let (username, email, phone_number) = match role {
            Role::Worker => {
                if self.store.find_user_by_username(identifier).is_some() {
                    return Err(already_registered);
                }
                (
                    identifier.to_string(),
                    User::worker_email(identifier),
                    Some(identifier.to_string()),
                )
            }
            Role::Official => {
                if self.store.find_user_by_email(identifier).is_some() {
                    return Err(already_registered);
                }
                (self.unique_official_username(identifier), identifier.to_string(), None)
            }
        };

        let user = User {
            id: UserId::new(),
            password_hash: self.hashing.hash(password)?,
            username,
            email,
            phone_number,
            role,
        };

        let user = self.store.insert_user(user).map_err(|error| match error {
            StoreError::Duplicate { .. } => AuthError::AlreadyRegistered {
                kind: identifier_kind(role),
            },
            other => AuthError::Store(other),
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "registered new user");
        Ok(self.open_session(&user))
    }

    fn unique_official_username(&self, email: &str) -> String {
        let base = User::official_username(email);
        if self.store.find_user_by_username(base).is_none() {
            return base.to_string();
        }
        let mut suffix = self.store.user_count();
        loop {
            let candidate = format!("{base}{suffix}");
            if self.store.find_user_by_username(&candidate).is_none() {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Authenticate by username (phone number) or, failing that, by email.
    pub fn login(&self, identifier: &str, password: &str) -> Result<Session, AuthError> {
        let identifier = identifier.trim();
        let user = self
            .store
            .find_user_by_username(identifier)
            .or_else(|| self.store.find_user_by_email(identifier))
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hashing.verify(password, &user.password_hash) {
            tracing::warn!(user_id = %user.id, "rejected login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(self.open_session(&user))
    }

    /// Drop a session. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) {
        if let Some(session) = self.sessions.write().remove(token) {
            tracing::info!(user_id = %session.user_id, "user logged out");
        }
    }

    /// Resolve a bearer token. Expired tokens resolve to nothing and are
    /// dropped.
    pub fn session(&self, token: &str) -> Option<Session> {
        let now = self.clock.now();
        let session = self.sessions.read().get(token).cloned()?;
        if self.is_expired(&session, now) {
            self.sessions.write().remove(token);
            tracing::debug!(user_id = %session.user_id, "session expired");
            return None;
        }
        Some(session)
    }

    /// Number of sessions currently held, expired ones included until pruned.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now >= session.issued_at + self.session_ttl
    }

    fn open_session(&self, user: &User) -> Session {
        let now = self.clock.now();
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            issued_at: now,
        };

        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, existing| !self.is_expired(existing, now));
        if sessions.len() < before {
            tracing::debug!(pruned = before - sessions.len(), "pruned expired sessions");
        }
        sessions.insert(session.token.clone(), session.clone());
        session
    }
}

fn identifier_kind(role: Role) -> &'static str {
    match role {
        Role::Worker => "phone number",
        Role::Official => "email",
    }
}
