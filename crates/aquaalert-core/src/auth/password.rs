//! Argon2id password hashing, stored as PHC strings.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use super::AuthError;

/// Hashes and verifies passwords with a fixed Argon2id cost.
#[derive(Clone)]
pub struct PasswordHashing {
    argon2: Argon2<'static>,
}

impl PasswordHashing {
    /// Argon2id with explicit cost parameters.
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Minimum-cost parameters; only for tests.
    #[cfg(test)]
    pub(crate) fn fast() -> Self {
        Self::new(Params::new(Params::MIN_M_COST, 1, 1, None).unwrap_or_default())
    }

    /// PHC string (`$argon2id$v=19$m=...`) for `password` under a fresh salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let salt = SaltString::encode_b64(&bytes).map_err(AuthError::hashing)?;

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(AuthError::hashing)?;
        Ok(hash.to_string())
    }

    /// Check `password` against a stored PHC string. Unparseable hashes never
    /// verify.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(error) => {
                tracing::warn!(%error, "stored password hash is not a valid PHC string");
                false
            }
        }
    }
}

impl Default for PasswordHashing {
    /// Crate defaults: 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_phc_string() {
        let hashing = PasswordHashing::fast();
        let stored = hashing.hash("secret1").unwrap();

        assert!(stored.starts_with("$argon2id$v=19$"));
        let parsed = PasswordHash::new(&stored).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let hashing = PasswordHashing::fast();
        assert_ne!(hashing.hash("secret1").unwrap(), hashing.hash("secret1").unwrap());
    }

    #[test]
    fn test_verify() {
        let hashing = PasswordHashing::fast();
        let stored = hashing.hash("secret1").unwrap();
        assert!(hashing.verify("secret1", &stored));
        assert!(!hashing.verify("secret2", &stored));
        assert!(!hashing.verify("secret1", "not-a-phc-string"));
    }

    #[test]
    fn test_verify_reads_cost_from_stored_hash() {
        let stored = PasswordHashing::fast().hash("secret1").unwrap();
        assert!(PasswordHashing::default().verify("secret1", &stored));
    }
}
