use core::fmt;

use crate::{AuthError, Result};

/// Shortest accepted HMAC secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Signing parameters for session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of an issued token.
    pub expire_hours: u64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<hidden>")
            .field("expire_hours", &self.expire_hours)
            .finish()
    }
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expire_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expire_hours,
        }
    }

    /// # Errors
    ///
    /// [`AuthError::Config`] if the secret is shorter than
    /// [`MIN_SECRET_LEN`] bytes or the lifetime is zero.
    pub fn validate(&self) -> Result<()> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Config("secret must be at least 32 bytes"));
        }
        if self.expire_hours == 0 {
            return Err(AuthError::Config("expire_hours must be greater than 0"));
        }
        Ok(())
    }

    pub fn token_lifetime_secs(&self) -> i64 {
        i64::try_from(self.expire_hours.saturating_mul(3600)).unwrap_or(i64::MAX)
    }
}
