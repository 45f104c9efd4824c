use thiserror::Error;

/// A result type defaulting to [`AuthError`].
pub type Result<T, E = AuthError> = core::result::Result<T, E>;

/// Failures talking to the token cache.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    #[cfg(feature = "redis")]
    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    /// The backend could not be reached or refused the operation.
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Everything that can go wrong issuing, revoking or authorizing a token.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No token was presented.
    #[error("missing bearer token")]
    MissingToken,

    /// The token is malformed, carries a bad signature or has expired.
    #[error("invalid token: {0}")]
    TokenDecode(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    TokenEncode(#[source] jsonwebtoken::errors::Error),

    /// The token is on the deny-list.
    #[error("token has been revoked")]
    Blacklisted,

    /// The token predates its account's invalidation mark.
    #[error("token issued at {issued_at} was invalidated at {invalidated_at}")]
    Invalidated { issued_at: i64, invalidated_at: i64 },

    /// The cache could not answer. Callers must fail closed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A stored invalidation mark is not an integer.
    #[error("invalidation mark for {subject} is corrupt: {raw:?}")]
    CorruptInvalidationMark { subject: String, raw: String },

    /// Unknown username or wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username {username:?} is already taken")]
    UsernameTaken { username: String },

    /// Hashing failed or a stored hash is unreadable.
    #[error("password hashing failed: {0}")]
    PasswordHash(#[source] argon2::password_hash::Error),

    #[error("invalid jwt configuration: {0}")]
    Config(&'static str),
}

impl AuthError {
    /// Whether the failure is the caller's fault (bad, missing or revoked
    /// credentials) rather than the server's.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::MissingToken
                | Self::TokenDecode(_)
                | Self::Blacklisted
                | Self::Invalidated { .. }
                | Self::InvalidCredentials
        )
    }
}
