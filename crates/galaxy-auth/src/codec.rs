use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::{AuthError, Claims, Clock, JwtConfig, Result, SystemClock};

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: i64,
    strict: Validation,
    allow_expired: Validation,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// # Errors
    ///
    /// [`AuthError::Config`] if `config` does not validate.
    pub fn new(config: &JwtConfig) -> Result<Self> {
        config.validate()?;

        let mut strict = Validation::new(Algorithm::HS256);
        strict.leeway = 0;
        strict.validate_exp = true;

        let mut allow_expired = strict.clone();
        allow_expired.validate_exp = false;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            lifetime_secs: config.token_lifetime_secs(),
            strict,
            allow_expired,
        })
    }

    /// Issues a token for `account_id`, valid from now for the configured
    /// lifetime.
    ///
    /// "Now" is the system clock. Code running against an injected [`Clock`]
    /// should go through [`RevocationService::issue`] or [`Self::issue_at`].
    ///
    /// [`RevocationService::issue`]: crate::RevocationService::issue
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenEncode`] if signing fails.
    pub fn issue(&self, account_id: &str) -> Result<String> {
        self.issue_at(account_id, SystemClock.unix_seconds())
    }

    /// Issues a token as if it were `issued_at` (Unix seconds).
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenEncode`] if signing fails.
    pub fn issue_at(&self, account_id: &str, issued_at: i64) -> Result<String> {
        let claims = Claims {
            account_id: account_id.to_owned(),
            iat: issued_at,
            exp: issued_at.saturating_add(self.lifetime_secs),
        };
        self.sign(&claims)
    }

    /// Signs arbitrary claims.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenEncode`] if signing fails.
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(AuthError::TokenEncode)
    }

    /// Verifies the signature and expiry, with no leeway.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenDecode`] for any malformed, forged or expired token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.strict)
            .map(|data| data.claims)
            .map_err(AuthError::TokenDecode)
    }

    /// Verifies the signature only. Expired tokens decode successfully.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenDecode`] for any malformed or forged token.
    pub fn decode_allow_expired(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.allow_expired)
            .map(|data| data.claims)
            .map_err(AuthError::TokenDecode)
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }
}
