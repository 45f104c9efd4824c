use tracing::instrument;

use crate::{AuthError, Clock, Result, RevocationService, SystemClock, TokenCache, TokenCodec};

const BEARER_PREFIX: &str = "Bearer ";

/// An authenticated caller, handed to downstream handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub account_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
    /// The raw token, so a handler can revoke the session it arrived on.
    pub token: String,
}

/// Strips a leading `Bearer ` from an `Authorization` header value. A header
/// that is exactly `Bearer ` is returned unchanged.
pub fn strip_bearer(header: &str) -> &str {
    header
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
        .unwrap_or(header)
}

/// Decides whether a presented token is currently acceptable.
///
/// Checks run in a fixed order: the deny-list, then signature and expiry,
/// then the account's invalidation mark.
#[derive(Clone, Debug)]
pub struct Authorizer<C, K = SystemClock> {
    revocation: RevocationService<C, K>,
}

impl<C, K> Authorizer<C, K>
where
    C: TokenCache,
    K: Clock,
{
    pub fn new(revocation: RevocationService<C, K>) -> Self {
        Self { revocation }
    }

    pub fn revocation(&self) -> &RevocationService<C, K> {
        &self.revocation
    }

    pub fn codec(&self) -> &TokenCodec {
        self.revocation.codec()
    }

    /// Authorizes a bare token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Blacklisted`] if the token was revoked.
    /// - [`AuthError::TokenDecode`] if it is malformed, forged or expired.
    /// - [`AuthError::Invalidated`] if it was issued strictly before the
    ///   account's invalidation mark.
    /// - [`AuthError::Cache`] or [`AuthError::CorruptInvalidationMark`] if
    ///   revocation state cannot be read. The token is not accepted.
    #[instrument(level = "debug", skip_all, fields(account_id = tracing::field::Empty))]
    pub async fn authorize(&self, token: &str) -> Result<Principal> {
        if self.revocation.is_blacklisted(token).await? {
            return Err(AuthError::Blacklisted);
        }

        let claims = self.revocation.codec().decode(token)?;
        tracing::Span::current().record("account_id", claims.account_id.as_str());

        let invalidated_at = self
            .revocation
            .get_invalidation_time(&claims.account_id)
            .await?;
        if invalidated_at > 0 && claims.iat < invalidated_at {
            return Err(AuthError::Invalidated {
                issued_at: claims.iat,
                invalidated_at,
            });
        }

        Ok(Principal {
            account_id: claims.account_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
            token: token.to_owned(),
        })
    }

    /// Authorizes the value of an `Authorization` header.
    ///
    /// # Errors
    ///
    /// [`AuthError::MissingToken`] if the header is absent or empty,
    /// otherwise as [`Self::authorize`].
    pub async fn authorize_header(&self, header: Option<&str>) -> Result<Principal> {
        match header {
            Some(value) if !value.is_empty() => self.authorize(strip_bearer(value)).await,
            _ => Err(AuthError::MissingToken),
        }
    }

    /// Like [`Self::authorize_header`], but any failure yields an anonymous
    /// caller. Cache failures included: identity is never granted without a
    /// successful check.
    pub async fn authorize_optional(&self, header: Option<&str>) -> Option<Principal> {
        header?;
        match self.authorize_header(header).await {
            Ok(principal) => Some(principal),
            Err(e) => {
                if e.is_unauthorized() {
                    tracing::debug!(error = %e, "optional auth rejected token");
                } else {
                    tracing::warn!(error = %e, "optional auth check failed");
                }
                None
            }
        }
    }
}
