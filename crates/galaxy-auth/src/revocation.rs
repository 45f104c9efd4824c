use core::time::Duration;

use tracing::instrument;

use crate::{AuthError, Clock, Result, SystemClock, TokenCache, TokenCodec};

/// How long an invalidation mark is kept: one year.
pub const DEFAULT_INVALIDATION_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

const BLACKLIST_PREFIX: &str = "jwt:blacklist:";
const INVALIDATION_PREFIX: &str = "jwt:invalidation:";

/// Cache key of the deny-list entry for `token`.
pub fn blacklist_key(token: &str) -> String {
    format!("{BLACKLIST_PREFIX}{token}")
}

/// Cache key of the invalidation mark for `subject`.
pub fn invalidation_key(subject: &str) -> String {
    format!("{INVALIDATION_PREFIX}{subject}")
}

/// Token deny-list and per-account invalidation marks over a [`TokenCache`].
///
/// Holds no state of its own: every operation is an independent round trip,
/// so concurrent callers need no coordination and any number of processes
/// can share one cache.
#[derive(Clone, Debug)]
pub struct RevocationService<C, K = SystemClock> {
    cache: C,
    codec: TokenCodec,
    clock: K,
    invalidation_ttl: Duration,
}

impl<C: TokenCache> RevocationService<C> {
    pub fn new(cache: C, codec: TokenCodec) -> Self {
        Self::with_clock(cache, codec, SystemClock)
    }
}

impl<C, K> RevocationService<C, K>
where
    C: TokenCache,
    K: Clock,
{
    pub fn with_clock(cache: C, codec: TokenCodec, clock: K) -> Self {
        Self {
            cache,
            codec,
            clock,
            invalidation_ttl: DEFAULT_INVALIDATION_TTL,
        }
    }

    /// Overrides how long invalidation marks are kept.
    #[must_use]
    pub fn with_invalidation_ttl(mut self, ttl: Duration) -> Self {
        self.invalidation_ttl = ttl;
        self
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }

    pub fn invalidation_ttl(&self) -> Duration {
        self.invalidation_ttl
    }

    /// Issues a token for `account_id` stamped with this service's clock, so
    /// its `iat` is comparable with the marks this service writes.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenEncode`] if signing fails.
    pub fn issue(&self, account_id: &str) -> Result<String> {
        self.codec.issue_at(account_id, self.clock.unix_seconds())
    }

    /// Denies `token` for the rest of its lifetime.
    ///
    /// The entry expires together with the token. A token that has already
    /// expired is left alone, since nothing would accept it anyway.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenDecode`] if the token is malformed or forged.
    /// - [`AuthError::Cache`] if the entry cannot be written.
    #[instrument(level = "debug", skip_all)]
    pub async fn add_to_blacklist(&self, token: &str) -> Result<()> {
        let claims = self.codec.decode_allow_expired(token)?;
        let remaining = claims.exp.saturating_sub(self.clock.unix_seconds());
        if remaining <= 0 {
            tracing::debug!(account_id = %claims.account_id, "token already expired, not blacklisting");
            return Ok(());
        }

        let ttl = Duration::from_secs(remaining.unsigned_abs());
        self.cache.set_ex(&blacklist_key(token), "1", ttl).await?;
        tracing::debug!(account_id = %claims.account_id, ttl_secs = remaining, "token blacklisted");
        Ok(())
    }

    /// # Errors
    ///
    /// [`AuthError::Cache`] if the cache cannot answer. An unreachable cache
    /// is never reported as "not blacklisted".
    #[instrument(level = "trace", skip_all)]
    pub async fn is_blacklisted(&self, token: &str) -> Result<bool> {
        Ok(self.cache.exists(&blacklist_key(token)).await?)
    }

    /// Lifts a deny-list entry before it expires on its own.
    ///
    /// # Errors
    ///
    /// [`AuthError::Cache`] if the entry cannot be removed.
    #[instrument(level = "debug", skip_all)]
    pub async fn remove_from_blacklist(&self, token: &str) -> Result<()> {
        self.cache.delete(&blacklist_key(token)).await?;
        Ok(())
    }

    /// Rejects every token issued for `subject` before now. The new mark
    /// replaces any earlier one. Returns the mark written.
    ///
    /// # Errors
    ///
    /// [`AuthError::Cache`] if the mark cannot be written.
    #[instrument(level = "debug", skip(self))]
    pub async fn invalidate_all_for_subject(&self, subject: &str) -> Result<i64> {
        let now = self.clock.unix_seconds();
        self.cache
            .set_ex(
                &invalidation_key(subject),
                &now.to_string(),
                self.invalidation_ttl,
            )
            .await?;
        tracing::info!(subject, invalidated_at = now, "invalidated all sessions");
        Ok(now)
    }

    /// The current invalidation mark for `subject`, or `0` if none is set.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Cache`] for any read failure other than a missing key.
    /// - [`AuthError::CorruptInvalidationMark`] if the stored value is not
    ///   an integer.
    #[instrument(level = "trace", skip(self))]
    pub async fn get_invalidation_time(&self, subject: &str) -> Result<i64> {
        let Some(raw) = self.cache.get(&invalidation_key(subject)).await? else {
            return Ok(0);
        };
        raw.trim()
            .parse()
            .map_err(|_| AuthError::CorruptInvalidationMark {
                subject: subject.to_owned(),
                raw,
            })
    }
}
