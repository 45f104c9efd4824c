mod memory;
#[cfg(feature = "redis")]
mod redis;

pub use memory::*;
#[cfg(feature = "redis")]
pub use self::redis::*;

use core::{future::Future, time::Duration};
use std::sync::Arc;

use crate::CacheError;

/// A key-value store with per-key expiry.
///
/// Every method is a single round trip; implementations need no locking
/// beyond what the backend provides.
pub trait TokenCache: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value, for `ttl`.
    /// Sub-second TTLs are rounded up to one second.
    fn set_ex(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send;

    /// Reads `key`. A missing or expired key is `Ok(None)`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send;

    /// Removes `key`. Removing a missing key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send;

    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, CacheError>> + Send;
}

impl<C: TokenCache> TokenCache for Arc<C> {
    fn set_ex(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).set_ex(key, value, ttl)
    }

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, CacheError>> + Send {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), CacheError>> + Send {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, CacheError>> + Send {
        (**self).exists(key)
    }
}

pub(crate) fn ttl_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs();
    if ttl.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs.max(1)
    }
}
