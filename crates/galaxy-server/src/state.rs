use anyhow::Context;
use core::time::Duration;
use galaxy_auth::{
    Account, AccountStore, Authorizer, CacheError, MemoryCache, RedisCache, RevocationService, TokenCache, TokenCodec,
};
use galaxy_id::{
    GalaxyId, LockSnowflakeGenerator, NodeIdentity, SnowflakeGeneratorAsyncExt, SystemProbe,
    TokioSleep, TokioYield, WallClock,
};

use std::path::Path;

use crate::config::{SequenceWait, ServerConfig};

pub type Generator = LockSnowflakeGenerator<GalaxyId, WallClock>;

/// The revocation store picked at startup.
#[derive(Clone)]
pub enum CacheBackend {
    /// Process-local. Revocations are lost on restart and not shared.
    Memory(MemoryCache),
    Redis(RedisCache),
}

impl CacheBackend {
    /// Drops expired in-memory entries. Redis expires keys itself.
    pub fn purge_expired(&self) -> usize {
        match self {
            Self::Memory(cache) => cache.purge_expired(),
            Self::Redis(_) => 0,
        }
    }
}

impl TokenCache for CacheBackend {
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => cache.set_ex(key, value, ttl).await,
            Self::Redis(cache) => cache.set_ex(key, value, ttl).await,
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Redis(cache) => cache.get(key).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => cache.delete(key).await,
            Self::Redis(cache) => cache.delete(key).await,
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        match self {
            Self::Memory(cache) => cache.exists(key).await,
            Self::Redis(cache) => cache.exists(key).await,
        }
    }
}

/// Everything handlers share. Built once in `main` and passed around as
/// `Arc<AppState>`.
pub struct AppState {
    pub generator: Generator,
    pub authorizer: Authorizer<CacheBackend>,
    pub accounts: AccountStore,
    pub sequence_wait: SequenceWait,
}

impl AppState {
    pub fn new(
        generator: Generator,
        authorizer: Authorizer<CacheBackend>,
        accounts: AccountStore,
        sequence_wait: SequenceWait,
    ) -> Self {
        Self {
            generator,
            authorizer,
            accounts,
            sequence_wait,
        }
    }

    /// Resolves the node identity, connects the cache and wires the
    /// generator and authorizer.
    ///
    /// # Errors
    ///
    /// Fails if the JWT settings are invalid, the accounts file cannot be
    /// loaded, or Redis is configured but unreachable.
    pub async fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let identity = NodeIdentity::resolve(
            config.worker_id.as_deref(),
            config.datacenter_id.as_deref(),
            &SystemProbe,
        );
        let generator = LockSnowflakeGenerator::new(identity, WallClock::default());

        let codec = TokenCodec::new(&config.jwt)?;
        let cache = match &config.redis_url {
            Some(url) => CacheBackend::Redis(
                RedisCache::connect(url)
                    .await
                    .context("failed to connect to REDIS_URL")?,
            ),
            None => {
                tracing::warn!(
                    "REDIS_URL not set, revocation state is kept in memory and not shared between instances"
                );
                CacheBackend::Memory(MemoryCache::default())
            }
        };

        let revocation =
            RevocationService::new(cache, codec).with_invalidation_ttl(config.invalidation_ttl);

        let accounts = match &config.accounts_file {
            Some(path) => AccountStore::default().with_accounts(load_accounts(path)?)?,
            None => AccountStore::default(),
        };
        tracing::info!(accounts = accounts.len(), "account store ready");

        Ok(Self::new(
            generator,
            Authorizer::new(revocation),
            accounts,
            config.sequence_wait,
        ))
    }

    /// Mints an ID without blocking the runtime.
    ///
    /// # Errors
    ///
    /// Propagates generator errors such as a backward clock.
    pub async fn next_id(&self) -> galaxy_id::Result<GalaxyId> {
        match self.sequence_wait {
            SequenceWait::Yield => {
                self.generator
                    .try_next_id_async::<TokioYield>()
                    .await
            }
            SequenceWait::Sleep => {
                self.generator
                    .try_next_id_async::<TokioSleep>()
                    .await
            }
        }
    }
}

/// Reads a JSON array of [`Account`]s.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a JSON account list.
pub fn load_accounts(path: &Path) -> anyhow::Result<Vec<Account>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read accounts file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("accounts file {} is not a JSON account list", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct TempFile(PathBuf);

    impl TempFile {
        fn with_contents(name: &str, contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!("galaxy-{}-{name}", std::process::id()));
            std::fs::write(&path, contents).unwrap();
            Self(path)
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn accounts_file_is_parsed() {
        let file = TempFile::with_contents(
            "accounts.json",
            r#"[{"account_id":"7","username":"root","password_hash":"$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ$aGFzaA"}]"#,
        );
        let accounts = load_accounts(&file.0).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].username, "root");
    }

    #[test]
    fn malformed_accounts_file_is_an_error() {
        let file = TempFile::with_contents("broken.json", r#"{"username":"root"}"#);
        assert!(load_accounts(&file.0).is_err());
        assert!(load_accounts(Path::new("/nonexistent/galaxy/accounts.json")).is_err());
    }
}
