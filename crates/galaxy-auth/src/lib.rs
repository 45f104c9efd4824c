//! # galaxy-auth
//!
//! Stateless signed session tokens, made revocable.
//!
//! A [`TokenCodec`] issues and verifies HS256 tokens. A [`RevocationService`]
//! layers two kinds of state on top, both kept in a [`TokenCache`] with
//! per-key TTLs:
//!
//! - a deny-list of individual tokens (logout), each entry living only as
//!   long as the token it blocks;
//! - a per-account invalidation mark (logout everywhere): any token issued
//!   strictly before the mark is rejected.
//!
//! [`AccountStore`] checks passwords at login.
//! [`Authorizer`] composes the checks in the order request middleware needs
//! them. Cache failures always surface as errors, never as "not revoked".
//!
//! ```
//! use galaxy_auth::{Authorizer, JwtConfig, MemoryCache, RevocationService, TokenCodec};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), galaxy_auth::AuthError> {
//! let codec = TokenCodec::new(&JwtConfig::new("0123456789abcdef0123456789abcdef", 24))?;
//! let authorizer = Authorizer::new(RevocationService::new(MemoryCache::default(), codec));
//!
//! let token = authorizer.codec().issue("acct-42")?;
//! let principal = authorizer.authorize(&token).await?;
//! assert_eq!(principal.account_id, "acct-42");
//!
//! authorizer.revocation().add_to_blacklist(&token).await?;
//! assert!(authorizer.authorize(&token).await.is_err());
//! # Ok(())
//! # }
//! ```

mod accounts;
mod authorize;
mod cache;
mod claims;
mod clock;
mod codec;
mod config;
mod error;
mod revocation;

pub use crate::accounts::*;
pub use crate::authorize::*;
pub use crate::cache::*;
pub use crate::claims::*;
pub use crate::clock::*;
pub use crate::codec::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::revocation::*;
