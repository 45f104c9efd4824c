use serde::{Deserialize, Serialize};

/// The signed payload of a session token. Times are Unix seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The account the token was issued for.
    pub account_id: String,
    /// Tokens without `iat` read as issued at 0, so any invalidation mark
    /// rejects them.
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}
