//! Username/password accounts that tokens are issued to.
//!
//! Passwords are stored as Argon2id PHC strings. Hashing and verification are
//! CPU-bound; async callers should run them on a blocking thread.

use std::{collections::HashMap, sync::Arc};

use argon2::{
    Argon2, Params,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{AuthError, Result};

const SALT_LEN: usize = 16;

/// A login identity. `account_id` is the token subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub username: String,
    /// PHC-formatted hash, e.g. `$argon2id$v=19$...`.
    pub password_hash: String,
}

/// In-process account table keyed by username. Clones share the table.
#[derive(Clone)]
pub struct AccountStore {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    hasher: Argon2<'static>,
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}

impl core::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountStore")
            .field("accounts", &self.len())
            .finish_non_exhaustive()
    }
}

impl AccountStore {
    /// An empty store hashing new passwords with the given Argon2id cost.
    /// Existing hashes always verify with the parameters they were made
    /// with.
    pub fn with_params(params: Params) -> Self {
        Self {
            accounts: Arc::default(),
            hasher: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        }
    }

    /// Seeds the store with already-hashed accounts.
    ///
    /// # Errors
    ///
    /// [`AuthError::UsernameTaken`] if two accounts share a username.
    pub fn with_accounts(self, accounts: impl IntoIterator<Item = Account>) -> Result<Self> {
        for account in accounts {
            self.insert(account)?;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds an account whose password is already hashed.
    ///
    /// # Errors
    ///
    /// [`AuthError::UsernameTaken`] if the username exists.
    pub fn insert(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(&account.username) {
            return Err(AuthError::UsernameTaken {
                username: account.username,
            });
        }
        accounts.insert(account.username.clone(), account);
        Ok(())
    }

    /// Hashes `password` and stores a new account under `account_id`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UsernameTaken`] if the username exists.
    /// - [`AuthError::PasswordHash`] if hashing fails.
    pub fn register(&self, account_id: String, username: &str, password: &str) -> Result<Account> {
        if self.accounts.read().contains_key(username) {
            return Err(AuthError::UsernameTaken {
                username: username.to_owned(),
            });
        }
        let account = Account {
            account_id,
            username: username.to_owned(),
            password_hash: self.hash_password(password)?,
        };
        self.insert(account.clone())?;
        tracing::info!(account_id = %account.account_id, "registered account");
        Ok(account)
    }

    /// Checks a username and password pair.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] for an unknown user or a wrong
    ///   password. The two are indistinguishable to the caller.
    /// - [`AuthError::PasswordHash`] if the stored hash is unreadable.
    pub fn verify(&self, username: &str, password: &str) -> Result<Account> {
        let Some(account) = self.accounts.read().get(username).cloned() else {
            return Err(AuthError::InvalidCredentials);
        };
        let parsed = PasswordHash::new(&account.password_hash).map_err(AuthError::PasswordHash)?;
        match self.hasher.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(account),
            Err(password_hash::Error::Password) => Err(AuthError::InvalidCredentials),
            Err(e) => Err(AuthError::PasswordHash(e)),
        }
    }

    /// Hashes `password` into a PHC string with a fresh random salt.
    ///
    /// # Errors
    ///
    /// [`AuthError::PasswordHash`] if hashing fails.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt);
        let salt = SaltString::encode_b64(&salt).map_err(AuthError::PasswordHash)?;
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(AuthError::PasswordHash)
    }
}
