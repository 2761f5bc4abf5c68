use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use super::{AssignmentStore, normalize_key};
use crate::{
    crypto::{AuthCrypto, CryptoError},
    session::Clock,
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account already exists")]
    AlreadyExists,

    #[error("account not found")]
    NotFound,

    #[error("password hashing failed: {0}")]
    Hashing(#[from] CryptoError),
}

/// A registered account. The password hash never leaves the process: it is
/// skipped when serializing and hidden from `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    #[serde(skip)]
    id: u64,
    username: String,
    #[serde(skip_serializing)]
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl Account {
    /// Store-assigned generation number. A deleted and re-created username
    /// gets a new id.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Accounts keyed by normalized username.
pub struct CredentialStore {
    accounts: RwLock<HashMap<String, Account>>,
    next_id: AtomicU64,
    assignments: Arc<AssignmentStore>,
    crypto: Arc<AuthCrypto>,
    clock: Arc<dyn Clock>,
}

impl CredentialStore {
    pub fn new(
        crypto: Arc<AuthCrypto>,
        assignments: Arc<AssignmentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            assignments,
            crypto,
            clock,
        }
    }

    /// Register a new account.
    ///
    /// Any memberships left under the same name are cleared so a fresh
    /// account starts with no roles.
    pub fn create(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Account, AccountError> {
        let key = normalize_key(username);
        if self.accounts.read().contains_key(&key) {
            return Err(AccountError::AlreadyExists);
        }

        // Argon2 runs without holding the accounts lock; the entry check
        // below stays authoritative.
        let password_hash = self.crypto.hash_password(password)?;

        let mut accounts = self.accounts.write();
        let Entry::Vacant(slot) = accounts.entry(key) else {
            return Err(AccountError::AlreadyExists);
        };

        // accounts -> assignments lock order
        self.assignments.remove_account(slot.key());

        let account = Account {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            username: slot.key().clone(),
            password_hash,
            created_at: self.clock.now(),
        };
        slot.insert(account.clone());
        Ok(account)
    }

    pub fn get(&self, username: &str) -> Result<Account, AccountError> {
        self.accounts
            .read()
            .get(&normalize_key(username))
            .cloned()
            .ok_or(AccountError::NotFound)
    }

    /// Remove the account together with all of its memberships. Both go in
    /// one step: no reader sees the account gone while its roles remain.
    /// Its sessions are orphaned and dropped when next observed.
    pub fn delete(&self, username: &str) -> Result<(), AccountError> {
        let key = normalize_key(username);
        let mut accounts = self.accounts.write();
        if accounts.remove(&key).is_none() {
            return Err(AccountError::NotFound);
        }
        self.assignments.remove_account(&key);
        Ok(())
    }

    /// Check `password` against the account's stored hash.
    pub fn verify_password(&self, account: &Account, password: &str) -> bool {
        self.crypto.verify_password(password, &account.password_hash)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.read().contains_key(&normalize_key(username))
    }

    /// True while `username` still names the account generation `id`.
    pub fn is_current(&self, username: &str, id: u64) -> bool {
        self.accounts
            .read()
            .get(&normalize_key(username))
            .is_some_and(|account| account.id == id)
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("accounts", &self.len())
            .field("crypto", &self.crypto)
            .finish_non_exhaustive()
    }
}
