use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::Arc,
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::{Clock, SessionError, SessionLifetime, SessionToken};
use crate::{
    crypto::AuthCrypto,
    identity::{Account, CredentialStore},
};

/// A live session owned by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    token: SessionToken,
    username: String,
    #[serde(skip)]
    account_id: u64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A session whose expiry equals `now` is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Result of a successful [`SessionManager::validate`].
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub account: Account,
    pub session: Session,
}

/// Counts from one [`SessionManager::purge_expired`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub expired: usize,
    pub orphaned: usize,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.expired + self.orphaned
    }
}

/// Issues, validates and revokes opaque session tokens.
///
/// Expired and orphaned sessions are removed the first time they are
/// observed, either by [`validate`](Self::validate) or by a sweep.
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionToken, Session>>,
    credentials: Arc<CredentialStore>,
    crypto: Arc<AuthCrypto>,
    lifetime: SessionLifetime,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(
        credentials: Arc<CredentialStore>,
        crypto: Arc<AuthCrypto>,
        lifetime: SessionLifetime,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            credentials,
            crypto,
            lifetime,
            clock,
        }
    }

    pub fn lifetime(&self) -> SessionLifetime {
        self.lifetime
    }

    /// Mint a fresh token for `account` and record the session.
    ///
    /// A minted token that collides with a live one is discarded and a new
    /// one drawn; an existing session is never overwritten.
    pub fn issue(&self, account: &Account) -> Result<Session, SessionError> {
        let username = account.username();
        let created_at = self.clock.now();
        let expires_at = created_at
            .checked_add_signed(self.lifetime.as_duration())
            .ok_or(SessionError::ExpiryOutOfRange)?;

        loop {
            let token =
                SessionToken::from_minted(self.crypto.mint_token(username)?);

            let mut sessions = self.sessions.write();
            if let Entry::Vacant(slot) = sessions.entry(token) {
                let session = Session {
                    token: slot.key().clone(),
                    username: username.to_owned(),
                    account_id: account.id(),
                    created_at,
                    expires_at,
                };
                slot.insert(session.clone());
                return Ok(session);
            }
        }
    }

    /// Resolve a raw token to its session and owning account.
    pub fn validate(
        &self,
        raw: &str,
    ) -> Result<ValidatedSession, SessionError> {
        let token = SessionToken::parse(raw)?;

        let session = self
            .sessions
            .read()
            .get(token.as_str())
            .cloned()
            .ok_or(SessionError::TokenInvalid)?;

        if session.is_expired_at(self.clock.now()) {
            self.discard(&session);
            return Err(SessionError::TokenExpired);
        }

        // A same-named account created after this session was issued does
        // not inherit it.
        let account = match self.credentials.get(session.username()) {
            Ok(account) if account.id() == session.account_id => account,
            _ => {
                self.discard(&session);
                return Err(SessionError::AccountGone);
            }
        };

        Ok(ValidatedSession { account, session })
    }

    /// Remove `session` from the live map.
    pub fn revoke(&self, session: &Session) -> Result<(), SessionError> {
        self.sessions
            .write()
            .remove(session.token().as_str())
            .map(|_| ())
            .ok_or(SessionError::TokenInvalid)
    }

    /// Drop every session that has expired or whose account no longer exists.
    pub fn purge_expired(&self) -> SweepReport {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        // sessions -> accounts lock order
        let mut sessions = self.sessions.write();
        sessions.retain(|_, session| {
            if session.is_expired_at(now) {
                report.expired += 1;
                false
            } else if !self
                .credentials
                .is_current(session.username(), session.account_id)
            {
                report.orphaned += 1;
                false
            } else {
                true
            }
        });

        report
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn discard(&self, observed: &Session) {
        let mut sessions = self.sessions.write();
        if sessions.get(observed.token().as_str()) == Some(observed) {
            sessions.remove(observed.token().as_str());
        }
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("sessions", &self.len())
            .field("lifetime", &self.lifetime)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
