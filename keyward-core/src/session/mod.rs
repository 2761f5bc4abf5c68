//! Session tokens and their lifecycle.
//!
//! A session is `Active` from issuance until it becomes `Revoked`,
//! `Expired` or `Orphaned` (owning account deleted). All three are terminal
//! and all three remove the session from the live map; nothing is ever
//! resurrected.

pub mod clock;
pub mod manager;
pub mod sweeper;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{Session, SessionManager, SweepReport, ValidatedSession};
pub use sweeper::SessionSweeper;
pub use token::{SessionToken, TOKEN_LENGTH};

use chrono::Duration;
use thiserror::Error;

use crate::crypto::CryptoError;

/// Outcomes of session validation and revocation other than success.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token required")]
    TokenMissing,

    #[error("malformed token")]
    TokenMalformed,

    #[error("invalid token")]
    TokenInvalid,

    #[error("token expired")]
    TokenExpired,

    #[error("account no longer exists")]
    AccountGone,

    #[error("session expiry is out of range")]
    ExpiryOutOfRange,

    #[error("token minting failed: {0}")]
    Minting(#[from] CryptoError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifetimeError {
    #[error("session lifetime must be greater than zero")]
    Zero,

    #[error("session lifetime of {0} seconds is out of range")]
    OutOfRange(u64),
}

/// Process-wide session lifetime. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLifetime(Duration);

impl SessionLifetime {
    /// Two hours, the default when nothing is configured.
    pub const DEFAULT_SECS: u64 = 7200;

    /// Ten years.
    pub const MAX_SECS: u64 = 10 * 365 * 24 * 60 * 60;

    pub fn from_secs(secs: u64) -> Result<Self, LifetimeError> {
        if secs == 0 {
            return Err(LifetimeError::Zero);
        }
        if secs > Self::MAX_SECS {
            return Err(LifetimeError::OutOfRange(secs));
        }
        let secs_i64 =
            i64::try_from(secs).map_err(|_| LifetimeError::OutOfRange(secs))?;
        Duration::try_seconds(secs_i64)
            .map(Self)
            .ok_or(LifetimeError::OutOfRange(secs))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_secs(&self) -> i64 {
        self.0.num_seconds()
    }
}

impl Default for SessionLifetime {
    fn default() -> Self {
        Self(Duration::seconds(Self::DEFAULT_SECS as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifetime_must_be_positive() {
        assert_eq!(SessionLifetime::from_secs(0), Err(LifetimeError::Zero));
        assert_eq!(SessionLifetime::from_secs(1).unwrap().as_secs(), 1);
        assert_eq!(SessionLifetime::default().as_secs(), 7200);
    }

    #[test]
    fn lifetime_rejects_overflow() {
        assert!(matches!(
            SessionLifetime::from_secs(u64::MAX),
            Err(LifetimeError::OutOfRange(_))
        ));
        assert_eq!(
            SessionLifetime::from_secs(10_000_000_000_000),
            Err(LifetimeError::OutOfRange(10_000_000_000_000))
        );
    }

    #[test]
    fn lifetime_accepts_the_maximum() {
        let max = SessionLifetime::from_secs(SessionLifetime::MAX_SECS);
        assert_eq!(max.unwrap().as_secs(), SessionLifetime::MAX_SECS as i64);
        assert!(
            SessionLifetime::from_secs(SessionLifetime::MAX_SECS + 1).is_err()
        );
    }
}
