//! In-process identity core: accounts, roles, role memberships and opaque
//! session tokens.
//!
//! Everything lives in memory behind `parking_lot` locks and is safe to share
//! across threads. [`Identity`] wires the stores together; transport layers
//! sit on top of it.

pub mod context;
pub mod crypto;
pub mod identity;
pub mod session;

pub use context::Identity;
pub use crypto::{AuthCrypto, CryptoError, HashCost};
pub use identity::{
    Account, AccountError, AssignmentStore, CredentialStore, Role, RoleError,
    RoleStore, normalize_key,
};
pub use session::{
    Clock, LifetimeError, ManualClock, Session, SessionError, SessionLifetime,
    SessionManager, SessionSweeper, SessionToken, SweepReport, SystemClock,
    ValidatedSession,
};
