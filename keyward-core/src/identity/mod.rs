//! Accounts, roles and the memberships between them.
//!
//! Usernames and role names are case-insensitive: every entry point trims
//! and lowercases its key before touching a map.
//!
//! Lock acquisition order across the crate is sessions, accounts,
//! assignments, roles. Nothing takes them in the opposite direction.

pub mod account;
pub mod assignment;
pub mod role;

pub use account::{Account, AccountError, CredentialStore};
pub use assignment::AssignmentStore;
pub use role::{Role, RoleError, RoleStore};

/// Canonical map key for a username or role name.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}
