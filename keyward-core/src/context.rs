use std::sync::Arc;

use crate::{
    crypto::AuthCrypto,
    identity::{AssignmentStore, CredentialStore, RoleStore},
    session::{Clock, SessionLifetime, SessionManager, SystemClock},
};

/// The four stores wired together over shared handles.
///
/// Cloning is cheap; every clone sees the same state.
#[derive(Debug, Clone)]
pub struct Identity {
    credentials: Arc<CredentialStore>,
    roles: Arc<RoleStore>,
    assignments: Arc<AssignmentStore>,
    sessions: Arc<SessionManager>,
}

impl Identity {
    pub fn new(crypto: Arc<AuthCrypto>, lifetime: SessionLifetime) -> Self {
        Self::with_clock(crypto, lifetime, Arc::new(SystemClock))
    }

    pub fn with_clock(
        crypto: Arc<AuthCrypto>,
        lifetime: SessionLifetime,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let roles = Arc::new(RoleStore::new(clock.clone()));
        let assignments = Arc::new(AssignmentStore::new(roles.clone()));
        let credentials = Arc::new(CredentialStore::new(
            crypto.clone(),
            assignments.clone(),
            clock.clone(),
        ));
        let sessions = Arc::new(SessionManager::new(
            credentials.clone(),
            crypto,
            lifetime,
            clock,
        ));

        Self {
            credentials,
            roles,
            assignments,
            sessions,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn roles(&self) -> &RoleStore {
        &self.roles
    }

    pub fn assignments(&self) -> &AssignmentStore {
        &self.assignments
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Shared handle for background work such as the session sweeper.
    pub fn session_manager(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }
}
