use keyward_core::Identity;

/// Shared handler state. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    identity: Identity,
}

impl AppState {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
