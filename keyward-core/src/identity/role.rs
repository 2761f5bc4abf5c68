use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;

use super::normalize_key;
use crate::session::Clock;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("role already exists")]
    AlreadyExists,

    #[error("role not found")]
    NotFound,
}

/// A named permission group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    name: String,
    created_at: DateTime<Utc>,
}

impl Role {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Registry of defined roles, keyed by normalized name.
///
/// Deleting a role does not touch assignments. Dangling memberships are
/// invisible to checks and pruned when an account's roles are listed.
#[derive(Debug)]
pub struct RoleStore {
    roles: RwLock<HashMap<String, Role>>,
    clock: Arc<dyn Clock>,
}

impl RoleStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn create(&self, name: &str) -> Result<Role, RoleError> {
        let key = normalize_key(name);
        let mut roles = self.roles.write();
        if roles.contains_key(&key) {
            return Err(RoleError::AlreadyExists);
        }

        let role = Role {
            name: key.clone(),
            created_at: self.clock.now(),
        };
        roles.insert(key, role.clone());
        Ok(role)
    }

    pub fn delete(&self, name: &str) -> Result<(), RoleError> {
        self.roles
            .write()
            .remove(&normalize_key(name))
            .map(|_| ())
            .ok_or(RoleError::NotFound)
    }

    pub fn get(&self, name: &str) -> Result<Role, RoleError> {
        self.roles
            .read()
            .get(&normalize_key(name))
            .cloned()
            .ok_or(RoleError::NotFound)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.roles.read().contains_key(&normalize_key(name))
    }

    /// All role names in ascending order.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.roles.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.roles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.read().is_empty()
    }
}
