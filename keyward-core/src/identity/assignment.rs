use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use super::{RoleStore, normalize_key};

/// Account-to-role memberships.
///
/// The store does not check that either side exists when a membership is
/// added; callers validate first. Memberships whose role has since been
/// deleted are filtered out of listings and pruned there.
#[derive(Debug)]
pub struct AssignmentStore {
    memberships: RwLock<HashMap<String, HashSet<String>>>,
    roles: Arc<RoleStore>,
}

impl AssignmentStore {
    pub fn new(roles: Arc<RoleStore>) -> Self {
        Self {
            memberships: RwLock::new(HashMap::new()),
            roles,
        }
    }

    /// Record that `username` holds `role`. Adding an existing membership is
    /// a no-op.
    pub fn add_role(&self, username: &str, role: &str) {
        self.memberships
            .write()
            .entry(normalize_key(username))
            .or_default()
            .insert(normalize_key(role));
    }

    /// Raw membership check. Does not consult the role store: resolve the
    /// role first to tell "role not found" apart from "not held".
    pub fn has_role(&self, username: &str, role: &str) -> bool {
        self.memberships
            .read()
            .get(&normalize_key(username))
            .is_some_and(|roles| roles.contains(&normalize_key(role)))
    }

    /// Roles `username` currently holds, sorted. Memberships pointing at
    /// deleted roles are dropped from the store along the way.
    pub fn list_roles(&self, username: &str) -> Vec<String> {
        let key = normalize_key(username);

        // assignments -> roles lock order
        let memberships = self.memberships.upgradable_read();
        let Some(held) = memberships.get(&key) else {
            return Vec::new();
        };

        let (mut live, dangling): (Vec<String>, Vec<String>) = held
            .iter()
            .cloned()
            .partition(|role| self.roles.contains(role));

        if !dangling.is_empty() {
            let mut memberships =
                RwLockUpgradableReadGuard::upgrade(memberships);
            if live.is_empty() {
                memberships.remove(&key);
            } else if let Some(held) = memberships.get_mut(&key) {
                for role in &dangling {
                    held.remove(role);
                }
            }
        }

        live.sort_unstable();
        live
    }

    /// Forget every membership of `username`.
    pub fn remove_account(&self, username: &str) {
        self.memberships.write().remove(&normalize_key(username));
    }

    /// Number of stored memberships for `username`, including dangling ones.
    pub fn membership_count(&self, username: &str) -> usize {
        self.memberships
            .read()
            .get(&normalize_key(username))
            .map_or(0, HashSet::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SystemClock;

    fn stores() -> (Arc<RoleStore>, AssignmentStore) {
        let roles = Arc::new(RoleStore::new(Arc::new(SystemClock)));
        let assignments = AssignmentStore::new(roles.clone());
        (roles, assignments)
    }

    #[test]
    fn add_is_idempotent_and_case_insensitive() {
        let (roles, assignments) = stores();
        roles.create("admin").unwrap();

        assignments.add_role("Alice", "ADMIN");
        assignments.add_role("alice", "admin");
        assert!(assignments.has_role("ALICE", "Admin"));
        assert_eq!(assignments.list_roles("alice"), ["admin"]);
        assert_eq!(assignments.membership_count("alice"), 1);
    }

    #[test]
    fn has_role_is_a_raw_membership_check() {
        let (roles, assignments) = stores();
        roles.create("admin").unwrap();
        assignments.add_role("alice", "admin");

        roles.delete("admin").unwrap();
        assert!(assignments.has_role("alice", "admin"));
        assert!(assignments.list_roles("alice").is_empty());
        assert!(!assignments.has_role("alice", "admin"));
    }

    #[test]
    fn recreated_role_revives_untouched_membership() {
        let (roles, assignments) = stores();
        roles.create("admin").unwrap();
        assignments.add_role("alice", "admin");

        roles.delete("admin").unwrap();
        roles.create("admin").unwrap();
        assert!(assignments.has_role("alice", "admin"));
    }

    #[test]
    fn listing_prunes_dangling_memberships() {
        let (roles, assignments) = stores();
        for name in ["viewer", "admin", "editor"] {
            roles.create(name).unwrap();
            assignments.add_role("alice", name);
        }
        roles.delete("editor").unwrap();

        assert_eq!(assignments.membership_count("alice"), 3);
        assert_eq!(assignments.list_roles("alice"), ["admin", "viewer"]);
        assert_eq!(assignments.membership_count("alice"), 2);

        // Pruned for good, even if the role comes back.
        roles.create("editor").unwrap();
        assert!(!assignments.has_role("alice", "editor"));
    }

    #[test]
    fn listing_unknown_or_emptied_account_is_empty() {
        let (roles, assignments) = stores();
        assert!(assignments.list_roles("nobody").is_empty());

        roles.create("admin").unwrap();
        assignments.add_role("alice", "admin");
        roles.delete("admin").unwrap();
        assert!(assignments.list_roles("alice").is_empty());
        assert_eq!(assignments.membership_count("alice"), 0);
    }

    #[test]
    fn remove_account_clears_everything() {
        let (roles, assignments) = stores();
        roles.create("admin").unwrap();
        assignments.add_role("alice", "admin");
        assignments.remove_account("Alice");
        assert!(!assignments.has_role("alice", "admin"));
        assert_eq!(assignments.membership_count("alice"), 0);
    }
}
