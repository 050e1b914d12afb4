use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Role identifier used for RBAC.
///
/// Roles are structural labels describing how a user relates to a target
/// resource. They are never persisted; the resolver derives them per request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

/// Held by users flagged as administrators.
pub const ADMIN: Role = Role::from_static("admin");
/// Held when the acting user is the target user.
pub const USER_OWNER: Role = Role::from_static("user owner");
/// Held when the acting user owns the target project.
pub const PROJECT_OWNER: Role = Role::from_static("project owner");
/// Held when the acting user created or is assigned the target task.
pub const TASK_OWNER: Role = Role::from_static("task owner");

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A set of roles.
///
/// Used both for the roles a permission entry allows and for the roles a user
/// holds on one request. Serialized as a sorted list so output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(HashSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role. Adding a role twice is a no-op.
    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }

    /// Roles present in both sets. Neither input is modified.
    pub fn intersection(&self, other: &RoleSet) -> RoleSet {
        self.0.intersection(&other.0).cloned().collect()
    }

    /// Whether the two sets share at least one role.
    pub fn intersects(&self, other: &RoleSet) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().any(|r| large.contains(r))
    }

    /// Role names in lexical order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.0.iter().map(Role::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Role> for RoleSet {
    fn extend<I: IntoIterator<Item = Role>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl Serialize for RoleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names.into_iter().map(Role::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&'static str]) -> RoleSet {
        names.iter().map(|n| Role::from_static(*n)).collect()
    }

    #[test]
    fn intersection_keeps_common_roles_only() {
        let held = set(&["admin", "task owner"]);
        let permitted = set(&["task owner", "project owner"]);

        let common = held.intersection(&permitted);
        assert_eq!(common.sorted(), vec!["task owner"]);
        assert!(held.intersects(&permitted));

        // inputs untouched
        assert_eq!(held.len(), 2);
        assert_eq!(permitted.len(), 2);
    }

    #[test]
    fn empty_sets_never_intersect() {
        let empty = RoleSet::new();
        assert!(!empty.intersects(&set(&["admin"])));
        assert!(!set(&["admin"]).intersects(&empty));
        assert!(empty.intersection(&empty).is_empty());
    }

    #[test]
    fn duplicate_inserts_are_idempotent() {
        let mut roles = RoleSet::new();
        assert!(roles.insert(ADMIN));
        assert!(!roles.insert(Role::new("admin".to_string())));
        assert_eq!(roles.len(), 1);
    }

    #[test]
    fn serializes_sorted() {
        let roles = set(&["user owner", "admin"]);
        let json = serde_json::to_string(&roles).unwrap();
        assert_eq!(json, r#"["admin","user owner"]"#);
    }
}
