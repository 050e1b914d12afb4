use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::roles::{Role, RoleSet};

/// Raw permission configuration: `entity -> action -> role names`.
///
/// This is the shape of the permissions file once decoded. Role lists may
/// contain duplicates; they collapse when the table is built.
pub type PermissionConfig = HashMap<String, HashMap<String, Vec<String>>>;

/// Immutable lookup from `(entity, action)` to the roles allowed to perform it.
///
/// Built once at startup and shared read-only (`Arc<PermissionTable>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionTable {
    entities: BTreeMap<String, BTreeMap<String, RoleSet>>,
}

impl PermissionTable {
    /// Build a table from decoded configuration.
    pub fn from_config(config: PermissionConfig) -> Self {
        let entities = config
            .into_iter()
            .map(|(entity, actions)| {
                let actions = actions
                    .into_iter()
                    .map(|(action, roles)| (action, roles.into_iter().map(Role::new).collect()))
                    .collect();
                (entity, actions)
            })
            .collect();

        Self { entities }
    }

    /// Roles permitted to perform `action` on `entity`.
    ///
    /// `None` means the pair was never configured. `Some(empty)` means it was
    /// configured and nobody may perform it.
    pub fn lookup(&self, entity: &str, action: &str) -> Option<&RoleSet> {
        self.entities.get(entity)?.get(action)
    }

    pub fn contains(&self, entity: &str, action: &str) -> bool {
        self.lookup(entity, action).is_some()
    }

    /// Configured entities with their actions, in name order.
    pub fn entities(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, RoleSet>)> {
        self.entities.iter().map(|(name, actions)| (name.as_str(), actions))
    }

    /// Number of configured `(entity, action)` pairs.
    pub fn len(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode-side helper so the table can be read straight from a config format.
impl<'de> Deserialize<'de> for PermissionTable {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        PermissionConfig::deserialize(deserializer).map(Self::from_config)
    }
}
