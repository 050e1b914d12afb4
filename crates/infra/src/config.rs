//! Permission table loading.
//!
//! The permissions file is TOML, one table per entity, one key per action:
//!
//! ```toml
//! [task]
//! update = ["task owner", "project owner", "admin"]
//! delete = ["project owner", "admin"]
//! ```

use std::path::Path;

use thiserror::Error;
use tracing::info;

use kanelm_auth::{PermissionConfig, PermissionTable};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid permission entry '{entity}.{action}': {message}")]
    Invalid {
        entity: String,
        action: String,
        message: String,
    },
}

/// Read and parse the permissions file at `path`.
pub fn load_permission_table(path: impl AsRef<Path>) -> Result<PermissionTable, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let table = parse_with_origin(&content, &path.display().to_string())?;
    info!(path = %path.display(), entries = table.len(), "loaded permission table");
    Ok(table)
}

/// Parse permissions from an in-memory TOML document.
pub fn parse_permission_table(content: &str) -> Result<PermissionTable, ConfigError> {
    parse_with_origin(content, "<inline>")
}

fn parse_with_origin(content: &str, origin: &str) -> Result<PermissionTable, ConfigError> {
    let config: PermissionConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })?;

    validate(&config)?;
    Ok(PermissionTable::from_config(config))
}

fn validate(config: &PermissionConfig) -> Result<(), ConfigError> {
    for (entity, actions) in config {
        for (action, roles) in actions {
            if let Some(bad) = roles.iter().find(|r| r.trim().is_empty()) {
                return Err(ConfigError::Invalid {
                    entity: entity.clone(),
                    action: action.clone(),
                    message: format!("blank role name {bad:?}"),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanelm_auth::roles;

    const SAMPLE: &str = r#"
        [user]
        update_name = ["user owner", "admin"]
        delete = ["admin"]

        [project]
        update_name = ["project owner", "admin"]
        archive = []

        [task]
        update = ["task owner", "project owner", "admin", "admin"]
    "#;

    #[test]
    fn parses_entities_and_actions() {
        let table = parse_permission_table(SAMPLE).unwrap();

        assert_eq!(table.len(), 5);
        let task_update = table.lookup("task", "update").unwrap();
        assert_eq!(task_update.len(), 3);
        assert!(task_update.contains(&roles::TASK_OWNER));
        assert!(table.lookup("project", "archive").unwrap().is_empty());
        assert!(table.lookup("project", "delete").is_none());
    }

    #[test]
    fn rejects_malformed_documents() {
        let err = parse_permission_table("[task]\nupdate = \"task owner\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn rejects_blank_role_names() {
        let err = parse_permission_table("[task]\nupdate = [\"  \"]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref entity, .. } if entity == "task"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_permission_table("/definitely/not/here/permissions.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here/permissions.toml"));
    }

    #[test]
    fn repository_permissions_file_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../permissions.toml");
        let table = load_permission_table(path).unwrap();
        assert!(table.contains("task", "update"));
        assert!(table.contains("project", "update_name"));
    }
}
