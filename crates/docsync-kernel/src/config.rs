//! Sync session configuration.
//!
//! One [`SyncConfig`] binds one adapter instance to a workspace and its owning
//! project. Create a new config (and adapter) per sync session instead of
//! rebinding an existing one.
//!
//! ```toml
//! workspace_id = "wrk_1"
//! project_id = "proj_1"     # optional
//! sync_root = ".insomnia"   # optional
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default name of the reserved top-level directory.
pub const DEFAULT_SYNC_ROOT: &str = ".insomnia";

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The adapter cannot be built without a workspace to list from.
    #[error("cannot bind a sync session without a workspace id")]
    MissingWorkspace,

    /// Sync root must be a single, non-empty path segment.
    #[error("invalid sync root: {0:?}")]
    InvalidSyncRoot(String),
}

/// Binding parameters for one sync session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Workspace whose descendants make up the tree.
    pub workspace_id: String,
    /// Project every written workspace is re-parented under.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Reserved top-level directory owned by the adapter.
    #[serde(default = "default_sync_root")]
    pub sync_root: String,
}

fn default_sync_root() -> String {
    DEFAULT_SYNC_ROOT.to_string()
}

impl SyncConfig {
    /// Bind to a workspace and (optionally) its project, with the default root.
    pub fn new(workspace_id: impl Into<String>, project_id: Option<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            project_id,
            sync_root: default_sync_root(),
        }
    }

    /// Override the sync root.
    pub fn with_sync_root(mut self, sync_root: impl Into<String>) -> Self {
        self.sync_root = sync_root.into();
        self
    }

    /// Parse from TOML text and validate.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the binding parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workspace_id.trim().is_empty() {
            return Err(ConfigError::MissingWorkspace);
        }
        let root = self.sync_root.as_str();
        if root.is_empty() || root == "." || root == ".." || root.contains(['/', '\\']) {
            return Err(ConfigError::InvalidSyncRoot(self.sync_root.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::from_toml_str(r#"workspace_id = "wrk_1""#).unwrap();
        assert_eq!(config.workspace_id, "wrk_1");
        assert_eq!(config.project_id, None);
        assert_eq!(config.sync_root, DEFAULT_SYNC_ROOT);
    }

    #[test]
    fn test_full() {
        let config = SyncConfig::from_toml_str(
            r#"
            workspace_id = "wrk_1"
            project_id = "proj_1"
            sync_root = ".docs"
            "#,
        )
        .unwrap();
        assert_eq!(config.project_id.as_deref(), Some("proj_1"));
        assert_eq!(config.sync_root, ".docs");
    }

    #[test]
    fn test_missing_workspace() {
        assert!(matches!(
            SyncConfig::from_toml_str(r#"workspace_id = "  ""#),
            Err(ConfigError::MissingWorkspace)
        ));
        assert!(matches!(
            SyncConfig::from_toml_str(r#"project_id = "proj_1""#),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_invalid_sync_root() {
        let config = SyncConfig::new("wrk_1", None).with_sync_root("a/b");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSyncRoot(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docsync.toml");
        std::fs::write(&path, "workspace_id = \"wrk_9\"\n").unwrap();
        assert_eq!(SyncConfig::load(&path).unwrap().workspace_id, "wrk_9");
    }
}
