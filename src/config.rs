//! Configuration for content discovery and the remote API.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the help-center base URL.
pub const ENV_URL: &str = "HELPCENTER_URL";
/// Environment variable holding the API user (email).
pub const ENV_USER: &str = "HELPCENTER_USER";
/// Environment variable holding the API token.
pub const ENV_TOKEN: &str = "HELPCENTER_TOKEN";

/// Upper bound for `concurrency`.
pub const MAX_CONCURRENCY: usize = tokio::sync::Semaphore::MAX_PERMITS;

/// Settings for reading and synchronizing a content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum node operations in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Name of the metadata file inside every node directory
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
    /// Extension of the primary content file for articles and translations
    #[serde(default = "default_content_extension")]
    pub content_extension: String,
    /// Extensions collected as article resources
    #[serde(default = "default_resource_extensions")]
    pub resource_extensions: Vec<String>,
    /// Include directories starting with '.'
    #[serde(default)]
    pub include_hidden: bool,
}

fn default_concurrency() -> usize {
    4
}

fn default_metadata_file() -> String {
    "meta.json".to_string()
}

fn default_content_extension() -> String {
    "md".to_string()
}

fn default_resource_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "svg", "pdf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            metadata_file: default_metadata_file(),
            content_extension: default_content_extension(),
            resource_extensions: default_resource_extensions(),
            include_hidden: false,
        }
    }
}

impl SyncConfig {
    /// Load a JSON config file.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| SyncError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> SyncResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check settings; run again after applying CLI overrides.
    pub fn validate(&self) -> SyncResult<()> {
        if self.concurrency == 0 {
            return Err(SyncError::config("concurrency must be at least 1"));
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(SyncError::config(format!(
                "concurrency must be at most {}",
                MAX_CONCURRENCY
            )));
        }
        if self.metadata_file.trim().is_empty() {
            return Err(SyncError::config("metadata_file must not be empty"));
        }
        if self.content_extension.trim().is_empty() {
            return Err(SyncError::config("content_extension must not be empty"));
        }
        Ok(())
    }
}

/// Credentials and endpoint for the remote API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub user: String,
    pub token: String,
}

impl ApiConfig {
    /// Build from values taken from flags or the environment. Every part is
    /// required; the error names the variable that would supply it.
    pub fn from_parts(
        base_url: Option<String>,
        user: Option<String>,
        token: Option<String>,
    ) -> SyncResult<Self> {
        let require = |value: Option<String>, name: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SyncError::config(format!("{} is not set", name)))
        };
        Ok(Self {
            base_url: require(base_url, ENV_URL)?,
            user: require(user, ENV_USER)?,
            token: require(token, ENV_TOKEN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.metadata_file, "meta.json");
        assert_eq!(config.content_extension, "md");
        assert_eq!(config.resource_extensions.len(), 6);
        assert!(!config.include_hidden);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("helpcenter-sync.json");
        std::fs::write(&path, r#"{"concurrency": 2}"#).unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.metadata_file, "meta.json");
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("helpcenter-sync.json");
        std::fs::write(&path, r#"{"concurrency": 0}"#).unwrap();

        assert!(matches!(SyncConfig::load(&path), Err(SyncError::Config(_))));
    }

    #[test]
    fn test_excessive_concurrency_rejected() {
        let config = SyncConfig {
            concurrency: usize::MAX,
            ..SyncConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = SyncConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(
            SyncConfig::load_or_default(None).unwrap(),
            SyncConfig::default()
        );
    }

    #[test]
    fn test_api_config_requires_every_part() {
        let err = ApiConfig::from_parts(
            Some("https://example.zendesk.com".to_string()),
            Some("me@example.com".to_string()),
            Some("  ".to_string()),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: HELPCENTER_TOKEN is not set"
        );
    }
}
