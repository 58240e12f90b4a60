//! Unified error type for loading and synchronizing content.

use crate::api::ApiError;
use helpcenter_schema::SchemaError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading the content tree or pushing it remotely.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Metadata failed schema validation
    #[error("{}: {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    /// No metadata file in a node directory
    #[error("Missing metadata file in {}", path.display())]
    MissingMetadata { path: PathBuf },

    /// Metadata file exists but is not valid JSON
    #[error("{}: invalid JSON: {source}", path.display())]
    MalformedMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A node's directory or one of its files could not be read
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No content file where one is expected
    #[error("No markdown files found in {}", path.display())]
    ContentNotFound { path: PathBuf },

    /// More than one primary content file
    #[error("Found more than 1 markdown file in {}: {}", path.display(), display_paths(found))]
    AmbiguousContent { path: PathBuf, found: Vec<PathBuf> },

    /// Content was requested before the node was read
    #[error("No path to markdown content for {}; read the node first", path.display())]
    ContentNotRead { path: PathBuf },

    /// An update was attempted on a node that has never been created remotely
    #[error("{} has not been created remotely", path.display())]
    NotCreated { path: PathBuf },

    /// Node construction failed (bad path, wrong parent kind)
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Remote API failure, passed through unmodified
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The run was cancelled before this node started
    #[error("Synchronization cancelled")]
    Cancelled,

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Attach the originating node path to a schema failure.
    pub fn schema(path: impl AsRef<Path>, source: SchemaError) -> Self {
        Self::Schema {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Attach the file or directory that failed to read.
    pub fn read(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Read {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an invalid node error
    pub fn invalid_node(msg: impl Into<String>) -> Self {
        Self::InvalidNode(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for content and sync operations
pub type SyncResult<T> = Result<T, SyncError>;
