//! Storage access for the content tree.
//!
//! Directory enumeration, file discovery and metadata persistence sit behind
//! [`ContentStorage`] so the content nodes never touch the filesystem
//! directly. [`FsStorage`] is the tokio-backed implementation.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Storage operations the content tree consumes.
#[async_trait]
pub trait ContentStorage: Send + Sync {
    /// Immediate subdirectories of `path`, in discovery order.
    async fn list_subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Files directly inside `path` whose extension is one of `extensions`
    /// (case-insensitive, without the leading dot), in discovery order.
    async fn find_files_of_types(
        &self,
        path: &Path,
        extensions: &[String],
    ) -> io::Result<Vec<PathBuf>>;

    /// Raw metadata of the node stored in `dir`.
    ///
    /// Fails with [`SyncError::MissingMetadata`] if there is no metadata file.
    async fn read_metadata_file(&self, dir: &Path) -> SyncResult<Value>;

    /// Persist metadata for the node stored in `dir`.
    async fn write_metadata_file(&self, dir: &Path, metadata: &Value) -> io::Result<()>;

    async fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// [`ContentStorage`] over the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStorage {
    metadata_file: String,
    include_hidden: bool,
}

impl FsStorage {
    pub fn new(metadata_file: impl Into<String>) -> Self {
        Self {
            metadata_file: metadata_file.into(),
            include_hidden: false,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            metadata_file: config.metadata_file.clone(),
            include_hidden: config.include_hidden,
        }
    }

    pub fn metadata_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.metadata_file)
    }

    fn is_visible(&self, name: &str) -> bool {
        self.include_hidden || !name.starts_with('.')
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[async_trait]
impl ContentStorage for FsStorage {
    async fn list_subdirectories(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path).await?;
        let mut dirs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !self.is_visible(name) {
                continue;
            }
            if entry.file_type().await?.is_dir() {
                dirs.push(entry.path());
            }
        }
        // read_dir order is platform-dependent
        dirs.sort();
        Ok(dirs)
    }

    async fn find_files_of_types(
        &self,
        path: &Path,
        extensions: &[String],
    ) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(path).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_path = entry.path();
            if entry.file_type().await?.is_file() && has_extension(&file_path, extensions) {
                files.push(file_path);
            }
        }
        files.sort();
        Ok(files)
    }

    async fn read_metadata_file(&self, dir: &Path) -> SyncResult<Value> {
        let path = self.metadata_path(dir);
        match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|source| SyncError::MalformedMetadata { path, source }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SyncError::MissingMetadata {
                path: dir.to_path_buf(),
            }),
            Err(e) => Err(SyncError::read(&path, e)),
        }
    }

    async fn write_metadata_file(&self, dir: &Path, metadata: &Value) -> io::Result<()> {
        let path = self.metadata_path(dir);
        let tmp_path = dir.join(format!(".{}.tmp", self.metadata_file));
        let mut content = serde_json::to_vec_pretty(metadata)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        content.push(b'\n');

        let written = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(&content).await?;
            file.sync_all().await?;
            Ok::<_, io::Error>(())
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        fs::rename(&tmp_path, &path).await?;
        debug!("Wrote metadata to {}", path.display());
        Ok(())
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).await
    }
}
