//! Fixture helpers for content tree tests.

use super::ReadContext;
use crate::config::SyncConfig;
use crate::meta::MetadataSchemas;
use crate::storage::FsStorage;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn read_ctx() -> ReadContext {
    let config = SyncConfig::default();
    ReadContext::new(
        Arc::new(FsStorage::from_config(&config)),
        Arc::new(MetadataSchemas::new().unwrap()),
        &config,
    )
}

/// Create `dir` with a `meta.json` holding `meta`.
pub fn write_node(dir: &Path, meta: Value) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("meta.json"), meta.to_string()).unwrap();
    dir.to_path_buf()
}

pub fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).unwrap();
}
