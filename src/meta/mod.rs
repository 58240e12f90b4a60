//! Parsed metadata records and their synchronization bookkeeping.
//!
//! A record is produced by applying a node kind's root [`Dictionary`] to the
//! raw metadata file. The remote identifier and last-synced fingerprint are
//! persisted in the same file under [`REMOTE_ID_KEY`] and [`FINGERPRINT_KEY`],
//! but are kept apart from the content fields so they never feed into the
//! fingerprint itself.
//!
//! Persisting writes the validated values, not the raw file: titles are
//! trimmed, locales lower-cased, and keys come out in sorted order. After the
//! first create or sync, the metadata file holds the normalized form.

pub mod fingerprint;
pub mod schemas;

pub use fingerprint::{compute_content_hash, AlwaysChanged, ChangeDetector, ContentHash};
pub use schemas::MetadataSchemas;

use crate::api::RemoteId;
use crate::error::{SyncError, SyncResult};
use crate::storage::ContentStorage;
use helpcenter_schema::Dictionary;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key under which the remote identifier is persisted.
pub const REMOTE_ID_KEY: &str = "remote_id";
/// Key under which the last-synced fingerprint is persisted.
pub const FINGERPRINT_KEY: &str = "fingerprint";

/// Validated metadata for one content node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    dir: PathBuf,
    fields: Map<String, Value>,
    remote_id: Option<RemoteId>,
    fingerprint: Option<String>,
    content_digest: Option<String>,
}

impl MetadataRecord {
    /// Empty record for a node that has not been read yet.
    pub fn unloaded(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Read and validate the metadata file in `dir`.
    pub async fn load(
        storage: &dyn ContentStorage,
        schema: &Dictionary,
        dir: &Path,
    ) -> SyncResult<Self> {
        let raw = storage.read_metadata_file(dir).await?;
        let parsed = schema
            .parse(&raw)
            .map_err(|e| SyncError::schema(dir, e))?;
        Ok(Self::from_parsed(dir, parsed))
    }

    /// Split bookkeeping keys out of an already validated mapping.
    pub fn from_parsed(dir: impl Into<PathBuf>, mut parsed: Map<String, Value>) -> Self {
        let remote_id = parsed.remove(REMOTE_ID_KEY).and_then(|v| v.as_u64());
        let fingerprint = parsed
            .remove(FINGERPRINT_KEY)
            .and_then(|v| v.as_str().map(str::to_string));
        Self {
            dir: dir.into(),
            fields: parsed,
            remote_id,
            fingerprint,
            content_digest: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Content fields, without bookkeeping keys.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get_str("title")
    }

    pub fn locale(&self) -> Option<&str> {
        self.get_str("locale")
    }

    pub fn position(&self) -> Option<i64> {
        self.get("position").and_then(Value::as_i64)
    }

    pub fn remote_id(&self) -> Option<RemoteId> {
        self.remote_id
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn content_digest(&self) -> Option<&str> {
        self.content_digest.as_deref()
    }

    /// Set a content field. Bookkeeping keys are routed to their own slots.
    pub fn update(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match key.as_str() {
            REMOTE_ID_KEY => self.remote_id = value.as_u64(),
            FINGERPRINT_KEY => self.fingerprint = value.as_str().map(str::to_string),
            _ => {
                self.fields.insert(key, value);
            }
        }
    }

    pub fn set_remote_id(&mut self, id: RemoteId) {
        self.remote_id = Some(id);
    }

    /// Attach the digest of the node's body so body edits count as changes.
    pub fn attach_content_digest(&mut self, digest: impl Into<String>) {
        self.content_digest = Some(digest.into());
    }

    pub fn current_fingerprint(&self, detector: &dyn ChangeDetector) -> String {
        detector.fingerprint(&self.fields, self.content_digest())
    }

    /// Whether local content drifted from the last synchronized state.
    pub fn is_changed(&self, detector: &dyn ChangeDetector) -> bool {
        detector.is_changed(self.fingerprint(), &self.fields, self.content_digest())
    }

    /// Record the current content as synchronized.
    pub fn mark_synced(&mut self, detector: &dyn ChangeDetector) {
        self.fingerprint = Some(self.current_fingerprint(detector));
    }

    /// Serialized form written back to the metadata file.
    pub fn to_json(&self) -> Value {
        let mut out = self.fields.clone();
        if let Some(id) = self.remote_id {
            out.insert(REMOTE_ID_KEY.to_string(), Value::from(id));
        }
        if let Some(fingerprint) = &self.fingerprint {
            out.insert(FINGERPRINT_KEY.to_string(), Value::from(fingerprint.clone()));
        }
        Value::Object(out)
    }

    /// Persist the record to its metadata file.
    pub async fn write(&self, storage: &dyn ContentStorage) -> SyncResult<()> {
        storage.write_metadata_file(&self.dir, &self.to_json()).await?;
        debug!("Persisted metadata for {}", self.dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::NodeKind;
    use crate::storage::FsStorage;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(value: Value) -> MetadataRecord {
        MetadataRecord::from_parsed("docs", value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_bookkeeping_keys_are_split_out() {
        let meta = record(json!({
            "title": "A",
            "locale": "en-us",
            "remote_id": 7,
            "fingerprint": "abc"
        }));
        assert_eq!(meta.remote_id(), Some(7));
        assert_eq!(meta.fingerprint(), Some("abc"));
        assert!(meta.get(REMOTE_ID_KEY).is_none());
        assert_eq!(meta.fields().len(), 2);
    }

    #[test]
    fn test_remote_id_does_not_affect_change_signal() {
        let mut meta = record(json!({"title": "A", "locale": "en-us"}));
        meta.mark_synced(&ContentHash);
        meta.set_remote_id(12);
        assert!(!meta.is_changed(&ContentHash));

        meta.update("title", json!("B"));
        assert!(meta.is_changed(&ContentHash));
    }

    #[test]
    fn test_content_digest_marks_changed() {
        let mut meta = record(json!({"title": "A", "locale": "en-us"}));
        meta.attach_content_digest("one");
        meta.mark_synced(&ContentHash);

        meta.attach_content_digest("two");
        assert!(meta.is_changed(&ContentHash));
    }

    #[test]
    fn test_update_routes_bookkeeping_keys() {
        let mut meta = record(json!({"title": "A", "locale": "en-us"}));
        meta.update(REMOTE_ID_KEY, json!(5));
        assert_eq!(meta.remote_id(), Some(5));
        assert!(meta.get(REMOTE_ID_KEY).is_none());
    }

    #[tokio::test]
    async fn test_write_then_load_revalidates() {
        let dir = tempdir().unwrap();
        let storage = FsStorage::new("meta.json");
        let schemas = MetadataSchemas::new().unwrap();

        let mut meta = MetadataRecord::from_parsed(
            dir.path(),
            json!({"title": "FAQ", "locale": "en-us", "position": 2})
                .as_object()
                .cloned()
                .unwrap(),
        );
        meta.set_remote_id(100);
        meta.mark_synced(&ContentHash);
        meta.write(&storage).await.unwrap();

        let loaded = MetadataRecord::load(
            &storage,
            schemas.for_kind(NodeKind::Category),
            dir.path(),
        )
        .await
        .unwrap();
        assert_eq!(loaded, meta);
        assert!(!loaded.is_changed(&ContentHash));
    }

    #[tokio::test]
    async fn test_write_stores_normalized_values() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("meta.json"),
            r#"{"title": "  FAQ ", "locale": "EN-US"}"#,
        )
        .unwrap();
        let storage = FsStorage::new("meta.json");
        let schemas = MetadataSchemas::new().unwrap();

        let mut meta = MetadataRecord::load(
            &storage,
            schemas.for_kind(NodeKind::Category),
            dir.path(),
        )
        .await
        .unwrap();
        meta.set_remote_id(3);
        meta.write(&storage).await.unwrap();

        let stored: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("meta.json")).unwrap())
                .unwrap();
        assert_eq!(
            stored,
            json!({"locale": "en-us", "remote_id": 3, "title": "FAQ"})
        );
    }

    #[tokio::test]
    async fn test_load_reports_schema_error_with_path() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("meta.json"), r#"{"title": "A"}"#).unwrap();
        let storage = FsStorage::new("meta.json");
        let schemas = MetadataSchemas::new().unwrap();

        let err = MetadataRecord::load(
            &storage,
            schemas.for_kind(NodeKind::Section),
            dir.path(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SyncError::Schema { .. }));
        assert!(err.to_string().ends_with("Missing required field: locale"));
    }
}
