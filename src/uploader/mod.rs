//! Remote synchronizers: turn a node's metadata into create and update calls.
//!
//! Each synchronizer borrows its node for the duration of one operation and
//! receives its collaborators through [`SyncContext`]. Whether to call
//! `create` is decided by the orchestrator; synchronizers do not guard
//! against a second create.

mod article;
mod category;
mod section;
mod translation;

pub use article::ArticleUploader;
pub use category::CategoryUploader;
pub use section::SectionUploader;
pub use translation::TranslationUploader;

use crate::api::{CreateRequest, HelpCenterApi, RemoteId, UpdateRequest, UpdateTarget};
use crate::content::NodeKind;
use crate::error::{SyncError, SyncResult};
use crate::meta::{ChangeDetector, MetadataRecord};
use crate::render::MarkdownRenderer;
use crate::storage::ContentStorage;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Collaborators shared by every synchronizer.
#[derive(Clone)]
pub struct SyncContext {
    pub api: Arc<dyn HelpCenterApi>,
    pub storage: Arc<dyn ContentStorage>,
    pub renderer: Arc<dyn MarkdownRenderer>,
    pub detector: Arc<dyn ChangeDetector>,
}

/// Create and update operations for one content node.
#[async_trait]
pub trait RemoteSynchronizer: Send {
    fn kind(&self) -> NodeKind;

    fn path(&self) -> &Path;

    fn remote_id(&self) -> Option<RemoteId>;

    /// Create the remote resource and persist the returned id.
    async fn create(&mut self) -> SyncResult<RemoteId>;

    /// Push local changes. Returns `false` without touching the network when
    /// nothing changed since the last sync.
    async fn sync(&mut self) -> SyncResult<bool>;
}

/// Copy the listed fields that are present in `meta` into `payload`.
fn copy_fields(meta: &MetadataRecord, keys: &[&str], payload: &mut Map<String, Value>) {
    for key in keys {
        if let Some(value) = meta.get(key) {
            payload.insert((*key).to_string(), value.clone());
        }
    }
}

/// Fields every create request carries.
fn create_payload(meta: &MetadataRecord) -> Map<String, Value> {
    let mut payload = Map::new();
    copy_fields(meta, &["locale"], &mut payload);
    payload
}

/// Structural settings addressed to the resource itself.
fn resource_payload(meta: &MetadataRecord, keys: &[&str]) -> Map<String, Value> {
    let mut payload = Map::new();
    copy_fields(meta, keys, &mut payload);
    payload
}

/// Localized fields addressed to the resource's translation.
fn translation_payload(
    meta: &MetadataRecord,
    extra_keys: &[&str],
    body: Option<&str>,
) -> Map<String, Value> {
    let mut payload = Map::new();
    copy_fields(meta, &["title", "locale"], &mut payload);
    copy_fields(meta, extra_keys, &mut payload);
    if let Some(body) = body {
        payload.insert("body".to_string(), Value::from(body));
    }
    payload
}

fn translation_target(meta: &MetadataRecord) -> SyncResult<UpdateTarget> {
    let locale = meta.locale().ok_or_else(|| {
        SyncError::invalid_node(format!("{} has no locale", meta.dir().display()))
    })?;
    Ok(UpdateTarget::Translation {
        locale: locale.to_string(),
    })
}

fn require_created(meta: &MetadataRecord) -> SyncResult<RemoteId> {
    meta.remote_id().ok_or_else(|| SyncError::NotCreated {
        path: meta.dir().to_path_buf(),
    })
}

/// Issue a create request and backfill the returned id.
async fn create_remote(
    ctx: &SyncContext,
    kind: NodeKind,
    meta: &mut MetadataRecord,
    parent_id: Option<RemoteId>,
    payload: Map<String, Value>,
) -> SyncResult<RemoteId> {
    let created = ctx
        .api
        .create(CreateRequest {
            kind,
            parent_id,
            payload,
        })
        .await?;
    meta.set_remote_id(created.id);
    meta.write(ctx.storage.as_ref()).await?;
    info!("Created {} {} as {}", kind, meta.dir().display(), created.id);
    Ok(created.id)
}

/// Whether `meta` needs pushing. Logs and returns `false` when unchanged.
fn needs_sync(ctx: &SyncContext, kind: NodeKind, meta: &MetadataRecord) -> bool {
    let changed = meta.is_changed(ctx.detector.as_ref());
    if !changed {
        debug!("{} {} unchanged", kind, meta.dir().display());
    }
    changed
}

/// Send updates in order, then record the synced fingerprint.
async fn push_updates(
    ctx: &SyncContext,
    meta: &mut MetadataRecord,
    requests: Vec<UpdateRequest>,
) -> SyncResult<()> {
    for request in requests {
        let kind = request.kind;
        ctx.api.update(request).await?;
        debug!("Updated {} {}", kind, meta.dir().display());
    }
    meta.mark_synced(ctx.detector.as_ref());
    meta.write(ctx.storage.as_ref()).await?;
    info!("Synced {}", meta.dir().display());
    Ok(())
}

/// Resource update (when there is anything structural) plus translation update.
fn structural_updates(
    kind: NodeKind,
    remote_id: RemoteId,
    meta: &MetadataRecord,
    resource_keys: &[&str],
    translation_keys: &[&str],
    body: Option<&str>,
) -> SyncResult<Vec<UpdateRequest>> {
    let mut requests = Vec::with_capacity(2);
    let resource = resource_payload(meta, resource_keys);
    if !resource.is_empty() {
        requests.push(UpdateRequest {
            kind,
            remote_id,
            parent_id: None,
            target: UpdateTarget::Resource,
            payload: resource,
        });
    }
    requests.push(UpdateRequest {
        kind,
        remote_id,
        parent_id: None,
        target: translation_target(meta)?,
        payload: translation_payload(meta, translation_keys, body),
    });
    Ok(requests)
}

#[cfg(test)]
pub(crate) mod testutil;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: Value) -> MetadataRecord {
        MetadataRecord::from_parsed("docs/a", value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_structural_updates_skip_empty_resource() {
        let m = meta(json!({"title": "A", "locale": "en-us"}));
        let requests = structural_updates(NodeKind::Category, 5, &m, &["position"], &[], None).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].target,
            UpdateTarget::Translation {
                locale: "en-us".to_string()
            }
        );
        assert_eq!(requests[0].payload, *json!({"title": "A", "locale": "en-us"}).as_object().unwrap());
    }

    #[test]
    fn test_structural_updates_with_position() {
        let m = meta(json!({"title": "A", "locale": "en-us", "position": 2}));
        let requests =
            structural_updates(NodeKind::Section, 5, &m, &["position"], &[], Some("<p>x</p>"))
                .unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].target, UpdateTarget::Resource);
        assert_eq!(requests[0].payload["position"], json!(2));
        assert_eq!(requests[1].payload["body"], json!("<p>x</p>"));
    }

    #[test]
    fn test_require_created() {
        let m = meta(json!({"title": "A", "locale": "en-us"}));
        assert!(matches!(
            require_created(&m),
            Err(SyncError::NotCreated { .. })
        ));
    }
}
