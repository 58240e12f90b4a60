use super::{
    copy_fields, create_payload, create_remote, needs_sync, push_updates, require_created,
    structural_updates, RemoteSynchronizer, SyncContext,
};
use crate::api::RemoteId;
use crate::content::{Category, ContentNode, NodeKind};
use crate::error::SyncResult;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

const STRUCTURAL_KEYS: &[&str] = &["position", "description"];

pub struct CategoryUploader<'a> {
    node: &'a mut Category,
    ctx: &'a SyncContext,
}

impl<'a> CategoryUploader<'a> {
    pub fn new(node: &'a mut Category, ctx: &'a SyncContext) -> Self {
        Self { node, ctx }
    }
}

#[async_trait]
impl<'a> RemoteSynchronizer for CategoryUploader<'a> {
    fn kind(&self) -> NodeKind {
        NodeKind::Category
    }

    fn path(&self) -> &Path {
        self.node.path()
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.node.meta().remote_id()
    }

    async fn create(&mut self) -> SyncResult<RemoteId> {
        let meta = self.node.meta();
        let mut payload = create_payload(meta);
        if let Some(title) = meta.title() {
            payload.insert("name".to_string(), Value::from(title));
        }
        copy_fields(meta, STRUCTURAL_KEYS, &mut payload);
        create_remote(self.ctx, NodeKind::Category, self.node.meta_mut(), None, payload).await
    }

    async fn sync(&mut self) -> SyncResult<bool> {
        let meta = self.node.meta();
        let remote_id = require_created(meta)?;
        if !needs_sync(self.ctx, NodeKind::Category, meta) {
            return Ok(false);
        }
        let requests =
            structural_updates(NodeKind::Category, remote_id, meta, STRUCTURAL_KEYS, &[], None)?;
        push_updates(self.ctx, self.node.meta_mut(), requests).await?;
        Ok(true)
    }
}
