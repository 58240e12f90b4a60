use super::{
    copy_fields, create_payload, create_remote, needs_sync, push_updates, require_created,
    structural_updates, RemoteSynchronizer, SyncContext,
};
use crate::api::RemoteId;
use crate::content::{Article, ContentNode, NodeKind};
use crate::error::SyncResult;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// Settings that live on the article resource rather than its translation.
const RESOURCE_KEYS: &[&str] = &[
    "position",
    "label_names",
    "promoted",
    "comments_disabled",
    "user_segment_id",
    "permission_group_id",
];

const TRANSLATION_KEYS: &[&str] = &["draft"];

pub struct ArticleUploader<'a> {
    node: &'a mut Article,
    section_id: RemoteId,
    ctx: &'a SyncContext,
}

impl<'a> ArticleUploader<'a> {
    pub fn new(node: &'a mut Article, section_id: RemoteId, ctx: &'a SyncContext) -> Self {
        Self {
            node,
            section_id,
            ctx,
        }
    }

    fn body(&mut self) -> SyncResult<String> {
        Ok(self
            .node
            .convert_markdown(self.ctx.renderer.as_ref())?
            .to_string())
    }
}

#[async_trait]
impl<'a> RemoteSynchronizer for ArticleUploader<'a> {
    fn kind(&self) -> NodeKind {
        NodeKind::Article
    }

    fn path(&self) -> &Path {
        self.node.path()
    }

    fn remote_id(&self) -> Option<RemoteId> {
        self.node.meta().remote_id()
    }

    async fn create(&mut self) -> SyncResult<RemoteId> {
        let body = self.body()?;
        let meta = self.node.meta();
        let mut payload = create_payload(meta);
        copy_fields(meta, &["title"], &mut payload);
        copy_fields(meta, RESOURCE_KEYS, &mut payload);
        copy_fields(meta, TRANSLATION_KEYS, &mut payload);
        payload.insert("body".to_string(), Value::from(body));
        create_remote(
            self.ctx,
            NodeKind::Article,
            self.node.meta_mut(),
            Some(self.section_id),
            payload,
        )
        .await
    }

    async fn sync(&mut self) -> SyncResult<bool> {
        let remote_id = require_created(self.node.meta())?;
        if !needs_sync(self.ctx, NodeKind::Article, self.node.meta()) {
            return Ok(false);
        }
        let body = self.body()?;
        let requests = structural_updates(
            NodeKind::Article,
            remote_id,
            self.node.meta(),
            RESOURCE_KEYS,
            TRANSLATION_KEYS,
            Some(&body),
        )?;
        push_updates(self.ctx, self.node.meta_mut(), requests).await?;
        Ok(true)
    }
}
