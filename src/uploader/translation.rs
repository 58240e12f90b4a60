use super::{
    copy_fields, create_payload, create_remote, needs_sync, push_updates, require_created,
    translation_payload, translation_target, RemoteSynchronizer, SyncContext,
};
use crate::api::{RemoteId, UpdateRequest};
use crate::content::{ContentNode, NodeKind, Translation};
use crate::error::SyncResult;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

const TRANSLATION_KEYS: &[&str] = &["draft"];

pub struct TranslationUploader<'a> {
    node: &'a mut Translation,
    article_id: RemoteId,
    ctx: &'a SyncContext,
}

impl<'a> TranslationUploader<'a> {
    pub fn new(node: &'a mut Translation, article_id: RemoteId, ctx: &'a SyncContext) -> Self {
        Self {
            node,
            article_id,
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
impl<'a> RemoteSynchronizer for TranslationUploader<'a> {
    fn kind(&self) -> NodeKind {
        NodeKind::Translation
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
        copy_fields(meta, TRANSLATION_KEYS, &mut payload);
        payload.insert("body".to_string(), Value::from(body));
        create_remote(
            self.ctx,
            NodeKind::Translation,
            self.node.meta_mut(),
            Some(self.article_id),
            payload,
        )
        .await
    }

    async fn sync(&mut self) -> SyncResult<bool> {
        let remote_id = require_created(self.node.meta())?;
        if !needs_sync(self.ctx, NodeKind::Translation, self.node.meta()) {
            return Ok(false);
        }
        let body = self.body()?;
        let meta = self.node.meta();
        let request = UpdateRequest {
            kind: NodeKind::Translation,
            remote_id,
            parent_id: Some(self.article_id),
            target: translation_target(meta)?,
            payload: translation_payload(meta, TRANSLATION_KEYS, Some(&body)),
        };
        push_updates(self.ctx, self.node.meta_mut(), vec![request]).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UpdateTarget;
    use crate::content::testutil::{read_ctx, write_file, write_node};
    use crate::content::ParentLink;
    use crate::uploader::testutil::{sync_ctx, RecordingApi};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_then_sync_addresses_article_locale() {
        let dir = tempdir().unwrap();
        let path = write_node(dir.path(), json!({"title": "Hallo", "locale": "de"}));
        write_file(&path.join("content.md"), "Inhalt");
        let mut node =
            Translation::new(path, ParentLink::new(NodeKind::Article, "docs/a/b")).unwrap();
        node.read(&read_ctx()).await.unwrap();

        let api = Arc::new(RecordingApi::default());
        let ctx = sync_ctx(api.clone());
        let mut uploader = TranslationUploader::new(&mut node, 77, &ctx);
        uploader.create().await.unwrap();
        assert!(uploader.sync().await.unwrap());
        assert!(!uploader.sync().await.unwrap());

        assert_eq!(api.creates()[0].parent_id, Some(77));
        let updates = api.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].parent_id, Some(77));
        assert_eq!(
            updates[0].target,
            UpdateTarget::Translation {
                locale: "de".to_string()
            }
        );
        assert_eq!(updates[0].payload["body"], json!("<p>Inhalt</p>\n"));
    }
}
