use super::{check_parent, check_path, ContentNode, MarkdownBody, NodeKind, ParentLink, ReadContext};
use crate::error::SyncResult;
use crate::meta::MetadataRecord;
use crate::render::MarkdownRenderer;
use std::path::{Path, PathBuf};

/// A localized variant of an article. Leaf of the tree.
#[derive(Debug, Clone)]
pub struct Translation {
    path: PathBuf,
    parent: ParentLink,
    meta: MetadataRecord,
    body: MarkdownBody,
}

impl Translation {
    pub fn new(path: impl Into<PathBuf>, parent: ParentLink) -> SyncResult<Self> {
        let path = path.into();
        check_path(NodeKind::Translation, &path)?;
        check_parent(NodeKind::Translation, &path, &parent)?;
        Ok(Self {
            meta: MetadataRecord::unloaded(&path),
            path,
            parent,
            body: MarkdownBody::default(),
        })
    }

    pub fn content_path(&self) -> Option<&Path> {
        self.body.path()
    }

    pub fn convert_markdown(&mut self, renderer: &dyn MarkdownRenderer) -> SyncResult<&str> {
        self.body.convert(renderer, &self.path)
    }

    pub async fn read(&mut self, ctx: &ReadContext) -> SyncResult<()> {
        self.meta = ctx.load_meta(NodeKind::Translation, &self.path).await?;
        let digest = self.body.load(ctx, &self.path).await?;
        self.meta.attach_content_digest(digest);
        Ok(())
    }
}

impl ContentNode for Translation {
    fn kind(&self) -> NodeKind {
        NodeKind::Translation
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn parent(&self) -> Option<&ParentLink> {
        Some(&self.parent)
    }

    fn meta(&self) -> &MetadataRecord {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut MetadataRecord {
        &mut self.meta
    }
}
