use super::{check_path, ContentNode, NodeKind, ParentLink, ReadContext, Section};
use crate::error::SyncResult;
use crate::meta::MetadataRecord;
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level node of the content tree.
#[derive(Debug, Clone)]
pub struct Category {
    path: PathBuf,
    meta: MetadataRecord,
    sections: Vec<Section>,
}

impl Category {
    pub fn new(path: impl Into<PathBuf>) -> SyncResult<Self> {
        let path = path.into();
        check_path(NodeKind::Category, &path)?;
        Ok(Self {
            meta: MetadataRecord::unloaded(&path),
            path,
            sections: Vec::new(),
        })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    fn link(&self) -> ParentLink {
        ParentLink::new(NodeKind::Category, &self.path)
    }

    /// Load metadata, then every section subdirectory.
    pub async fn read(&mut self, ctx: &ReadContext) -> SyncResult<()> {
        self.meta = ctx.load_meta(NodeKind::Category, &self.path).await?;

        let link = self.link();
        let mut sections = ctx
            .list_children(&self.path)
            .await?
            .into_iter()
            .map(|dir| Section::new(dir, link.clone()))
            .collect::<SyncResult<Vec<_>>>()?;
        try_join_all(sections.iter_mut().map(|section| section.read(ctx))).await?;

        debug!(
            "Read category {} with {} sections",
            self.path.display(),
            sections.len()
        );
        self.sections = sections;
        Ok(())
    }
}

impl ContentNode for Category {
    fn kind(&self) -> NodeKind {
        NodeKind::Category
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn parent(&self) -> Option<&ParentLink> {
        None
    }

    fn meta(&self) -> &MetadataRecord {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut MetadataRecord {
        &mut self.meta
    }
}
