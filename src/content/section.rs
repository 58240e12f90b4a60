use super::{check_parent, check_path, Article, ContentNode, NodeKind, ParentLink, ReadContext};
use crate::error::SyncResult;
use crate::meta::MetadataRecord;
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A section inside a category.
#[derive(Debug, Clone)]
pub struct Section {
    path: PathBuf,
    parent: ParentLink,
    meta: MetadataRecord,
    articles: Vec<Article>,
}

impl Section {
    pub fn new(path: impl Into<PathBuf>, parent: ParentLink) -> SyncResult<Self> {
        let path = path.into();
        check_path(NodeKind::Section, &path)?;
        check_parent(NodeKind::Section, &path, &parent)?;
        Ok(Self {
            meta: MetadataRecord::unloaded(&path),
            path,
            parent,
            articles: Vec::new(),
        })
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn articles_mut(&mut self) -> &mut [Article] {
        &mut self.articles
    }

    pub async fn read(&mut self, ctx: &ReadContext) -> SyncResult<()> {
        self.meta = ctx.load_meta(NodeKind::Section, &self.path).await?;

        let link = ParentLink::new(NodeKind::Section, &self.path);
        let mut articles = ctx
            .list_children(&self.path)
            .await?
            .into_iter()
            .map(|dir| Article::new(dir, link.clone()))
            .collect::<SyncResult<Vec<_>>>()?;
        try_join_all(articles.iter_mut().map(|article| article.read(ctx))).await?;

        debug!(
            "Read section {} with {} articles",
            self.path.display(),
            articles.len()
        );
        self.articles = articles;
        Ok(())
    }
}

impl ContentNode for Section {
    fn kind(&self) -> NodeKind {
        NodeKind::Section
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
