use super::{
    check_parent, check_path, ContentNode, MarkdownBody, NodeKind, ParentLink, ReadContext,
    Translation,
};
use crate::error::{SyncError, SyncResult};
use crate::meta::MetadataRecord;
use crate::render::MarkdownRenderer;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An article: one Markdown body, optional binary resources, and translations.
#[derive(Debug, Clone)]
pub struct Article {
    path: PathBuf,
    parent: ParentLink,
    meta: MetadataRecord,
    body: MarkdownBody,
    /// Resource files keyed by lower-cased extension, in discovery order.
    resources: BTreeMap<String, Vec<PathBuf>>,
    translations: Vec<Translation>,
}

impl Article {
    pub fn new(path: impl Into<PathBuf>, parent: ParentLink) -> SyncResult<Self> {
        let path = path.into();
        check_path(NodeKind::Article, &path)?;
        check_parent(NodeKind::Article, &path, &parent)?;
        Ok(Self {
            meta: MetadataRecord::unloaded(&path),
            path,
            parent,
            body: MarkdownBody::default(),
            resources: BTreeMap::new(),
            translations: Vec::new(),
        })
    }

    pub fn content_path(&self) -> Option<&Path> {
        self.body.path()
    }

    pub fn resources(&self) -> &BTreeMap<String, Vec<PathBuf>> {
        &self.resources
    }

    pub fn translations(&self) -> &[Translation] {
        &self.translations
    }

    pub fn translations_mut(&mut self) -> &mut [Translation] {
        &mut self.translations
    }

    pub fn is_rendered(&self) -> bool {
        self.body.is_rendered()
    }

    /// HTML for the article body; rendered on first call, cached afterwards.
    pub fn convert_markdown(&mut self, renderer: &dyn MarkdownRenderer) -> SyncResult<&str> {
        self.body.convert(renderer, &self.path)
    }

    pub async fn read(&mut self, ctx: &ReadContext) -> SyncResult<()> {
        self.meta = ctx.load_meta(NodeKind::Article, &self.path).await?;
        let digest = self.body.load(ctx, &self.path).await?;
        self.meta.attach_content_digest(digest);
        self.resources = self.collect_resources(ctx).await?;

        let link = ParentLink::new(NodeKind::Article, &self.path);
        let mut translations = ctx
            .list_children(&self.path)
            .await?
            .into_iter()
            .map(|dir| Translation::new(dir, link.clone()))
            .collect::<SyncResult<Vec<_>>>()?;
        try_join_all(translations.iter_mut().map(|t| t.read(ctx))).await?;

        debug!(
            "Read article {} with {} translations",
            self.path.display(),
            translations.len()
        );
        self.translations = translations;
        Ok(())
    }

    async fn collect_resources(
        &self,
        ctx: &ReadContext,
    ) -> SyncResult<BTreeMap<String, Vec<PathBuf>>> {
        let mut resources: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        if ctx.resource_extensions.is_empty() {
            return Ok(resources);
        }
        let files = ctx
            .storage
            .find_files_of_types(&self.path, &ctx.resource_extensions)
            .await
            .map_err(|e| SyncError::read(&self.path, e))?;
        for file in files {
            let ext = file
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            resources.entry(ext).or_default().push(file);
        }
        Ok(resources)
    }
}

impl ContentNode for Article {
    fn kind(&self) -> NodeKind {
        NodeKind::Article
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
