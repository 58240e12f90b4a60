//! The local content tree: categories own sections, sections own articles,
//! articles own translations.
//!
//! Every node exclusively owns its [`MetadataRecord`] and its children. The
//! link back to a parent is a [`ParentLink`] (kind + path), never an owning
//! handle, so the tree stays acyclic.

pub mod article;
pub mod category;
pub mod section;
pub mod translation;

pub use article::Article;
pub use category::Category;
pub use section::Section;
pub use translation::Translation;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::meta::{compute_content_hash, MetadataRecord, MetadataSchemas};
use crate::render::MarkdownRenderer;
use crate::storage::ContentStorage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The four kinds of content node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Category,
    Section,
    Article,
    Translation,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Category,
        NodeKind::Section,
        NodeKind::Article,
        NodeKind::Translation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Category => "category",
            NodeKind::Section => "section",
            NodeKind::Article => "article",
            NodeKind::Translation => "translation",
        }
    }

    /// Kind a node of this kind must hang under, if any.
    pub fn parent_kind(self) -> Option<NodeKind> {
        match self {
            NodeKind::Category => None,
            NodeKind::Section => Some(NodeKind::Category),
            NodeKind::Article => Some(NodeKind::Section),
            NodeKind::Translation => Some(NodeKind::Article),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Non-owning reference from a child to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    kind: NodeKind,
    path: PathBuf,
}

impl ParentLink {
    pub fn new(kind: NodeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Check that `parent` is the right kind for a new `kind` node at `path`.
fn check_parent(kind: NodeKind, path: &Path, parent: &ParentLink) -> SyncResult<()> {
    match kind.parent_kind() {
        Some(expected) if expected == parent.kind => Ok(()),
        Some(expected) => Err(SyncError::invalid_node(format!(
            "{} {} must belong to a {}, got a {}",
            kind,
            path.display(),
            expected,
            parent.kind
        ))),
        None => Err(SyncError::invalid_node(format!(
            "{} {} cannot have a parent",
            kind,
            path.display()
        ))),
    }
}

fn check_path(kind: NodeKind, path: &Path) -> SyncResult<()> {
    if path.as_os_str().is_empty() {
        return Err(SyncError::invalid_node(format!(
            "{} path must not be empty",
            kind
        )));
    }
    Ok(())
}

/// Shared view over every content node kind.
pub trait ContentNode: Send + Sync {
    fn kind(&self) -> NodeKind;
    fn path(&self) -> &Path;
    fn parent(&self) -> Option<&ParentLink>;
    fn meta(&self) -> &MetadataRecord;
    fn meta_mut(&mut self) -> &mut MetadataRecord;
}

/// Collaborators and settings needed to read nodes from storage.
#[derive(Clone)]
pub struct ReadContext {
    pub storage: Arc<dyn ContentStorage>,
    pub schemas: Arc<MetadataSchemas>,
    pub content_extension: String,
    pub resource_extensions: Vec<String>,
}

impl ReadContext {
    pub fn new(
        storage: Arc<dyn ContentStorage>,
        schemas: Arc<MetadataSchemas>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            storage,
            schemas,
            content_extension: config.content_extension.clone(),
            resource_extensions: config.resource_extensions.clone(),
        }
    }

    async fn load_meta(&self, kind: NodeKind, dir: &Path) -> SyncResult<MetadataRecord> {
        MetadataRecord::load(self.storage.as_ref(), self.schemas.for_kind(kind), dir).await
    }

    async fn list_children(&self, dir: &Path) -> SyncResult<Vec<PathBuf>> {
        self.storage
            .list_subdirectories(dir)
            .await
            .map_err(|e| SyncError::read(dir, e))
    }
}

/// Markdown source of an article or translation, rendered at most once.
#[derive(Debug, Clone, Default)]
pub struct MarkdownBody {
    path: Option<PathBuf>,
    source: Option<String>,
    html: Option<String>,
}

impl MarkdownBody {
    /// Locate the single content file in `dir` and read it. Returns the
    /// digest of the source.
    async fn load(&mut self, ctx: &ReadContext, dir: &Path) -> SyncResult<String> {
        let extensions = std::slice::from_ref(&ctx.content_extension);
        let mut found = ctx
            .storage
            .find_files_of_types(dir, extensions)
            .await
            .map_err(|e| SyncError::read(dir, e))?;
        let path = match found.len() {
            0 => {
                return Err(SyncError::ContentNotFound {
                    path: dir.to_path_buf(),
                })
            }
            1 => found.remove(0),
            _ => {
                return Err(SyncError::AmbiguousContent {
                    path: dir.to_path_buf(),
                    found,
                })
            }
        };

        let source = ctx
            .storage
            .read_to_string(&path)
            .await
            .map_err(|e| SyncError::read(&path, e))?;
        let digest = compute_content_hash(source.as_bytes());
        self.path = Some(path);
        self.source = Some(source);
        self.html = None;
        Ok(digest)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_rendered(&self) -> bool {
        self.html.is_some()
    }

    /// Render the body, reusing the cached HTML after the first call.
    fn convert(&mut self, renderer: &dyn MarkdownRenderer, node: &Path) -> SyncResult<&str> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| SyncError::ContentNotRead {
                path: node.to_path_buf(),
            })?;
        Ok(self
            .html
            .get_or_insert_with(|| renderer.render(source))
            .as_str())
    }
}


#[cfg(test)]
pub(crate) mod testutil;
