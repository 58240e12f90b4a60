//! Sync orchestrator: walks the content tree parent-first and drives each
//! node through `Unsynced -> Created -> Synced`.
//!
//! Siblings run concurrently. A shared semaphore bounds how many node
//! operations are in flight; a permit is held only for one node's create and
//! sync, never while its children run. A failed node abandons its subtree
//! without affecting siblings.

mod report;

pub use report::{NodeOutcome, NodeReport, ReportCounts, SkipReason, SyncReport, SyncState};

use crate::api::RemoteId;
use crate::config::MAX_CONCURRENCY;
use crate::content::{Article, Category, ContentNode, NodeKind, ReadContext, Section, Translation};
use crate::error::{SyncError, SyncResult};
use crate::uploader::{
    ArticleUploader, CategoryUploader, RemoteSynchronizer, SectionUploader, SyncContext,
    TranslationUploader,
};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct Orchestrator {
    ctx: SyncContext,
    limit: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(ctx: SyncContext, concurrency: usize) -> Self {
        Self {
            ctx,
            limit: Arc::new(Semaphore::new(concurrency.clamp(1, MAX_CONCURRENCY))),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop scheduling new nodes once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Read and validate every category under `root`.
    ///
    /// Failing to list `root` is fatal. A category that fails to read is
    /// recorded in the report and left out of the returned trees.
    pub async fn load_root(
        ctx: &ReadContext,
        root: &Path,
    ) -> SyncResult<(Vec<Category>, SyncReport)> {
        let dirs = ctx.storage.list_subdirectories(root).await?;
        info!("Loading {} categories from {}", dirs.len(), root.display());

        let results = join_all(dirs.into_iter().map(|dir| async move {
            let result = async {
                let mut category = Category::new(&dir)?;
                category.read(ctx).await?;
                Ok::<_, SyncError>(category)
            }
            .await;
            (dir, result)
        }))
        .await;

        let mut report = SyncReport::new();
        let mut categories = Vec::new();
        for (dir, result) in results {
            match result {
                Ok(category) => {
                    record_valid(&category, &mut report);
                    categories.push(category);
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", dir.display(), e);
                    report.push(NodeReport::failed(NodeKind::Category, &dir, e.to_string()));
                }
            }
        }
        Ok((categories, report.finish()))
    }

    /// Synchronize every category tree and report per-node outcomes.
    pub async fn run(&self, categories: &mut [Category]) -> SyncReport {
        let mut report = SyncReport::new();
        info!("Synchronizing {} categories", categories.len());

        let results = join_all(categories.iter_mut().map(|c| self.sync_category(c))).await;
        for nodes in results {
            report.extend(nodes);
        }

        let report = report.finish();
        let counts = report.counts();
        info!(
            "Sync finished: {} created, {} updated, {} unchanged, {} failed, {} skipped",
            counts.created, counts.updated, counts.unchanged, counts.failed, counts.skipped
        );
        report
    }

    async fn sync_category(&self, category: &mut Category) -> Vec<NodeReport> {
        let node = self.step(CategoryUploader::new(category, &self.ctx)).await;
        let mut reports = Vec::new();
        match node.ready_id() {
            Some(id) => {
                let children = join_all(
                    category
                        .sections_mut()
                        .iter_mut()
                        .map(|s| self.sync_section(s, id)),
                )
                .await;
                reports.push(node);
                reports.extend(children.into_iter().flatten());
            }
            None => {
                let reason = node.skip_reason();
                reports.push(node);
                for section in category.sections() {
                    skip_section(section, &reason, &mut reports);
                }
            }
        }
        reports
    }

    async fn sync_section(&self, section: &mut Section, category_id: RemoteId) -> Vec<NodeReport> {
        let node = self
            .step(SectionUploader::new(section, category_id, &self.ctx))
            .await;
        let mut reports = Vec::new();
        match node.ready_id() {
            Some(id) => {
                let children = join_all(
                    section
                        .articles_mut()
                        .iter_mut()
                        .map(|a| self.sync_article(a, id)),
                )
                .await;
                reports.push(node);
                reports.extend(children.into_iter().flatten());
            }
            None => {
                let reason = node.skip_reason();
                reports.push(node);
                for article in section.articles() {
                    skip_article(article, &reason, &mut reports);
                }
            }
        }
        reports
    }

    async fn sync_article(&self, article: &mut Article, section_id: RemoteId) -> Vec<NodeReport> {
        let node = self
            .step(ArticleUploader::new(article, section_id, &self.ctx))
            .await;
        let mut reports = Vec::new();
        match node.ready_id() {
            Some(id) => {
                let children = join_all(
                    article
                        .translations_mut()
                        .iter_mut()
                        .map(|t| self.sync_translation(t, id)),
                )
                .await;
                reports.push(node);
                reports.extend(children);
            }
            None => {
                let reason = node.skip_reason();
                reports.push(node);
                for translation in article.translations() {
                    reports.push(skipped(translation, &reason));
                }
            }
        }
        reports
    }

    async fn sync_translation(
        &self,
        translation: &mut Translation,
        article_id: RemoteId,
    ) -> NodeReport {
        self.step(TranslationUploader::new(translation, article_id, &self.ctx))
            .await
    }

    /// Drive one node to `Synced`, recording how far it got.
    async fn step<S: RemoteSynchronizer>(&self, mut uploader: S) -> NodeReport {
        let mut report = NodeReport {
            kind: uploader.kind(),
            path: uploader.path().to_path_buf(),
            remote_id: uploader.remote_id(),
            state: SyncState::initial(uploader.remote_id()),
            outcome: NodeOutcome::Unchanged,
        };

        let result = self.drive(&mut uploader, &mut report.state).await;
        report.remote_id = uploader.remote_id();
        report.outcome = match result {
            Ok(outcome) => outcome,
            Err(SyncError::Cancelled) => {
                debug!("Skipping {} {}: cancelled", report.kind, report.path.display());
                NodeOutcome::Skipped {
                    reason: SkipReason::Cancelled,
                }
            }
            Err(e) => {
                warn!("Failed to sync {} {}: {}", report.kind, report.path.display(), e);
                NodeOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        report
    }

    async fn drive<S: RemoteSynchronizer>(
        &self,
        uploader: &mut S,
        state: &mut SyncState,
    ) -> SyncResult<NodeOutcome> {
        if self.cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        let _permit = self
            .limit
            .acquire()
            .await
            .map_err(|_| SyncError::Cancelled)?;
        if self.cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let created = match *state {
            SyncState::Unsynced => {
                uploader.create().await?;
                *state = SyncState::Created;
                true
            }
            SyncState::Created | SyncState::Synced => false,
        };
        let updated = uploader.sync().await?;
        *state = SyncState::Synced;

        Ok(if created {
            NodeOutcome::Created
        } else if updated {
            NodeOutcome::Updated
        } else {
            NodeOutcome::Unchanged
        })
    }
}

fn skipped(node: &dyn ContentNode, reason: &SkipReason) -> NodeReport {
    NodeReport::for_node(
        node,
        NodeOutcome::Skipped {
            reason: reason.clone(),
        },
    )
}

fn skip_section(section: &Section, reason: &SkipReason, out: &mut Vec<NodeReport>) {
    out.push(skipped(section, reason));
    for article in section.articles() {
        skip_article(article, reason, out);
    }
}

fn skip_article(article: &Article, reason: &SkipReason, out: &mut Vec<NodeReport>) {
    out.push(skipped(article, reason));
    for translation in article.translations() {
        out.push(skipped(translation, reason));
    }
}

/// Record every node of a successfully read tree as valid.
fn record_valid(category: &Category, report: &mut SyncReport) {
    report.push(NodeReport::for_node(category, NodeOutcome::Valid));
    for section in category.sections() {
        report.push(NodeReport::for_node(section, NodeOutcome::Valid));
        for article in section.articles() {
            report.push(NodeReport::for_node(article, NodeOutcome::Valid));
            for translation in article.translations() {
                report.push(NodeReport::for_node(translation, NodeOutcome::Valid));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testutil::{read_ctx, write_file, write_node};
    use crate::uploader::testutil::{sync_ctx, RecordingApi};
    use serde_json::json;
    use tempfile::tempdir;

    fn en(title: &str) -> serde_json::Value {
        json!({"title": title, "locale": "en-us"})
    }

    #[tokio::test]
    async fn test_load_root_reports_bad_category() {
        let dir = tempdir().unwrap();
        let good = write_node(&dir.path().join("good"), en("Good"));
        write_node(&good.join("basics"), en("Basics"));
        std::fs::create_dir(dir.path().join("bad")).unwrap();

        let (categories, report) = Orchestrator::load_root(&read_ctx(), dir.path())
            .await
            .unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(report.counts().valid, 2);
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.path, dir.path().join("bad"));
        assert!(matches!(&failure.outcome, NodeOutcome::Failed { reason } if reason.contains("Missing metadata")));
    }

    #[test]
    fn test_concurrency_is_clamped() {
        let ctx = sync_ctx(Arc::new(RecordingApi::default()));
        let orchestrator = Orchestrator::new(ctx.clone(), usize::MAX);
        assert_eq!(orchestrator.limit.available_permits(), MAX_CONCURRENCY);
        let orchestrator = Orchestrator::new(ctx, 0);
        assert_eq!(orchestrator.limit.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_load_root_missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let result = Orchestrator::load_root(&read_ctx(), &dir.path().join("absent")).await;
        assert!(matches!(result, Err(SyncError::Io(_))));
    }

    #[tokio::test]
    async fn test_cancelled_run_issues_no_calls() {
        let dir = tempdir().unwrap();
        let cat = write_node(&dir.path().join("guides"), en("Guides"));
        let article = write_node(&write_node(&cat.join("basics"), en("Basics")).join("a"), en("A"));
        write_file(&article.join("content.md"), "a");

        let (mut categories, _) = Orchestrator::load_root(&read_ctx(), dir.path())
            .await
            .unwrap();
        let api = Arc::new(RecordingApi::default());
        let token = CancellationToken::new();
        token.cancel();
        let orchestrator =
            Orchestrator::new(sync_ctx(api.clone()), 2).with_cancellation(token);

        let report = orchestrator.run(&mut categories).await;
        assert!(api.calls().is_empty());
        assert_eq!(report.counts().skipped, 3);
        assert!(report.nodes.iter().all(|n| matches!(
            n.outcome,
            NodeOutcome::Skipped {
                reason: SkipReason::Cancelled
            }
        )));
    }

    #[tokio::test]
    async fn test_existing_node_is_not_recreated() {
        let dir = tempdir().unwrap();
        write_node(
            &dir.path().join("guides"),
            json!({"title": "Guides", "locale": "en-us", "remote_id": 5}),
        );

        let (mut categories, _) = Orchestrator::load_root(&read_ctx(), dir.path())
            .await
            .unwrap();
        let api = Arc::new(RecordingApi::default());
        let report = Orchestrator::new(sync_ctx(api.clone()), 1)
            .run(&mut categories)
            .await;

        assert!(api.creates().is_empty());
        assert_eq!(report.nodes[0].outcome, NodeOutcome::Updated);
        assert_eq!(report.nodes[0].state, SyncState::Synced);
        assert_eq!(report.nodes[0].remote_id, Some(5));
    }

    #[tokio::test]
    async fn test_failed_create_skips_children() {
        let dir = tempdir().unwrap();
        let cat = write_node(&dir.path().join("guides"), en("Guides"));
        let section = write_node(&cat.join("basics"), en("Basics"));
        let article = write_node(&section.join("a"), en("A"));
        write_file(&article.join("content.md"), "a");

        let (mut categories, _) = Orchestrator::load_root(&read_ctx(), dir.path())
            .await
            .unwrap();
        let api = Arc::new(RecordingApi::default());
        api.fail_title("Basics");
        let report = Orchestrator::new(sync_ctx(api.clone()), 2)
            .run(&mut categories)
            .await;

        assert_eq!(api.creates().len(), 2);
        let failed = report.find(&section).unwrap();
        assert_eq!(failed.state, SyncState::Unsynced);
        assert_eq!(
            report.find(&article).unwrap().outcome,
            NodeOutcome::Skipped {
                reason: SkipReason::ParentFailed {
                    parent: section.clone()
                }
            }
        );
        assert_eq!(report.nodes[0].outcome, NodeOutcome::Created);
    }

    #[tokio::test]
    async fn test_cancel_during_create_finishes_node_and_stops_children() {
        let dir = tempdir().unwrap();
        let cat = write_node(&dir.path().join("guides"), en("Guides"));
        let section = write_node(&cat.join("basics"), en("Basics"));
        let article = write_node(&section.join("a"), en("A"));
        write_file(&article.join("content.md"), "a");

        let (mut categories, _) = Orchestrator::load_root(&read_ctx(), dir.path())
            .await
            .unwrap();
        let api = Arc::new(RecordingApi::default());
        let orchestrator = Orchestrator::new(sync_ctx(api.clone()), 4);
        api.cancel_after_create(orchestrator.cancellation_token());

        let report = orchestrator.run(&mut categories).await;

        let category = report.find(&cat).unwrap();
        assert_eq!(category.outcome, NodeOutcome::Created);
        assert_eq!(category.state, SyncState::Synced);
        assert_eq!(category.remote_id, Some(100));

        let stored: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(cat.join("meta.json")).unwrap())
                .unwrap();
        assert_eq!(stored["remote_id"], json!(100));
        assert!(stored["fingerprint"].is_string());

        for path in [&section, &article] {
            assert_eq!(
                report.find(path).unwrap().outcome,
                NodeOutcome::Skipped {
                    reason: SkipReason::Cancelled
                }
            );
        }
        assert_eq!(api.creates().len(), 1);
        assert!(api.updates().iter().all(|u| u.kind == NodeKind::Category));
    }
}
