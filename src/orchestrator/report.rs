//! Per-node outcomes of a load or sync pass.

use crate::api::RemoteId;
use crate::content::{ContentNode, NodeKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a node stands relative to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// No remote identifier yet
    Unsynced,
    /// Remote identifier assigned, content parity not yet verified
    Created,
    /// Content parity verified or repaired during this pass
    Synced,
}

impl SyncState {
    pub fn initial(remote_id: Option<RemoteId>) -> Self {
        if remote_id.is_some() {
            SyncState::Created
        } else {
            SyncState::Unsynced
        }
    }
}

/// Why a node was never attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// An ancestor failed, so this subtree was abandoned
    ParentFailed { parent: PathBuf },
    /// The run was cancelled before this node started
    Cancelled,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ParentFailed { parent } => {
                write!(f, "blocked by failure at {}", parent.display())
            }
            SkipReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeOutcome {
    /// Created remotely during this pass
    Created,
    /// Existed remotely and local changes were pushed
    Updated,
    /// Existed remotely and nothing changed
    Unchanged,
    /// Read and validated without synchronizing
    Valid,
    Failed { reason: String },
    Skipped { reason: SkipReason },
}

impl NodeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, NodeOutcome::Failed { .. })
    }
}

impl fmt::Display for NodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOutcome::Created => f.write_str("created"),
            NodeOutcome::Updated => f.write_str("updated"),
            NodeOutcome::Unchanged => f.write_str("unchanged"),
            NodeOutcome::Valid => f.write_str("valid"),
            NodeOutcome::Failed { reason } => write!(f, "failed: {}", reason),
            NodeOutcome::Skipped { reason } => write!(f, "skipped: {}", reason),
        }
    }
}

/// Result for a single content node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    pub kind: NodeKind,
    pub path: PathBuf,
    /// Remote identifier after the pass, if any
    pub remote_id: Option<RemoteId>,
    pub state: SyncState,
    #[serde(flatten)]
    pub outcome: NodeOutcome,
}

impl NodeReport {
    pub fn for_node(node: &dyn ContentNode, outcome: NodeOutcome) -> Self {
        let remote_id = node.meta().remote_id();
        Self {
            kind: node.kind(),
            path: node.path().to_path_buf(),
            remote_id,
            state: SyncState::initial(remote_id),
            outcome,
        }
    }

    pub fn failed(kind: NodeKind, path: &Path, reason: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.to_path_buf(),
            remote_id: None,
            state: SyncState::Unsynced,
            outcome: NodeOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    /// Remote id children may use, present only if this node completed.
    pub fn ready_id(&self) -> Option<RemoteId> {
        match self.outcome {
            NodeOutcome::Created | NodeOutcome::Updated | NodeOutcome::Unchanged => self.remote_id,
            _ => None,
        }
    }

    /// Reason to give descendants when this node did not complete.
    pub fn skip_reason(&self) -> SkipReason {
        match &self.outcome {
            NodeOutcome::Skipped { reason } => reason.clone(),
            _ => SkipReason::ParentFailed {
                parent: self.path.clone(),
            },
        }
    }
}

impl fmt::Display for NodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<11} {} ", self.kind, self.path.display())?;
        if let Some(id) = self.remote_id {
            write!(f, "[{}] ", id)?;
        }
        write!(f, "{}", self.outcome)
    }
}

/// Totals per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub valid: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Outcome of a whole pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub nodes: Vec<NodeReport>,
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: NodeReport) {
        self.nodes.push(node);
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = NodeReport>) {
        self.nodes.extend(nodes);
    }

    /// Append the nodes of another report, keeping this report's start time.
    pub fn merge(&mut self, other: SyncReport) {
        self.nodes.extend(other.nodes);
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn counts(&self) -> ReportCounts {
        let mut counts = ReportCounts::default();
        for node in &self.nodes {
            match node.outcome {
                NodeOutcome::Created => counts.created += 1,
                NodeOutcome::Updated => counts.updated += 1,
                NodeOutcome::Unchanged => counts.unchanged += 1,
                NodeOutcome::Valid => counts.valid += 1,
                NodeOutcome::Failed { .. } => counts.failed += 1,
                NodeOutcome::Skipped { .. } => counts.skipped += 1,
            }
        }
        counts
    }

    pub fn has_failures(&self) -> bool {
        self.nodes.iter().any(|n| n.outcome.is_failure())
    }

    pub fn failures(&self) -> impl Iterator<Item = &NodeReport> {
        self.nodes.iter().filter(|n| n.outcome.is_failure())
    }

    pub fn find(&self, path: &Path) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.path == path)
    }
}
