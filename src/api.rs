//! Interface to the remote help-center API.
//!
//! The core only issues create/update calls through [`HelpCenterApi`].
//! Authentication, retries and rate limiting belong to the implementation;
//! [`http::HttpHelpCenterClient`] is the production one.

pub mod http;

use crate::content::NodeKind;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use http::HttpHelpCenterClient;

/// Identifier assigned by the remote service.
pub type RemoteId = u64;

/// Errors surfaced by an API client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport failure (connect, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be understood
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    /// The request cannot be expressed (e.g. missing parent id)
    #[error("Invalid API request: {0}")]
    InvalidRequest(String),

    /// Client configuration is incomplete
    #[error("API configuration error: {0}")]
    Config(String),
}

/// A request to create one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub kind: NodeKind,
    /// Remote id of the owning resource; `None` only for categories.
    pub parent_id: Option<RemoteId>,
    pub payload: Map<String, Value>,
}

/// Which representation of a resource an update addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTarget {
    /// The resource itself (structural settings such as position).
    Resource,
    /// The resource's translation for one locale (title, body).
    Translation { locale: String },
}

/// A request to update one existing resource.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub kind: NodeKind,
    pub remote_id: RemoteId,
    /// Owning resource id, needed where the remote addresses a resource
    /// through its parent (article translations).
    pub parent_id: Option<RemoteId>,
    pub target: UpdateTarget,
    pub payload: Map<String, Value>,
}

/// The interesting part of a create response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedResource {
    pub id: RemoteId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CreatedResource {
    pub fn new(id: RemoteId) -> Self {
        Self {
            id,
            extra: Map::new(),
        }
    }
}

/// Remote mutations the synchronizers rely on.
#[async_trait]
pub trait HelpCenterApi: Send + Sync {
    async fn create(&self, request: CreateRequest) -> Result<CreatedResource, ApiError>;

    async fn update(&self, request: UpdateRequest) -> Result<(), ApiError>;
}
