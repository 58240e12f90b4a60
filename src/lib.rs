//! Synchronize a local help-center content tree to a remote help center.
//!
//! Content is read from a directory tree (categories containing sections
//! containing articles with translations), validated against per-kind
//! metadata schemas, and pushed parent-first through a [`api::HelpCenterApi`]
//! client. Only nodes whose content changed since the last sync are updated.

pub mod api;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod meta;
pub mod orchestrator;
pub mod render;
pub mod storage;
pub mod uploader;

pub use error::{SyncError, SyncResult};
