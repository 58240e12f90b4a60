//! Schema validation for help-center metadata.
//!
//! Metadata files are loosely structured JSON. This crate turns them into
//! validated maps by applying a tree of [`Rule`]s: leaf rules convert a single
//! value, [`Dictionary`] rules recurse into nested objects. The same `parse`
//! contract applies at every depth, so nested shapes are declared simply by
//! nesting dictionaries.

pub mod dictionary;
pub mod error;
pub mod leaf;
pub mod rule;

pub use dictionary::Dictionary;
pub use error::SchemaError;
pub use leaf::{LeafKind, LeafRule};
pub use rule::{Rule, RuleOptions};
