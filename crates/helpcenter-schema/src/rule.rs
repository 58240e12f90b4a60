//! The validation capability shared by leaf and dictionary rules.

use crate::{Dictionary, LeafRule, SchemaError};
use serde_json::Value;

/// Construction options common to every rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleOptions {
    /// Whether the governed key must be present in the parent record.
    pub is_required: bool,
}

impl RuleOptions {
    /// Options for a key that must be present.
    pub fn required() -> Self {
        Self { is_required: true }
    }
}

/// A single validation rule.
///
/// Leaf rules convert one scalar (or flat list) value; dictionary rules
/// recurse into a nested object. Callers treat both uniformly through
/// [`Rule::parse`].
#[derive(Debug, Clone)]
pub enum Rule {
    Leaf(LeafRule),
    Dictionary(Dictionary),
}

impl Rule {
    /// The field key this rule governs. `None` only for a root dictionary.
    pub fn key(&self) -> Option<&str> {
        match self {
            Rule::Leaf(leaf) => Some(leaf.key()),
            Rule::Dictionary(dict) => dict.key(),
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            Rule::Leaf(leaf) => leaf.is_required(),
            Rule::Dictionary(dict) => dict.is_required(),
        }
    }

    /// Validate and transform one raw value.
    pub fn parse(&self, raw: &Value) -> Result<Value, SchemaError> {
        match self {
            Rule::Leaf(leaf) => leaf.parse(raw),
            Rule::Dictionary(dict) => dict.parse(raw).map(Value::Object),
        }
    }
}

impl From<LeafRule> for Rule {
    fn from(leaf: LeafRule) -> Self {
        Rule::Leaf(leaf)
    }
}

impl From<Dictionary> for Rule {
    fn from(dict: Dictionary) -> Self {
        Rule::Dictionary(dict)
    }
}
