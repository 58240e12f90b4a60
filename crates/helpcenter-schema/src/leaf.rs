//! Leaf rules: validate a single field value.

use crate::{RuleOptions, SchemaError};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Closure signature for [`LeafKind::Custom`] rules.
pub type CustomParser = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// What a leaf rule accepts and how it transforms the value.
#[derive(Clone)]
pub enum LeafKind {
    /// Any string, unchanged.
    String,
    /// A string with non-whitespace content, trimmed.
    NonEmptyString,
    /// A locale tag such as `en` or `en-us`, lower-cased.
    Locale,
    /// A whole number, optionally bounded below.
    Integer { min: Option<i64> },
    Boolean,
    /// A positive integer identifier.
    Id,
    /// An array of strings.
    StringList,
    /// A string drawn from a fixed set.
    OneOf(Vec<String>),
    /// Application-specific conversion.
    Custom(CustomParser),
}

impl fmt::Debug for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafKind::String => write!(f, "String"),
            LeafKind::NonEmptyString => write!(f, "NonEmptyString"),
            LeafKind::Locale => write!(f, "Locale"),
            LeafKind::Integer { min } => f.debug_struct("Integer").field("min", min).finish(),
            LeafKind::Boolean => write!(f, "Boolean"),
            LeafKind::Id => write!(f, "Id"),
            LeafKind::StringList => write!(f, "StringList"),
            LeafKind::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            LeafKind::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl LeafKind {
    /// Wrap a closure as a custom leaf kind.
    pub fn custom<F>(parse: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        LeafKind::Custom(Arc::new(parse))
    }
}

fn locale_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})*$").expect("locale pattern is valid")
    })
}

/// A rule that converts one raw value into one validated value.
#[derive(Debug, Clone)]
pub struct LeafRule {
    key: String,
    kind: LeafKind,
    is_required: bool,
}

impl LeafRule {
    /// Build a leaf rule. Fails if `key` is empty.
    pub fn new(
        key: impl Into<String>,
        kind: LeafKind,
        options: RuleOptions,
    ) -> Result<Self, SchemaError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(SchemaError::invalid_schema("Key must be a non-empty string"));
        }
        Ok(Self {
            key,
            kind,
            is_required: options.is_required,
        })
    }

    /// Shorthand for a required leaf.
    pub fn required(key: impl Into<String>, kind: LeafKind) -> Result<Self, SchemaError> {
        Self::new(key, kind, RuleOptions::required())
    }

    /// Shorthand for an optional leaf.
    pub fn optional(key: impl Into<String>, kind: LeafKind) -> Result<Self, SchemaError> {
        Self::new(key, kind, RuleOptions::default())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> &LeafKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Validate and transform one raw value.
    pub fn parse(&self, raw: &Value) -> Result<Value, SchemaError> {
        let key = self.key.as_str();
        match &self.kind {
            LeafKind::String => match raw {
                Value::String(_) => Ok(raw.clone()),
                _ => Err(SchemaError::type_mismatch(key, "a string")),
            },
            LeafKind::NonEmptyString => {
                let s = raw
                    .as_str()
                    .ok_or_else(|| SchemaError::type_mismatch(key, "a string"))?;
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(SchemaError::invalid_value(key, "must not be empty"));
                }
                Ok(Value::String(trimmed.to_string()))
            }
            LeafKind::Locale => {
                let s = raw
                    .as_str()
                    .ok_or_else(|| SchemaError::type_mismatch(key, "a locale string"))?;
                let locale = s.trim().to_ascii_lowercase();
                if !locale_pattern().is_match(&locale) {
                    return Err(SchemaError::invalid_value(
                        key,
                        format!("'{}' is not a locale tag", s),
                    ));
                }
                Ok(Value::String(locale))
            }
            LeafKind::Integer { min } => {
                let n = raw
                    .as_i64()
                    .ok_or_else(|| SchemaError::type_mismatch(key, "an integer"))?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(SchemaError::invalid_value(
                            key,
                            format!("{} is below the minimum of {}", n, min),
                        ));
                    }
                }
                Ok(Value::from(n))
            }
            LeafKind::Boolean => match raw {
                Value::Bool(_) => Ok(raw.clone()),
                _ => Err(SchemaError::type_mismatch(key, "a boolean")),
            },
            LeafKind::Id => match raw.as_u64() {
                Some(id) if id > 0 => Ok(Value::from(id)),
                Some(_) => Err(SchemaError::invalid_value(key, "ids must be positive")),
                None => Err(SchemaError::type_mismatch(key, "a positive integer id")),
            },
            LeafKind::StringList => {
                let items = raw
                    .as_array()
                    .ok_or_else(|| SchemaError::type_mismatch(key, "a list of strings"))?;
                if items.iter().any(|item| !item.is_string()) {
                    return Err(SchemaError::type_mismatch(key, "a list of strings"));
                }
                Ok(raw.clone())
            }
            LeafKind::OneOf(allowed) => {
                let s = raw
                    .as_str()
                    .ok_or_else(|| SchemaError::type_mismatch(key, "a string"))?;
                if allowed.iter().any(|a| a == s) {
                    Ok(raw.clone())
                } else {
                    Err(SchemaError::invalid_value(
                        key,
                        format!("'{}' is not one of: {}", s, allowed.join(", ")),
                    ))
                }
            }
            LeafKind::Custom(parse) => {
                parse(raw).map_err(|reason| SchemaError::invalid_value(key, reason))
            }
        }
    }
}
