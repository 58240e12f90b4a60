//! Dictionary rules: composite validators for JSON objects.

use crate::{Rule, RuleOptions, SchemaError};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

/// A composite rule owning one child rule per declared field.
///
/// The root dictionary of a schema has no key; every nested dictionary is
/// keyed by the field it governs in its parent record.
#[derive(Debug, Clone)]
pub struct Dictionary {
    key: Option<String>,
    children: Vec<Rule>,
    is_required: bool,
    is_root: bool,
}

impl Dictionary {
    /// Build the entry-point dictionary of a schema.
    pub fn root(children: Vec<Rule>) -> Result<Self, SchemaError> {
        validate_children(&children)?;
        Ok(Self {
            key: None,
            children,
            is_required: false,
            is_root: true,
        })
    }

    /// Build a nested dictionary governing `key`.
    pub fn new(
        key: impl Into<String>,
        children: Vec<Rule>,
        options: RuleOptions,
    ) -> Result<Self, SchemaError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(SchemaError::invalid_schema("Key must be a non-empty string"));
        }
        validate_children(&children)?;
        Ok(Self {
            key: Some(key),
            children,
            is_required: options.is_required,
            is_root: false,
        })
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn children(&self) -> &[Rule] {
        &self.children
    }

    /// First-level field keys declared by the children.
    pub fn get_all_keys(&self) -> BTreeSet<&str> {
        self.children.iter().filter_map(Rule::key).collect()
    }

    /// Validate a raw record and return the parsed fields.
    ///
    /// Fails on undeclared keys, then on missing required keys, then on the
    /// first child that rejects its value. Nothing is returned on failure.
    pub fn parse(&self, record: &Value) -> Result<Map<String, Value>, SchemaError> {
        let object = record.as_object().ok_or_else(|| {
            SchemaError::type_mismatch(self.key.as_deref().unwrap_or("<root>"), "an object")
        })?;

        let declared = self.get_all_keys();
        let unknown: Vec<String> = object
            .keys()
            .filter(|k| !declared.contains(k.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(SchemaError::UnknownField { keys: unknown });
        }

        for child in self.children.iter().filter(|c| c.is_required()) {
            if let Some(key) = child.key() {
                if !object.contains_key(key) {
                    return Err(SchemaError::MissingRequiredField {
                        key: key.to_string(),
                    });
                }
            }
        }

        let mut parsed = Map::new();
        for child in &self.children {
            let Some(key) = child.key() else {
                continue;
            };
            if let Some(raw) = object.get(key) {
                parsed.insert(key.to_string(), child.parse(raw)?);
            }
        }
        Ok(parsed)
    }
}

fn validate_children(children: &[Rule]) -> Result<(), SchemaError> {
    if children.is_empty() {
        return Err(SchemaError::invalid_schema(
            "Dictionary requires at least 1 rule",
        ));
    }
    let mut seen = HashSet::new();
    for child in children {
        let Some(key) = child.key() else {
            return Err(SchemaError::invalid_schema(
                "Rule without a key cannot be nested; root dictionaries are entry points only",
            ));
        };
        if !seen.insert(key) {
            return Err(SchemaError::invalid_schema(format!(
                "Duplicate rule key '{}'",
                key
            )));
        }
    }
    Ok(())
}
