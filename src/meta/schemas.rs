//! Root schemas for each kind of metadata file.

use super::{FINGERPRINT_KEY, REMOTE_ID_KEY};
use crate::content::NodeKind;
use helpcenter_schema::{Dictionary, LeafKind, LeafRule, Rule, SchemaError};

/// Validated root dictionaries, one per node kind.
///
/// Built once at startup; a construction failure is a programming error in
/// the schema declarations below.
#[derive(Debug, Clone)]
pub struct MetadataSchemas {
    category: Dictionary,
    section: Dictionary,
    article: Dictionary,
    translation: Dictionary,
}

fn required(key: &str, kind: LeafKind) -> Result<Rule, SchemaError> {
    LeafRule::required(key, kind).map(Rule::from)
}

fn optional(key: &str, kind: LeafKind) -> Result<Rule, SchemaError> {
    LeafRule::optional(key, kind).map(Rule::from)
}

fn position() -> Result<Rule, SchemaError> {
    optional("position", LeafKind::Integer { min: Some(0) })
}

/// Build a root with the content rules plus the sync bookkeeping keys.
fn root_with_bookkeeping(mut rules: Vec<Rule>) -> Result<Dictionary, SchemaError> {
    rules.push(optional(REMOTE_ID_KEY, LeafKind::Id)?);
    rules.push(optional(FINGERPRINT_KEY, LeafKind::String)?);
    Dictionary::root(rules)
}

impl MetadataSchemas {
    pub fn new() -> Result<Self, SchemaError> {
        let structural = || -> Result<Vec<Rule>, SchemaError> {
            Ok(vec![
                required("title", LeafKind::NonEmptyString)?,
                required("locale", LeafKind::Locale)?,
                position()?,
                optional("description", LeafKind::String)?,
            ])
        };

        let category = root_with_bookkeeping(structural()?)?;
        let section = root_with_bookkeeping(structural()?)?;
        let article = root_with_bookkeeping(vec![
            required("title", LeafKind::NonEmptyString)?,
            required("locale", LeafKind::Locale)?,
            position()?,
            optional("label_names", LeafKind::StringList)?,
            optional("promoted", LeafKind::Boolean)?,
            optional("comments_disabled", LeafKind::Boolean)?,
            optional("draft", LeafKind::Boolean)?,
            optional("user_segment_id", LeafKind::Id)?,
            optional("permission_group_id", LeafKind::Id)?,
        ])?;
        let translation = root_with_bookkeeping(vec![
            required("title", LeafKind::NonEmptyString)?,
            required("locale", LeafKind::Locale)?,
            optional("draft", LeafKind::Boolean)?,
        ])?;

        Ok(Self {
            category,
            section,
            article,
            translation,
        })
    }

    pub fn for_kind(&self, kind: NodeKind) -> &Dictionary {
        match kind {
            NodeKind::Category => &self.category,
            NodeKind::Section => &self.section,
            NodeKind::Article => &self.article,
            NodeKind::Translation => &self.translation,
        }
    }
}
