//! Change detection between local content and the last synchronized state.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Compute SHA-256 hash of content bytes.
pub fn compute_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Strategy deciding what a fingerprint is and when content counts as changed.
pub trait ChangeDetector: Send + Sync + fmt::Debug {
    /// Fingerprint of the current content fields plus any attached body digest.
    fn fingerprint(&self, fields: &Map<String, Value>, content_digest: Option<&str>) -> String;

    /// Whether content differs from what `stored` was computed from.
    fn is_changed(
        &self,
        stored: Option<&str>,
        fields: &Map<String, Value>,
        content_digest: Option<&str>,
    ) -> bool {
        match stored {
            Some(stored) => stored != self.fingerprint(fields, content_digest),
            None => true,
        }
    }
}

/// SHA-256 over the canonical JSON of the fields and the body digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHash;

impl ChangeDetector for ContentHash {
    fn fingerprint(&self, fields: &Map<String, Value>, content_digest: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        // serde_json::Map is key-ordered, so this serialization is canonical.
        hasher.update(Value::Object(fields.clone()).to_string().as_bytes());
        hasher.update([0u8]);
        if let Some(digest) = content_digest {
            hasher.update(digest.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// Reports every node as changed; used to force a full push.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysChanged;

impl ChangeDetector for AlwaysChanged {
    fn fingerprint(&self, fields: &Map<String, Value>, content_digest: Option<&str>) -> String {
        ContentHash.fingerprint(fields, content_digest)
    }

    fn is_changed(&self, _: Option<&str>, _: &Map<String, Value>, _: Option<&str>) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_compute_content_hash() {
        let hash = compute_content_hash(b"hello world");
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let a = fields(json!({"title": "A", "locale": "en-us"}));
        let b = fields(json!({"locale": "en-us", "title": "A"}));
        assert_eq!(
            ContentHash.fingerprint(&a, None),
            ContentHash.fingerprint(&b, None)
        );
    }

    #[test]
    fn test_content_digest_affects_fingerprint() {
        let f = fields(json!({"title": "A"}));
        assert_ne!(
            ContentHash.fingerprint(&f, Some("abc")),
            ContentHash.fingerprint(&f, Some("def"))
        );
    }

    #[test]
    fn test_is_changed() {
        let f = fields(json!({"title": "A"}));
        let stored = ContentHash.fingerprint(&f, None);

        assert!(!ContentHash.is_changed(Some(&stored), &f, None));
        assert!(ContentHash.is_changed(Some("stale"), &f, None));
        assert!(ContentHash.is_changed(None, &f, None));
    }

    #[test]
    fn test_always_changed() {
        let f = fields(json!({"title": "A"}));
        let stored = AlwaysChanged.fingerprint(&f, None);
        assert!(AlwaysChanged.is_changed(Some(&stored), &f, None));
    }
}
