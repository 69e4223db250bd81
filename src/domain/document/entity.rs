//! Document entity shared by the loader, chunker and index store

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const META_QUESTION: &str = "question";
pub const META_CLASS: &str = "class";
pub const META_SOURCE: &str = "source";
pub const META_UUID: &str = "uuid";
pub const META_URL: &str = "url";
pub const META_CREATED_AT: &str = "created_at";
pub const META_CHUNK_ID: &str = "chunk_id";

/// A unit of text plus string metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn uuid(&self) -> Option<&str> {
        self.get(META_UUID)
    }

    pub fn chunk_id(&self) -> Option<&str> {
        self.get(META_CHUNK_ID)
    }

    pub fn question(&self) -> Option<&str> {
        self.get(META_QUESTION)
    }
}

/// Build the identifier of the `index`-th chunk split from the document `uuid`
pub fn make_chunk_id(uuid: &str, index: usize) -> String {
    format!("{}_{}", uuid, index)
}

/// Recover the parent document uuid from a chunk id
///
/// The uuid itself may contain underscores; only the final `_<index>` is
/// stripped.
pub fn parent_uuid(chunk_id: &str) -> Option<&str> {
    let (prefix, index) = chunk_id.rsplit_once('_')?;

    if prefix.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_metadata() {
        let doc = Document::new("answer")
            .with_metadata(META_UUID, "abc")
            .with_metadata(META_QUESTION, "q?");

        assert_eq!(doc.uuid(), Some("abc"));
        assert_eq!(doc.question(), Some("q?"));
        assert_eq!(doc.chunk_id(), None);
    }

    #[test]
    fn test_chunk_id_round_trip() {
        let id = make_chunk_id("1f0c-22_x", 17);
        assert_eq!(id, "1f0c-22_x_17");
        assert_eq!(parent_uuid(&id), Some("1f0c-22_x"));
    }

    #[test]
    fn test_parent_uuid_rejects_malformed() {
        assert_eq!(parent_uuid("no-index"), None);
        assert_eq!(parent_uuid("abc_"), None);
        assert_eq!(parent_uuid("_3"), None);
        assert_eq!(parent_uuid("abc_x1"), None);
    }
}
