//! Knowledge document storage abstraction.
//!
//! The pipeline treats documents as opaque text keyed by id. The backing
//! store (uploaded files, a CMS, fixtures) is implemented elsewhere.

use std::collections::HashMap;

/// Placeholder returned when a document id is unknown. Downstream
/// components degrade to sentinel text rather than failing.
pub const DOCUMENT_UNAVAILABLE: &str = "[文档不可用 / document unavailable]";

/// Lookup interface for knowledge documents.
pub trait DocumentStore: Send + Sync {
    /// Full text of the document, or [`DOCUMENT_UNAVAILABLE`] when the
    /// id is unknown.
    fn lookup(&self, id: &str) -> String;

    /// Whether a document with this id exists.
    fn contains(&self, id: &str) -> bool;
}

/// A simple in-memory document store.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: HashMap<String, String>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, replacing any previous text under the same id.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(id.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn lookup(&self, id: &str) -> String {
        self.documents
            .get(id)
            .cloned()
            .unwrap_or_else(|| DOCUMENT_UNAVAILABLE.to_string())
    }

    fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_returns_stored_text() {
        let mut store = InMemoryDocumentStore::new();
        store.insert("product_pool_q3", "1. 稳健理财 [风险等级: R1]");
        assert!(store.lookup("product_pool_q3").contains("稳健理财"));
        assert!(store.contains("product_pool_q3"));
    }

    #[test]
    fn lookup_unknown_id_yields_sentinel() {
        let store = InMemoryDocumentStore::new();
        assert_eq!(store.lookup("missing"), DOCUMENT_UNAVAILABLE);
        assert!(!store.contains("missing"));
    }
}
