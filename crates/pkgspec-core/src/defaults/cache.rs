//! Per-run memo of fetched remote documents

use std::collections::HashMap;

/// Remote document text keyed by canonical id.
///
/// Created by the caller and lent to the resolver, so one run never fetches
/// the same URL twice even when several documents reference it.
#[derive(Debug, Default)]
pub struct DefaultsCache {
    documents: HashMap<String, String>,
}

impl DefaultsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.documents.get(id).map(String::as_str)
    }

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
