use super::{KeyValueStore, StoreError};
use crate::models::Document;

/// Fixed key the active document is persisted under.
pub const DOCUMENT_KEY: &str = "docsmith.document";

/// Serializes the whole document to a single record in a key-value store.
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DOCUMENT_KEY)
    }

    pub fn with_key(store: S, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn save(&mut self, document: &Document) -> Result<(), StoreError> {
        let record = serde_json::to_string(document)?;
        self.store.set(&self.key, &record)?;
        log::debug!(
            "Saved document for template {} ({} bytes)",
            document.template_id(),
            record.len()
        );
        Ok(())
    }

    /// Load the persisted document, if any.
    ///
    /// Missing fields default to empty values. A record that cannot be read
    /// or parsed at all is logged and treated as absent.
    pub fn load(&self) -> Option<Document> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read stored document {}: {e}", self.key);
                return None;
            }
        };

        match serde_json::from_str::<Document>(&raw) {
            Ok(mut document) => {
                document.enforce_invariants();
                Some(document)
            }
            Err(e) => {
                log::warn!("Ignoring malformed stored document {}: {e}", self.key);
                None
            }
        }
    }
}
