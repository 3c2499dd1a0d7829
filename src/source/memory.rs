//! In-memory document source
//!
//! Holds documents and headings in memory and lets callers emit change
//! events by hand. Used by tests, and by hosts that already have their own
//! file listing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{DocumentRecord, DocumentSource, SourceError, Subscription, VaultEvent};

#[derive(Default)]
struct Inner {
    documents: Vec<DocumentRecord>,
    headings: HashMap<String, Vec<String>>,
    subscribers: Vec<mpsc::UnboundedSender<VaultEvent>>,
}

impl Inner {
    /// Replace the document with the same path, or append
    fn upsert(&mut self, record: DocumentRecord) {
        match self.documents.iter_mut().find(|doc| doc.path == record.path) {
            Some(doc) => *doc = record,
            None => self.documents.push(record),
        }
    }
}

/// A vault that lives in memory
///
/// Mutations notify subscribers the same way a watched directory would.
#[derive(Clone, Default)]
pub struct MemorySource {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source pre-filled with documents at `paths`
    pub fn with_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = Self::new();
        if let Ok(mut inner) = source.inner.lock() {
            inner.documents = paths.into_iter().map(DocumentRecord::from_path).collect();
        }
        source
    }

    /// Add a document and announce it
    ///
    /// Creating a path that already exists replaces that document.
    pub fn create(&self, path: impl Into<String>) {
        let record = DocumentRecord::from_path(path);
        let event = VaultEvent::Created(record.path.clone());
        self.update(|inner| inner.upsert(record), event);
    }

    /// Move a document and announce it
    pub fn rename(&self, from: &str, to: impl Into<String>) {
        let record = DocumentRecord::from_path(to);
        let event = VaultEvent::Renamed(record.path.clone());
        self.update(
            |inner| {
                if let Some(headings) = inner.headings.remove(from) {
                    inner.headings.insert(record.path.clone(), headings);
                }
                if record.path != from {
                    inner.documents.retain(|doc| doc.path != record.path);
                }
                match inner.documents.iter_mut().find(|doc| doc.path == from) {
                    Some(doc) => *doc = record,
                    None => inner.documents.push(record),
                }
            },
            event,
        );
    }

    /// Remove a document and announce it
    pub fn delete(&self, path: &str) {
        let event = VaultEvent::Deleted(path.to_string());
        self.update(
            |inner| {
                inner.documents.retain(|doc| doc.path != path);
                inner.headings.remove(path);
            },
            event,
        );
    }

    /// Set the headings of a document (no event: content edits are silent)
    pub fn set_headings(&self, path: impl Into<String>, headings: Vec<String>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.headings.insert(path.into(), headings);
        }
    }

    fn update(&self, change: impl FnOnce(&mut Inner), event: VaultEvent) {
        let Ok(mut inner) = self.inner.lock() else {
            tracing::warn!("Memory source lock poisoned, dropping {}", event);
            return;
        };
        change(&mut inner);
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, SourceError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| SourceError::Task(e.to_string()))?;
        Ok(inner.documents.clone())
    }

    fn supports_headings(&self) -> bool {
        true
    }

    async fn headings(&self, document: &DocumentRecord) -> Result<Vec<String>, SourceError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| SourceError::Task(e.to_string()))?;
        Ok(inner.headings.get(&document.path).cloned().unwrap_or_default())
    }

    fn subscribe(&self) -> Result<Subscription, SourceError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .lock()
            .map_err(|e| SourceError::Task(e.to_string()))?
            .subscribers
            .push(tx);
        Ok(Subscription::new(rx))
    }
}
