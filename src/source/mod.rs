//! Document Sources
//!
//! Where documents come from and how changes are announced:
//!
//! - **FsVault**: a directory of Markdown files, watched with `notify`
//! - **MemorySource**: an in-memory vault for tests and embedding
//!
//! A source lists documents, optionally supplies their headings, and hands
//! out [`Subscription`]s that yield a [`VaultEvent`] for every create,
//! rename or delete. Events carry no payload semantics beyond "re-fetch".

mod fs;
mod memory;
mod watch;

pub use fs::{extract_headings, FsVault};
pub use memory::MemorySource;
pub use watch::watch_vault;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// A document as the source knows it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// File name without extension
    pub name: String,
    /// Vault-relative path, `/`-separated, extension included
    pub path: String,
}

impl DocumentRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Derive the name from the last path segment, minus its extension
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path.rsplit('/').next().unwrap_or(&path);
        let name = match file_name.rfind('.') {
            Some(dot) if dot > 0 => &file_name[..dot],
            _ => file_name,
        };
        Self {
            name: name.to_string(),
            path,
        }
    }
}

/// A change reported by a document source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "lowercase")]
pub enum VaultEvent {
    Created(String),
    Renamed(String),
    Deleted(String),
}

impl VaultEvent {
    /// Path the event was reported for
    pub fn path(&self) -> &str {
        match self {
            VaultEvent::Created(path) | VaultEvent::Renamed(path) | VaultEvent::Deleted(path) => path,
        }
    }
}

impl std::fmt::Display for VaultEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultEvent::Created(path) => write!(f, "created {}", path),
            VaultEvent::Renamed(path) => write!(f, "renamed {}", path),
            VaultEvent::Deleted(path) => write!(f, "deleted {}", path),
        }
    }
}

/// A live stream of vault events
///
/// Dropping the subscription unsubscribes: the receiver closes and any
/// watcher held as a guard is stopped.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<VaultEvent>,
    _guard: Option<Box<dyn Any + Send>>,
}

impl Subscription {
    pub fn new(events: mpsc::UnboundedReceiver<VaultEvent>) -> Self {
        Self {
            events,
            _guard: None,
        }
    }

    /// Keep `guard` alive for as long as the subscription
    pub fn with_guard(events: mpsc::UnboundedReceiver<VaultEvent>, guard: impl Any + Send) -> Self {
        Self {
            events,
            _guard: Some(Box::new(guard)),
        }
    }

    /// Next event; `None` once the source has gone away
    pub async fn recv(&mut self) -> Option<VaultEvent> {
        self.events.recv().await
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<VaultEvent> {
        self.events.try_recv().ok()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("guarded", &self._guard.is_some())
            .finish()
    }
}

/// Common trait for all document sources
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// All documents currently in the source
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, SourceError>;

    /// Whether [`DocumentSource::headings`] returns anything
    fn supports_headings(&self) -> bool {
        false
    }

    /// Heading texts of a document, in document order
    async fn headings(&self, _document: &DocumentRecord) -> Result<Vec<String>, SourceError> {
        Ok(Vec::new())
    }

    /// Start receiving create/rename/delete events
    fn subscribe(&self) -> Result<Subscription, SourceError>;
}

/// Errors that can occur while reading a document source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vault root not found: {0:?}")]
    RootNotFound(PathBuf),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for SourceError {
    fn from(err: tokio::task::JoinError) -> Self {
        SourceError::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_path() {
        let record = DocumentRecord::from_path("Work/Calls/202307021555 Call with Sally.md");
        assert_eq!(record.name, "202307021555 Call with Sally");
        assert_eq!(record.path, "Work/Calls/202307021555 Call with Sally.md");

        let record = DocumentRecord::from_path("202307141746.md");
        assert_eq!(record.name, "202307141746");

        let record = DocumentRecord::from_path("Dr. Smith 2023.md");
        assert_eq!(record.name, "Dr. Smith 2023");

        let record = DocumentRecord::from_path(".hidden");
        assert_eq!(record.name, ".hidden");
    }

    #[test]
    fn test_event_serialization() {
        let event = VaultEvent::Renamed("Work/a.md".to_string());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "renamed");
        assert_eq!(json["path"], "Work/a.md");
        assert_eq!(event.to_string(), "renamed Work/a.md");
    }

    #[tokio::test]
    async fn test_subscription_closes_with_sender() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscription = Subscription::new(rx);

        tx.send(VaultEvent::Created("a.md".to_string())).unwrap();
        assert_eq!(subscription.try_recv(), Some(VaultEvent::Created("a.md".to_string())));
        assert_eq!(subscription.try_recv(), None);

        drop(tx);
        assert_eq!(subscription.recv().await, None);
    }
}
