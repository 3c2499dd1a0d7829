//! Vault watcher
//!
//! Bridges `notify` filesystem events into [`VaultEvent`]s. Content edits are
//! ignored; only changes that can add, move or remove a dated item are
//! forwarded.

use std::path::Path;

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::{FsVault, SourceError, Subscription, VaultEvent};

/// Watch `vault` recursively
///
/// The watcher lives inside the returned subscription and stops when it is
/// dropped.
pub fn watch_vault(vault: FsVault) -> Result<Subscription, SourceError> {
    let vault = vault.resolved();
    let (tx, rx) = mpsc::unbounded_channel();
    let root = vault.root().to_path_buf();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                for vault_event in translate(&vault, &event) {
                    tracing::debug!(event = %vault_event, "Vault changed");
                    if tx.send(vault_event).is_err() {
                        // Subscriber dropped
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!("Vault watcher error: {}", e),
        },
        Config::default(),
    )?;
    watcher.watch(&root, RecursiveMode::Recursive)?;

    tracing::info!(root = ?root, "Watching vault for changes");
    Ok(Subscription::with_guard(rx, watcher))
}

/// Map one notify event onto zero or more vault events
fn translate(vault: &FsVault, event: &notify::Event) -> Vec<VaultEvent> {
    let make: fn(String) -> VaultEvent = match event.kind {
        EventKind::Create(_) => VaultEvent::Created,
        EventKind::Remove(_) => VaultEvent::Deleted,
        EventKind::Modify(ModifyKind::Name(_)) => VaultEvent::Renamed,
        _ => return Vec::new(),
    };

    event
        .paths
        .iter()
        .filter(|path| is_relevant(vault, &event.kind, path))
        .map(|path| {
            let label = vault
                .record_for(path)
                .map(|record| record.path)
                .unwrap_or_else(|| path.display().to_string());
            make(label)
        })
        .collect()
}

/// Notes with a listed extension, or visible folders
fn is_relevant(vault: &FsVault, kind: &EventKind, path: &Path) -> bool {
    if vault.accepts(path) {
        return true;
    }
    if !vault.is_visible(path) {
        return false;
    }
    match kind {
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
        EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => false,
        // Renames and unspecific kinds: look at the disk, or guess by name once gone
        _ => path.is_dir() || (!path.exists() && path.extension().is_none()),
    }
}
