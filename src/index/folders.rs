//! Folder Rollup - folder key → items at or below that folder
//!
//! For a vault like:
//!
//! ```text
//! Calls/202307041400 Call with Joe.md
//! Music/Concerts/202305301400 Concert.md
//! Music/202302250305 Spring Repertoire.md
//! Work/Calls/202307021555 Call with Sally.md
//! ```
//!
//! the rollup is:
//!
//! ```text
//! "Calls/"          → [Call with Joe]
//! "Music/"          → [Concert, Spring Repertoire]
//! "Music/Concerts/" → [Concert]
//! "Work/"           → [Call with Sally]
//! "Work/Calls/"     → [Call with Sally]
//! ```
//!
//! Items at the vault root belong to no folder key; the empty key means
//! "all items" and is never stored.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::index::DatedItem;

/// Folder key → items, keys sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FolderRollup {
    folders: BTreeMap<String, Vec<DatedItem>>,
}

impl FolderRollup {
    /// Build the rollup; bucket order follows `items`
    pub fn build(items: &[DatedItem]) -> Self {
        let mut folders: BTreeMap<String, Vec<DatedItem>> = BTreeMap::new();

        for item in items {
            let mut segments: Vec<&str> = item.path.split('/').collect();
            segments.pop(); // file name

            let mut key = String::new();
            for segment in segments {
                key.push_str(segment);
                key.push('/');
                folders.entry(key.clone()).or_default().push(item.clone());
            }
        }

        Self { folders }
    }

    /// Items under `key`, `None` if no such folder holds dated items
    pub fn get(&self, key: &str) -> Option<&[DatedItem]> {
        self.folders.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.folders.contains_key(key)
    }

    /// Folder keys in sorted order
    pub fn folder_names(&self) -> Vec<String> {
        self.folders.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DatedItem])> {
        self.folders.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of folder keys
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

/// Build a [`FolderRollup`] from a flat item list
pub fn build_folder_rollup(items: &[DatedItem]) -> FolderRollup {
    FolderRollup::build(items)
}
