//! Almanac Index Structures
//!
//! Derived views over the dated items of a vault:
//!
//! - **builder**: documents → flat `Vec<DatedItem>` (notes + dated headings)
//! - **FolderRollup**: folder key → every item at or below that folder
//! - **DayRollup**: calendar day → items on that day, in time order
//! - **SlidingWindow**: contiguous run of days around a reference date
//!
//! # Architecture
//!
//! ```text
//! DocumentRecord[] ──build_index──▶ DatedItem[] ──┬──▶ FolderRollup
//!                                                  └──▶ DayRollup ──▶ SlidingWindow
//! ```
//!
//! Every structure is rebuilt from scratch on refresh; nothing is patched
//! in place.

mod builder;
mod days;
mod folders;
mod window;

pub use builder::{build_index, HeadingMap, HeadingsProvider};
pub use days::{build_day_rollup, DayRollup};
pub use folders::{build_folder_rollup, FolderRollup};
pub use window::{build_sliding_window, DayBucket, SlidingWindow, WindowBounds, WINDOW_SPAN_DAYS};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::parse::{extract_title, PrefixFormat};

/// Whether an item came from a file name or a heading inside a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Note,
    Heading,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Note => write!(f, "note"),
            ItemKind::Heading => write!(f, "heading"),
        }
    }
}

/// Back-reference from a heading to the note that contains it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub name: String,
    pub path: String,
    pub timestamp: NaiveDateTime,
}

/// A note or heading whose name starts with a valid date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedItem {
    /// Name as written, date text included
    pub name: String,
    /// `/`-separated locator; headings use `<note path>#<heading>`
    pub path: String,
    pub kind: ItemKind,
    /// Local wall-clock time parsed from the name
    pub timestamp: NaiveDateTime,
    /// Dated headings of a note (always empty for headings)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_items: Vec<DatedItem>,
    /// Owning note of a heading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
}

impl DatedItem {
    /// A dated note
    pub fn note(name: impl Into<String>, path: impl Into<String>, timestamp: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: ItemKind::Note,
            timestamp,
            sub_items: Vec::new(),
            parent: None,
        }
    }

    /// A dated heading inside `parent`
    pub fn heading(text: impl Into<String>, parent: &DatedItem, timestamp: NaiveDateTime) -> Self {
        let name = text.into();
        Self {
            path: format!("{}#{}", parent.path, name),
            name,
            kind: ItemKind::Heading,
            timestamp,
            sub_items: Vec::new(),
            parent: Some(parent.parent_ref()),
        }
    }

    /// Non-owning reference to this item
    pub fn parent_ref(&self) -> ParentRef {
        ParentRef {
            name: self.name.clone(),
            path: self.path.clone(),
            timestamp: self.timestamp,
        }
    }

    /// Calendar day of the timestamp
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn is_heading(&self) -> bool {
        self.kind == ItemKind::Heading
    }

    /// Path of the file this item lives in
    pub fn file_path(&self) -> &str {
        match &self.parent {
            Some(parent) => &parent.path,
            None => &self.path,
        }
    }
}

/// Display title of an item: its name with the date prefix removed
pub fn event_title(item: &DatedItem, format: &PrefixFormat) -> String {
    extract_title(&item.name, &item.timestamp, format)
}
