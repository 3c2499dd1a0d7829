//! Item Index Builder - documents → dated items
//!
//! Runs the prefix parser over every document name and, when a headings
//! provider is given, over every heading of each dated note. Anything that
//! doesn't parse is left out.

use std::collections::{HashMap, HashSet};

use crate::index::DatedItem;
use crate::parse::{parse_dated_name, PrefixFormat};
use crate::source::DocumentRecord;

/// Supplies the heading texts of a document
///
/// Headings are fetched up front (see [`HeadingMap`]) so that index
/// construction itself never waits on I/O.
pub trait HeadingsProvider {
    fn headings(&self, document: &DocumentRecord) -> Vec<String>;
}

impl<F> HeadingsProvider for F
where
    F: Fn(&DocumentRecord) -> Vec<String>,
{
    fn headings(&self, document: &DocumentRecord) -> Vec<String> {
        self(document)
    }
}

/// Pre-fetched headings keyed by document path
#[derive(Debug, Clone, Default)]
pub struct HeadingMap {
    by_path: HashMap<String, Vec<String>>,
}

impl HeadingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the headings of one document
    pub fn insert(&mut self, path: impl Into<String>, headings: Vec<String>) {
        self.by_path.insert(path.into(), headings);
    }

    /// Number of documents with recorded headings
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

impl HeadingsProvider for HeadingMap {
    fn headings(&self, document: &DocumentRecord) -> Vec<String> {
        self.by_path.get(&document.path).cloned().unwrap_or_default()
    }
}

/// Build the flat list of dated items
///
/// Output order follows `documents`. Each dated heading is attached to its
/// note's `sub_items`; repeated heading texts within one note are kept once
/// so every item path stays unique.
pub fn build_index(
    documents: &[DocumentRecord],
    format: &PrefixFormat,
    headings: Option<&dyn HeadingsProvider>,
) -> Vec<DatedItem> {
    let mut heading_count = 0usize;

    let items: Vec<DatedItem> = documents
        .iter()
        .filter_map(|document| {
            let dated = parse_dated_name(&document.name, format)?;
            let mut note = DatedItem::note(&document.name, &document.path, dated.timestamp);

            if let Some(provider) = headings {
                let mut seen = HashSet::new();
                let sub_items: Vec<DatedItem> = provider
                    .headings(document)
                    .into_iter()
                    .filter(|text| seen.insert(text.clone()))
                    .filter_map(|text| {
                        let (timestamp, _) = format.parse_prefix(&text)?;
                        Some(DatedItem::heading(text, &note, timestamp))
                    })
                    .collect();
                heading_count += sub_items.len();
                note.sub_items = sub_items;
            }

            Some(note)
        })
        .collect();

    tracing::debug!(
        documents = documents.len(),
        notes = items.len(),
        headings = heading_count,
        format = %format,
        "Built dated item index"
    );

    items
}
