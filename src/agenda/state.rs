//! Agenda state - everything a view needs, rebuilt as a whole
//!
//! ```text
//! source ──refresh──▶ items ──▶ folders ──select──▶ shown items ──▶ days ──▶ window
//! ```
//!
//! Every refresh recomputes the full chain. Folder selection and window
//! moves only recompute the part after the step that changed.

use chrono::{Local, NaiveDate};

use crate::config::{Config, ConfigError};
use crate::index::{
    build_index, DatedItem, DayBucket, DayRollup, FolderRollup, HeadingMap, HeadingsProvider,
    SlidingWindow, WindowBounds,
};
use crate::parse::PrefixFormat;
use crate::source::{DocumentRecord, DocumentSource, SourceError, Subscription};

/// Snapshot of the settings an agenda is built with
#[derive(Debug, Clone, PartialEq)]
pub struct AgendaSettings {
    pub format: PrefixFormat,
    pub include_headings: bool,
    /// Small-screen rendering (hide empty days)
    pub compact: bool,
}

impl Default for AgendaSettings {
    fn default() -> Self {
        Self {
            format: PrefixFormat::default(),
            include_headings: true,
            compact: false,
        }
    }
}

impl AgendaSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            format: config.prefix_format()?,
            include_headings: config.agenda.include_headings,
            compact: false,
        })
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Derived agenda data for one vault
#[derive(Debug, Clone)]
pub struct AgendaState {
    settings: AgendaSettings,
    bounds: WindowBounds,
    clock: fn() -> NaiveDate,

    items: Vec<DatedItem>,
    folders: FolderRollup,
    folder_names: Vec<String>,
    selected_folder: String,

    reference: NaiveDate,
    days: DayRollup,
    window: SlidingWindow,
}

impl AgendaState {
    /// Empty state centred on today
    pub fn new(settings: AgendaSettings) -> Self {
        Self::with_clock(settings, local_today)
    }

    /// Empty state with a custom notion of "today"
    pub fn with_clock(settings: AgendaSettings, clock: fn() -> NaiveDate) -> Self {
        let bounds = WindowBounds::default();
        let reference = clock();
        let days = DayRollup::default();
        let window = SlidingWindow::build(&days, reference, &bounds);

        Self {
            settings,
            bounds,
            clock,
            items: Vec::new(),
            folders: FolderRollup::default(),
            folder_names: Vec::new(),
            selected_folder: String::new(),
            reference,
            days,
            window,
        }
    }

    /// Re-read `source` and rebuild every derived structure
    pub async fn refresh<S>(&mut self, source: &S) -> Result<(), SourceError>
    where
        S: DocumentSource + ?Sized,
    {
        let documents = source.list_documents().await?;

        let headings = if self.settings.include_headings && source.supports_headings() {
            Some(fetch_headings(source, &documents, &self.settings.format).await)
        } else {
            None
        };

        self.rebuild(&documents, headings.as_ref());
        Ok(())
    }

    /// Rebuild from an already fetched listing
    pub fn rebuild(&mut self, documents: &[DocumentRecord], headings: Option<&HeadingMap>) {
        let provider = headings.map(|map| map as &dyn HeadingsProvider);
        self.items = build_index(documents, &self.settings.format, provider);
        self.folders = FolderRollup::build(&self.items);
        self.folder_names = self.folders.folder_names();

        if !self.selected_folder.is_empty() && !self.folders.contains(&self.selected_folder) {
            tracing::info!(folder = %self.selected_folder, "Selected folder no longer has dated items, showing all");
            self.selected_folder.clear();
        }

        self.rebuild_days();

        tracing::debug!(
            items = self.items.len(),
            folders = self.folder_names.len(),
            days = self.days.len(),
            "Agenda rebuilt"
        );
    }

    fn rebuild_days(&mut self) {
        self.days = DayRollup::build(self.items_to_show());
        self.rebuild_window();
    }

    fn rebuild_window(&mut self) {
        self.window = SlidingWindow::build(&self.days, self.reference, &self.bounds);
    }

    /// Show only items under `key` (`""` for all)
    ///
    /// Returns `false` and falls back to all items when `key` holds no dated
    /// items.
    pub fn select_folder(&mut self, key: &str) -> bool {
        let known = key.is_empty() || self.folders.contains(key);
        self.selected_folder = if known { key.to_string() } else { String::new() };
        self.rebuild_days();
        known
    }

    /// Centre the window on `date`
    pub fn set_reference_date(&mut self, date: NaiveDate) {
        self.reference = date;
        self.rebuild_window();
    }

    /// Centre the window on today
    pub fn go_to_today(&mut self) {
        self.set_reference_date((self.clock)());
    }

    /// Re-centre on the first day currently shown
    pub fn load_earlier(&mut self) {
        self.window = self.window.earlier(&self.days, &self.bounds);
        self.reference = self.window.reference();
    }

    /// Re-centre on the last day currently shown
    pub fn load_later(&mut self) {
        self.window = self.window.later(&self.days, &self.bounds);
        self.reference = self.window.reference();
    }

    /// Items of the selected folder, or every item when none is selected
    pub fn items_to_show(&self) -> &[DatedItem] {
        if self.selected_folder.is_empty() {
            return &self.items;
        }
        self.folders.get(&self.selected_folder).unwrap_or(&self.items)
    }

    /// Index of today's bucket, if today is inside the window
    pub fn today_position(&self) -> Option<usize> {
        self.window.position((self.clock)())
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn settings(&self) -> &AgendaSettings {
        &self.settings
    }

    pub fn items(&self) -> &[DatedItem] {
        &self.items
    }

    pub fn folders(&self) -> &FolderRollup {
        &self.folders
    }

    pub fn folder_names(&self) -> &[String] {
        &self.folder_names
    }

    /// Selected folder key, `""` meaning all folders
    pub fn selected_folder(&self) -> &str {
        &self.selected_folder
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference
    }

    pub fn day_rollup(&self) -> &DayRollup {
        &self.days
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn days(&self) -> &[DayBucket] {
        self.window.days()
    }

    /// Refresh on every event until the subscription closes
    ///
    /// `on_refresh` runs after each rebuild. A failed refresh ends the loop.
    pub async fn follow<S, F>(
        &mut self,
        source: &S,
        subscription: &mut Subscription,
        mut on_refresh: F,
    ) -> Result<(), SourceError>
    where
        S: DocumentSource + ?Sized,
        F: FnMut(&AgendaState),
    {
        while let Some(event) = subscription.recv().await {
            tracing::debug!(%event, source = source.name(), "Refreshing agenda");
            self.refresh(source).await?;
            on_refresh(self);
        }

        tracing::debug!("Vault subscription closed");
        Ok(())
    }
}

/// Headings of every dated document
///
/// Undated documents are skipped since their headings would be dropped by
/// the index anyway. Unreadable documents are logged and left out.
async fn fetch_headings<S>(source: &S, documents: &[DocumentRecord], format: &PrefixFormat) -> HeadingMap
where
    S: DocumentSource + ?Sized,
{
    let mut map = HeadingMap::new();

    for document in documents {
        if format.parse_prefix(&document.name).is_none() {
            continue;
        }
        match source.headings(document).await {
            Ok(headings) => map.insert(document.path.clone(), headings),
            Err(e) => tracing::warn!(path = %document.path, "Failed to read headings: {}", e),
        }
    }

    map
}
