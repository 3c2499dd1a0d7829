//! Text views over an [`AgendaState`]
//!
//! Views are registered by name so front ends can pick one at runtime:
//!
//! - **agenda**: every day of the window with its timed items
//! - **calendar**: a month list of the days that have items

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate};

use super::calendar::{calendar_events, month_listing};
use super::state::AgendaState;
use crate::index::event_title;

/// Per-render options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Hide empty days
    pub compact: bool,
    /// Month to list as (year, month); defaults to the reference date's
    pub month: Option<(i32, u32)>,
}

/// Something that renders agenda state as text
pub trait View: Send + Sync {
    /// Registry key
    fn name(&self) -> &str;

    /// Title shown on the panel or tab
    fn display_name(&self) -> &str;

    /// Icon identifier for hosts that show one
    fn icon(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    fn render(&self, state: &AgendaState, options: &ViewOptions) -> Result<String, ViewError>;
}

/// Errors raised when looking up or rendering a view
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Unknown view: {0}")]
    UnknownView(String),

    #[error("Invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Day-by-day listing of the sliding window
#[derive(Debug, Default)]
pub struct AgendaView;

impl View for AgendaView {
    fn name(&self) -> &str {
        "agenda"
    }

    fn display_name(&self) -> &str {
        "Almanac: Agenda"
    }

    fn icon(&self) -> &str {
        "calendar-days"
    }

    fn description(&self) -> &str {
        "Every day around the reference date, with timed items"
    }

    fn render(&self, state: &AgendaState, options: &ViewOptions) -> Result<String, ViewError> {
        let format = &state.settings().format;
        let compact = options.compact || state.settings().compact;
        let today = state.today();

        let mut out = String::new();
        let mut month_shown: Option<(i32, u32)> = None;

        for bucket in state.days() {
            if compact && bucket.is_empty() {
                continue;
            }

            let month = (bucket.date.year(), bucket.date.month());
            if month_shown != Some(month) {
                if month_shown.is_some() {
                    out.push('\n');
                }
                let _ = writeln!(out, "{}", bucket.date.format("%B %Y"));
                month_shown = Some(month);
            }

            let marker = if bucket.date == today { "  (today)" } else { "" };
            let _ = writeln!(out, "{}{}", bucket.date.format("%d %a"), marker);

            if bucket.is_empty() {
                let _ = writeln!(out, "    No events");
                continue;
            }
            for item in &bucket.items {
                let _ = writeln!(
                    out,
                    "    {:>8}  {}",
                    item.timestamp.format("%-I:%M %P").to_string(),
                    event_title(item, format)
                );
            }
        }

        if out.is_empty() {
            out.push_str("No events\n");
        }
        Ok(out)
    }
}

/// Month list of days with items
#[derive(Debug, Default)]
pub struct CalendarView;

impl View for CalendarView {
    fn name(&self) -> &str {
        "calendar"
    }

    fn display_name(&self) -> &str {
        "Almanac: Calendar"
    }

    fn icon(&self) -> &str {
        "calendar"
    }

    fn description(&self) -> &str {
        "Days with items in one month"
    }

    fn render(&self, state: &AgendaState, options: &ViewOptions) -> Result<String, ViewError> {
        let reference = state.reference_date();
        let (year, month) = options
            .month
            .unwrap_or((reference.year(), reference.month()));
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(ViewError::InvalidMonth { year, month })?;

        let events = calendar_events(state.items_to_show(), &state.settings().format);
        let listing = month_listing(&events, year, month);

        let mut out = String::new();
        let _ = writeln!(out, "{}", first.format("%B %Y"));

        if listing.is_empty() {
            let _ = writeln!(out, "  No events to display");
            return Ok(out);
        }

        for day in listing {
            let _ = writeln!(out, "\n{}", day.date.format("%A, %B %-d, %Y"));
            for event in &day.events {
                let _ = writeln!(
                    out,
                    "  {:>7}  {}",
                    event.start.format("%-I:%M%P").to_string(),
                    event.title
                );
            }
        }
        Ok(out)
    }
}

/// Views by name
pub struct ViewRegistry {
    views: BTreeMap<String, Box<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self {
            views: BTreeMap::new(),
        }
    }

    /// Registry with the agenda and calendar views
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(AgendaView));
        registry.register(Box::new(CalendarView));
        registry
    }

    /// Add a view, replacing any view with the same name
    pub fn register(&mut self, view: Box<dyn View>) {
        tracing::debug!(view = view.name(), "Registered view");
        self.views.insert(view.name().to_string(), view);
    }

    pub fn get(&self, name: &str) -> Result<&dyn View, ViewError> {
        self.views
            .get(name)
            .map(|view| view.as_ref())
            .ok_or_else(|| ViewError::UnknownView(name.to_string()))
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.views.keys().map(String::as_str).collect()
    }

    /// Look up and render in one step
    pub fn render(
        &self,
        name: &str,
        state: &AgendaState,
        options: &ViewOptions,
    ) -> Result<String, ViewError> {
        self.get(name)?.render(state, options)
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
