//! # Almanac
//!
//! Date-prefix indexing for Markdown vaults - turns note names like
//! `"202307141744 Testing"` into a calendar.
//!
//! ## Features
//!
//! - **Configurable prefixes**: moment-style patterns (`YYYYMMDDHHmm`, `YYYY-MM-DD`, ...)
//! - **Dated headings**: headings that start with a date show up as their own items
//! - **Folder rollups**: filter the agenda to any folder and everything below it
//! - **Sliding window**: a gap-free run of days around a reference date
//! - **Live updates**: rebuild on every create, rename or delete in the vault
//!
//! ## Modules
//!
//! - [`parse`]: Date-prefix parser and title extraction
//! - [`index`]: Dated items, folder/day rollups and the sliding window
//! - [`source`]: Document sources (filesystem vault, in-memory)
//! - [`agenda`]: Agenda state, calendar events and text views
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use almanac::agenda::{AgendaSettings, AgendaState, ViewOptions, ViewRegistry};
//! use almanac::source::FsVault;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let vault = FsVault::new("/path/to/vault");
//!
//!     // Index the vault around today
//!     let mut agenda = AgendaState::new(AgendaSettings::default());
//!     agenda.refresh(&vault).await?;
//!
//!     // Narrow down to one folder
//!     agenda.select_folder("Work/");
//!
//!     let views = ViewRegistry::with_defaults();
//!     println!("{}", views.render("agenda", &agenda, &ViewOptions::default())?);
//!
//!     Ok(())
//! }
//! ```

pub mod agenda;
pub mod config;
pub mod index;
pub mod parse;
pub mod source;

// Re-export top-level types for convenience
pub use parse::{
    extract_title, parse_dated_name, DatedName, FormatError, FormatResult, PrefixFormat,
    DEFAULT_PREFIX_FORMAT,
};

pub use index::{
    build_day_rollup, build_folder_rollup, build_index, build_sliding_window, event_title,
    DatedItem, DayBucket, DayRollup, FolderRollup, HeadingMap, HeadingsProvider, ItemKind,
    ParentRef, SlidingWindow, WindowBounds, WINDOW_SPAN_DAYS,
};

pub use source::{
    DocumentRecord, DocumentSource, FsVault, MemorySource, SourceError, Subscription, VaultEvent,
};

pub use agenda::{
    calendar_events, month_listing, AgendaSettings, AgendaState, AgendaView, CalendarEvent,
    CalendarView, View, ViewError, ViewOptions, ViewRegistry,
};

pub use config::{AgendaConfig, Config, ConfigError, LoggingConfig, VaultConfig};
