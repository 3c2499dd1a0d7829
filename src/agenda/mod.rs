//! Agenda orchestration
//!
//! Ties sources, index structures and rendering together:
//!
//! - **AgendaState**: owns the derived structures and rebuilds them on change
//! - **calendar**: month-list events for a calendar view
//! - **views**: named text renderers over the state

mod calendar;
mod state;
mod views;

pub use calendar::{calendar_events, month_listing, CalendarEvent, MonthDay};
pub use state::{AgendaSettings, AgendaState};
pub use views::{AgendaView, CalendarView, View, ViewError, ViewOptions, ViewRegistry};
