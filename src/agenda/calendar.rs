//! Calendar events for a month listing

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::index::{event_title, DatedItem};
use crate::parse::PrefixFormat;

/// One entry on the calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDateTime,
    /// Where the item lives, for opening it
    pub path: String,
}

/// Days of one month that have events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthDay {
    pub date: NaiveDate,
    pub events: Vec<CalendarEvent>,
}

/// Events for `items` and their dated headings
pub fn calendar_events(items: &[DatedItem], format: &PrefixFormat) -> Vec<CalendarEvent> {
    items
        .iter()
        .flat_map(|item| std::iter::once(item).chain(item.sub_items.iter()))
        .map(|item| CalendarEvent {
            title: event_title(item, format),
            start: item.timestamp,
            path: item.path.clone(),
        })
        .collect()
}

/// Events falling in `year`/`month`, grouped by day in time order
///
/// Days without events are left out, the way a list calendar shows them.
pub fn month_listing(events: &[CalendarEvent], year: i32, month: u32) -> Vec<MonthDay> {
    let mut in_month: Vec<&CalendarEvent> = events
        .iter()
        .filter(|event| event.start.year() == year && event.start.month() == month)
        .collect();
    in_month.sort_by_key(|event| event.start);

    let mut days: Vec<MonthDay> = Vec::new();
    for event in in_month {
        let date = event.start.date();
        match days.last_mut() {
            Some(last) if last.date == date => last.events.push(event.clone()),
            _ => days.push(MonthDay {
                date,
                events: vec![event.clone()],
            }),
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;
    use crate::source::DocumentRecord;

    fn items() -> Vec<DatedItem> {
        let documents: Vec<DocumentRecord> = [
            "202307141746.md",
            "202307141744 Testing.md",
            "Trips/202307281200 Trip to Portland.md",
            "202306301000 June review.md",
        ]
        .into_iter()
        .map(DocumentRecord::from_path)
        .collect();

        let headings = |document: &DocumentRecord| {
            if document.name.contains("Trip") {
                vec!["202307290900 Breakfast".to_string()]
            } else {
                Vec::new()
            }
        };
        build_index(&documents, &PrefixFormat::default(), Some(&headings))
    }

    #[test]
    fn test_calendar_events() {
        let events = calendar_events(&items(), &PrefixFormat::default());

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].title, "202307141746");
        assert_eq!(events[1].title, "Testing");
        assert_eq!(events[3].title, "Breakfast");
        assert_eq!(
            events[3].path,
            "Trips/202307281200 Trip to Portland.md#202307290900 Breakfast"
        );
    }

    #[test]
    fn test_month_listing() {
        let events = calendar_events(&items(), &PrefixFormat::default());
        let july = month_listing(&events, 2023, 7);

        let dates: Vec<u32> = july.iter().map(|d| d.date.day()).collect();
        assert_eq!(dates, vec![14, 28, 29]);

        let titles: Vec<&str> = july[0].events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Testing", "202307141746"]);

        assert_eq!(month_listing(&events, 2023, 6).len(), 1);
        assert!(month_listing(&events, 2023, 8).is_empty());
    }
}
