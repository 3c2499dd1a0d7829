//! Sliding Window - contiguous days around a reference date
//!
//! The agenda shows a fixed span of days centred on a reference date, with
//! empty days included so the list reads like a calendar. Scrolling past
//! either end re-centres the window on the first or last day shown.
//!
//! Boundaries are clamped to [`WindowBounds`]: a name such as `"1999 goals"`
//! can parse as a far-off date, and the window must not stretch to reach it.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::index::{DatedItem, DayRollup};

/// Total days around the reference date (half before, half after)
pub const WINDOW_SPAN_DAYS: u64 = 120;

/// Span and clamping limits for a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    /// Earliest day a window may start on
    pub earliest: NaiveDate,
    /// Latest day a window may end on
    pub latest: NaiveDate,
    /// Total days around the reference date
    pub span_days: u64,
}

impl Default for WindowBounds {
    fn default() -> Self {
        Self {
            earliest: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or(NaiveDate::MIN),
            latest: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap_or(NaiveDate::MAX),
            span_days: WINDOW_SPAN_DAYS,
        }
    }
}

impl WindowBounds {
    fn clamp(&self, day: NaiveDate) -> NaiveDate {
        day.clamp(self.earliest, self.latest)
    }

    /// First and last day of the window centred on `reference`
    pub fn range(&self, reference: NaiveDate) -> (NaiveDate, NaiveDate) {
        let half = Days::new(self.span_days / 2);
        let start = reference
            .checked_sub_days(half)
            .unwrap_or(self.earliest);
        let end = reference.checked_add_days(half).unwrap_or(self.latest);
        (self.clamp(start), self.clamp(end))
    }
}

/// One calendar day and everything on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub items: Vec<DatedItem>,
}

impl DayBucket {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A contiguous, gap-free run of day buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlidingWindow {
    reference: NaiveDate,
    days: Vec<DayBucket>,
}

impl SlidingWindow {
    /// Window centred on `reference`
    pub fn build(rollup: &DayRollup, reference: NaiveDate, bounds: &WindowBounds) -> Self {
        let (start, end) = bounds.range(reference);

        let days: Vec<DayBucket> = start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(|date| DayBucket {
                date,
                items: rollup.get(date).to_vec(),
            })
            .collect();

        tracing::trace!(%reference, %start, %end, days = days.len(), "Built sliding window");

        Self { reference, days }
    }

    /// The window before this one, centred on its first day
    pub fn earlier(&self, rollup: &DayRollup, bounds: &WindowBounds) -> Self {
        Self::build(rollup, self.first_date().unwrap_or(self.reference), bounds)
    }

    /// The window after this one, centred on its last day
    pub fn later(&self, rollup: &DayRollup, bounds: &WindowBounds) -> Self {
        Self::build(rollup, self.last_date().unwrap_or(self.reference), bounds)
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn days(&self) -> &[DayBucket] {
        &self.days
    }

    pub fn into_days(self) -> Vec<DayBucket> {
        self.days
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|bucket| bucket.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|bucket| bucket.date)
    }

    /// Index of `date` within the window
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        let first = self.first_date()?;
        let offset = usize::try_from((date - first).num_days()).ok()?;
        (offset < self.days.len()).then_some(offset)
    }

    /// Total number of items across the window
    pub fn item_count(&self) -> usize {
        self.days.iter().map(|bucket| bucket.items.len()).sum()
    }
}

/// Day buckets for the default window centred on `reference`
pub fn build_sliding_window(rollup: &DayRollup, reference: NaiveDate) -> Vec<DayBucket> {
    SlidingWindow::build(rollup, reference, &WindowBounds::default()).into_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_day_rollup;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn note_on(date: NaiveDate, hour: u32, name: &str) -> DatedItem {
        DatedItem::note(name, format!("{}.md", name), date.and_hms_opt(hour, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_rollup_gives_full_empty_window() {
        let days = build_sliding_window(&DayRollup::default(), day(2023, 7, 14));

        assert_eq!(days.len(), 121);
        assert!(days.iter().all(DayBucket::is_empty));
        assert_eq!(days[0].date, day(2023, 5, 15));
        assert_eq!(days[60].date, day(2023, 7, 14));
        assert_eq!(days[120].date, day(2023, 9, 12));
    }

    #[test]
    fn test_contiguous_without_gaps() {
        let days = build_sliding_window(&DayRollup::default(), day(2024, 2, 10));

        for pair in days.windows(2) {
            assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
        }
    }

    #[test]
    fn test_items_placed_on_their_day() {
        let items = vec![
            note_on(day(2023, 7, 14), 17, "late"),
            note_on(day(2023, 7, 14), 9, "early"),
            note_on(day(2023, 7, 13), 12, "before"),
            note_on(day(2022, 1, 1), 12, "out of range"),
        ];
        let rollup = build_day_rollup(&items);
        let window = SlidingWindow::build(&rollup, day(2023, 7, 14), &WindowBounds::default());

        let today = &window.days()[window.position(day(2023, 7, 14)).unwrap()];
        let names: Vec<&str> = today.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["early", "late"]);
        assert_eq!(window.item_count(), 3);
    }

    #[test]
    fn test_recentering() {
        let rollup = DayRollup::default();
        let bounds = WindowBounds::default();
        let window = SlidingWindow::build(&rollup, day(2023, 7, 14), &bounds);

        let later = window.later(&rollup, &bounds);
        assert_eq!(later.reference(), day(2023, 9, 12));
        assert_eq!(later.first_date(), Some(day(2023, 7, 14)));

        let earlier = window.earlier(&rollup, &bounds);
        assert_eq!(earlier.reference(), day(2023, 5, 15));
        assert_eq!(earlier.last_date(), Some(day(2023, 7, 14)));
    }

    #[test]
    fn test_clamped_at_bounds() {
        let rollup = DayRollup::default();

        let days = build_sliding_window(&rollup, day(2010, 1, 20));
        assert_eq!(days[0].date, day(2010, 1, 1));
        assert_eq!(days.last().unwrap().date, day(2010, 3, 21));
        assert_eq!(days.len(), 80);

        let days = build_sliding_window(&rollup, day(2030, 12, 1));
        assert_eq!(days.last().unwrap().date, day(2030, 12, 31));

        // A reference far outside the range collapses onto the boundary
        let days = build_sliding_window(&rollup, day(1986, 6, 1));
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, day(2010, 1, 1));
    }

    #[test]
    fn test_position_outside_window() {
        let window = SlidingWindow::build(&DayRollup::default(), day(2023, 7, 14), &WindowBounds::default());
        assert_eq!(window.position(day(2023, 7, 14)), Some(60));
        assert_eq!(window.position(day(2024, 1, 1)), None);
        assert_eq!(window.position(day(2023, 1, 1)), None);
    }
}
