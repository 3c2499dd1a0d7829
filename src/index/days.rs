//! Day Rollup - calendar day → items on that day
//!
//! Notes and their dated headings are bucketed independently: a heading
//! dated the day after its note shows up on that later day.
//!
//! ```text
//! "2023-07-13" → [12:41 Grocery list]
//! "2023-07-14" → [17:44 Testing, 17:46 202307141746]
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::index::DatedItem;

/// Day → items, each bucket ordered by timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DayRollup {
    days: BTreeMap<NaiveDate, Vec<DatedItem>>,
}

impl DayRollup {
    /// Notes and their headings, merged and sorted per day
    pub fn build(items: &[DatedItem]) -> Self {
        let mut rollup = Self::notes_by_day(items).merge(Self::headings_by_day(items));
        rollup.sort();
        rollup
    }

    /// Top-level items only, in encounter order
    pub fn notes_by_day(items: &[DatedItem]) -> Self {
        let mut rollup = Self::default();
        for item in items {
            rollup.push(item.clone());
        }
        rollup
    }

    /// Sub-items of every item, flattened one level, in encounter order
    pub fn headings_by_day(items: &[DatedItem]) -> Self {
        let mut rollup = Self::default();
        for heading in items.iter().flat_map(|item| item.sub_items.iter()) {
            rollup.push(heading.clone());
        }
        rollup
    }

    /// Append `other`'s buckets after this rollup's buckets for the same day
    pub fn merge(mut self, other: DayRollup) -> Self {
        for (day, items) in other.days {
            self.days.entry(day).or_default().extend(items);
        }
        self
    }

    fn push(&mut self, item: DatedItem) {
        self.days.entry(item.day()).or_default().push(item);
    }

    /// Stable sort of every bucket by timestamp
    fn sort(&mut self) {
        for items in self.days.values_mut() {
            items.sort_by_key(|item| item.timestamp);
        }
    }

    /// Items on `day`; empty when nothing falls on it
    pub fn get(&self, day: NaiveDate) -> &[DatedItem] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[DatedItem])> {
        self.days.iter().map(|(day, items)| (*day, items.as_slice()))
    }

    /// Earliest and latest day with items
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = *self.days.keys().next()?;
        let last = *self.days.keys().next_back()?;
        Some((first, last))
    }

    /// Number of days with items
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Build a [`DayRollup`] from a flat item list
pub fn build_day_rollup(items: &[DatedItem]) -> DayRollup {
    DayRollup::build(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 7, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 7, d).unwrap()
    }

    fn note(name: &str, timestamp: NaiveDateTime) -> DatedItem {
        DatedItem::note(name, format!("{}.md", name), timestamp)
    }

    #[test]
    fn test_sorted_within_day() {
        let items = vec![
            note("202307141746", ts(14, 17, 46)),
            note("202307141744 Testing", ts(14, 17, 44)),
            note("202307131241 Grocery list", ts(13, 12, 41)),
        ];
        let rollup = build_day_rollup(&items);

        assert_eq!(rollup.len(), 2);
        let names: Vec<&str> = rollup.get(day(14)).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["202307141744 Testing", "202307141746"]);
        assert_eq!(rollup.get(day(13)).len(), 1);
        assert!(rollup.get(day(15)).is_empty());
    }

    #[test]
    fn test_headings_land_on_their_own_day() {
        let mut trip = note("202307281200 Trip to Portland", ts(28, 12, 0));
        let breakfast = DatedItem::heading("202307290900 Breakfast", &trip, ts(29, 9, 0));
        let lunch = DatedItem::heading("202307281130 Lunch", &trip, ts(28, 11, 30));
        trip.sub_items = vec![breakfast, lunch];

        let rollup = build_day_rollup(&[trip]);

        let on_28: Vec<&str> = rollup.get(day(28)).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(on_28, vec!["202307281130 Lunch", "202307281200 Trip to Portland"]);

        let on_29 = rollup.get(day(29));
        assert_eq!(on_29.len(), 1);
        assert!(on_29[0].is_heading());
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let items = vec![
            note("202307141200 First", ts(14, 12, 0)),
            note("202307141200 Second", ts(14, 12, 0)),
            note("202307141100 Earlier", ts(14, 11, 0)),
        ];
        let rollup = build_day_rollup(&items);

        let names: Vec<&str> = rollup.get(day(14)).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["202307141100 Earlier", "202307141200 First", "202307141200 Second"]
        );
    }

    #[test]
    fn test_every_item_in_exactly_one_bucket() {
        let items: Vec<DatedItem> = (1..=20)
            .map(|i| note(&format!("item {}", i), ts(1 + i % 7, i % 24, 0)))
            .collect();
        let rollup = build_day_rollup(&items);

        for item in &items {
            let hits: Vec<NaiveDate> = rollup
                .iter()
                .filter(|(_, bucket)| bucket.contains(item))
                .map(|(d, _)| d)
                .collect();
            assert_eq!(hits, vec![item.day()]);
        }
        for (_, bucket) in rollup.iter() {
            assert!(bucket.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        }
    }

    #[test]
    fn test_merge_appends() {
        let a = DayRollup::notes_by_day(&[note("a", ts(1, 10, 0))]);
        let b = DayRollup::notes_by_day(&[note("b", ts(1, 9, 0)), note("c", ts(2, 9, 0))]);
        let merged = a.merge(b);

        let names: Vec<&str> = merged.get(day(1)).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(merged.bounds(), Some((day(1), day(2))));
    }

    #[test]
    fn test_empty() {
        let rollup = build_day_rollup(&[]);
        assert!(rollup.is_empty());
        assert_eq!(rollup.bounds(), None);
        assert_eq!(serde_json::to_string(&rollup).unwrap(), "{}");
    }
}
