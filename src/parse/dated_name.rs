//! Date-prefixed names
//!
//! `"202305191400 Meeting - Check-in with Joe"` → 2023-05-19 14:00, title
//! `"Meeting - Check-in with Joe"`.

use chrono::NaiveDateTime;

use super::format::PrefixFormat;

/// The dated part of a name, plus the title left once the date is removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedName {
    pub timestamp: NaiveDateTime,
    pub title: String,
}

/// Parse a date prefix off `raw_name`
///
/// Returns `None` when the name does not start with a valid date in
/// `format`. Callers treat that as "not dated" and skip the document.
pub fn parse_dated_name(raw_name: &str, format: &PrefixFormat) -> Option<DatedName> {
    let (timestamp, _) = format.parse_prefix(raw_name)?;
    let title = extract_title(raw_name, &timestamp, format);
    Some(DatedName { timestamp, title })
}

/// Strip the formatted date out of `raw_name`
///
/// The timestamp is rendered with `format` and its first occurrence removed.
/// A name that is only a date keeps the raw name as its title.
pub fn extract_title(raw_name: &str, timestamp: &NaiveDateTime, format: &PrefixFormat) -> String {
    let formatted = format.format(timestamp);
    let remainder = raw_name.replacen(&formatted, "", 1);
    let title = remainder.trim();

    if title.is_empty() {
        raw_name.to_string()
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_title_after_date() {
        let format = PrefixFormat::default();
        let dated = parse_dated_name("202305191400 Meeting - Check-in with Joe", &format).unwrap();

        assert_eq!(
            dated.timestamp,
            NaiveDate::from_ymd_opt(2023, 5, 19)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap()
        );
        assert_eq!(dated.title, "Meeting - Check-in with Joe");
    }

    #[test]
    fn test_date_only_name_keeps_raw_title() {
        let format = PrefixFormat::default();
        let dated = parse_dated_name("202307141746", &format).unwrap();
        assert_eq!(dated.title, "202307141746");
    }

    #[test]
    fn test_not_dated() {
        let format = PrefixFormat::default();
        assert!(parse_dated_name("Grocery list", &format).is_none());
        assert!(parse_dated_name("Porsche Boxster 986", &format).is_none());
    }

    #[test]
    fn test_only_first_occurrence_removed() {
        let format = PrefixFormat::compile("YYYYMMDD").unwrap();
        let dated = parse_dated_name("20230714 follow-up to 20230714", &format).unwrap();
        assert_eq!(dated.title, "follow-up to 20230714");
    }

    #[test]
    fn test_title_round_trip() {
        let format = PrefixFormat::compile("YYYY-MM-DD HHmm").unwrap();
        for name in [
            "2023-07-02 1555 Call with Sally (Offer call)",
            "2022-12-20 1130   Call with Dan's Auto  ",
            "2023-05-30 1400",
        ] {
            let dated = parse_dated_name(name, &format).unwrap();
            assert_eq!(extract_title(name, &dated.timestamp, &format), dated.title);
        }
    }
}
