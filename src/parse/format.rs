//! Date-prefix patterns
//!
//! Patterns use the moment-style tokens that note-taking tools expose in
//! their "unique prefix" settings (`YYYYMMDDHHmm`, `YYYY-MM-DD HHmm`, ...).
//! A pattern is compiled once into chrono format items, which are then used
//! both to parse a prefix off a name and to format a timestamp back into the
//! exact text that prefix would have.
//!
//! | Token        | Meaning                     |
//! |--------------|-----------------------------|
//! | `YYYY` `YY`  | year, two-digit year        |
//! | `MMMM` `MMM` | month name, short name      |
//! | `MM` `M`     | month number                |
//! | `DD` `D`     | day of month                |
//! | `dddd` `ddd` | weekday name, short name    |
//! | `HH` `H`     | hour (24h)                  |
//! | `hh` `h`     | hour (12h)                  |
//! | `mm` `m`     | minute                      |
//! | `ss` `s`     | second                      |
//! | `A` `a`      | AM/PM, am/pm                |
//! | `[text]`     | literal text                |

use chrono::format::{self, Fixed, Item, Numeric, Pad, ParseErrorKind, Parsed};
use chrono::{NaiveDateTime, NaiveTime};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{anychar, char},
    combinator::{cut, map},
    error::ErrorKind,
    sequence::{preceded, terminated},
    IResult,
};

use super::error::{FormatError, FormatResult};

/// Default pattern, matching the "unique note" prefix most vaults use
pub const DEFAULT_PREFIX_FORMAT: &str = "YYYYMMDDHHmm";

/// Tokens in longest-first order so `MMMM` wins over `MM`
const TOKENS: &[(&str, Token)] = &[
    ("YYYY", Token::Numeric(Numeric::Year, Pad::Zero)),
    ("YY", Token::Numeric(Numeric::YearMod100, Pad::Zero)),
    ("MMMM", Token::Fixed(Fixed::LongMonthName)),
    ("MMM", Token::Fixed(Fixed::ShortMonthName)),
    ("MM", Token::Numeric(Numeric::Month, Pad::Zero)),
    ("M", Token::Numeric(Numeric::Month, Pad::None)),
    ("dddd", Token::Fixed(Fixed::LongWeekdayName)),
    ("ddd", Token::Fixed(Fixed::ShortWeekdayName)),
    ("DD", Token::Numeric(Numeric::Day, Pad::Zero)),
    ("D", Token::Numeric(Numeric::Day, Pad::None)),
    ("HH", Token::Numeric(Numeric::Hour, Pad::Zero)),
    ("H", Token::Numeric(Numeric::Hour, Pad::None)),
    ("hh", Token::Numeric(Numeric::Hour12, Pad::Zero)),
    ("h", Token::Numeric(Numeric::Hour12, Pad::None)),
    ("mm", Token::Numeric(Numeric::Minute, Pad::Zero)),
    ("m", Token::Numeric(Numeric::Minute, Pad::None)),
    ("ss", Token::Numeric(Numeric::Second, Pad::Zero)),
    ("s", Token::Numeric(Numeric::Second, Pad::None)),
    ("A", Token::Fixed(Fixed::UpperAmPm)),
    ("a", Token::Fixed(Fixed::LowerAmPm)),
];

#[derive(Debug, Clone)]
enum Token {
    Numeric(Numeric, Pad),
    Fixed(Fixed),
}

impl Token {
    fn is_year(&self) -> bool {
        matches!(
            self,
            Token::Numeric(Numeric::Year, _) | Token::Numeric(Numeric::YearMod100, _)
        )
    }

    fn into_item(self) -> Item<'static> {
        match self {
            Token::Numeric(numeric, pad) => Item::Numeric(numeric, pad),
            Token::Fixed(fixed) => Item::Fixed(fixed),
        }
    }
}

/// A compiled date-prefix pattern
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixFormat {
    pattern: String,
    items: Vec<Item<'static>>,
}

impl Default for PrefixFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PREFIX_FORMAT.to_string(),
            items: vec![
                Item::Numeric(Numeric::Year, Pad::Zero),
                Item::Numeric(Numeric::Month, Pad::Zero),
                Item::Numeric(Numeric::Day, Pad::Zero),
                Item::Numeric(Numeric::Hour, Pad::Zero),
                Item::Numeric(Numeric::Minute, Pad::Zero),
            ],
        }
    }
}

impl PrefixFormat {
    /// Compile a moment-style pattern
    pub fn compile(pattern: &str) -> FormatResult<Self> {
        if pattern.is_empty() {
            return Err(FormatError::Empty);
        }

        let mut items = Vec::new();
        let mut literal = String::new();
        let mut has_year = false;
        let mut rest = pattern;

        while !rest.is_empty() {
            let offset = pattern.len() - rest.len();
            let (next, piece) = parse_piece(rest).map_err(|_| FormatError::UnterminatedLiteral {
                pattern: pattern.to_string(),
                offset,
            })?;

            match piece {
                Piece::Escaped(text) => literal.push_str(text),
                Piece::Char(ch) => literal.push(ch),
                Piece::Token(token) => {
                    flush_literal(&mut literal, &mut items);
                    has_year |= token.is_year();
                    items.push(token.into_item());
                }
            }
            rest = next;
        }
        flush_literal(&mut literal, &mut items);

        if !has_year {
            return Err(FormatError::MissingYear(pattern.to_string()));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            items,
        })
    }

    /// The pattern this format was compiled from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parse a date off the start of `input`
    ///
    /// Returns the timestamp and the unparsed remainder. Fields the pattern
    /// does not carry default to the start of their period (day 1, 00:00).
    pub fn parse_prefix<'s>(&self, input: &'s str) -> Option<(NaiveDateTime, &'s str)> {
        let mut parsed = Parsed::new();
        let remainder = format::parse_and_remainder(&mut parsed, input, self.items.iter()).ok()?;
        let timestamp = resolve(&parsed)?;
        Some((timestamp, remainder))
    }

    /// Render a timestamp exactly as this pattern would write it
    pub fn format(&self, timestamp: &NaiveDateTime) -> String {
        timestamp.format_with_items(self.items.iter()).to_string()
    }
}

impl std::fmt::Display for PrefixFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl std::str::FromStr for PrefixFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

/// One unit of a pattern
enum Piece<'a> {
    Token(Token),
    /// Text inside `[...]`
    Escaped(&'a str),
    Char(char),
}

fn parse_piece(input: &str) -> IResult<&str, Piece<'_>> {
    alt((
        map(
            preceded(char('['), cut(terminated(take_until("]"), char(']')))),
            Piece::Escaped,
        ),
        map(parse_token, Piece::Token),
        map(anychar, Piece::Char),
    ))(input)
}

fn parse_token(input: &str) -> IResult<&str, Token> {
    for (text, token) in TOKENS {
        if let Ok((rest, _)) = tag::<_, _, nom::error::Error<&str>>(*text)(input) {
            return Ok((rest, token.clone()));
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Tag)))
}

fn flush_literal(literal: &mut String, items: &mut Vec<Item<'static>>) {
    if literal.is_empty() {
        return;
    }

    // Whitespace runs parse leniently, everything else must match exactly
    let mut run = String::new();
    let mut run_is_space = false;
    for ch in literal.drain(..) {
        if !run.is_empty() && ch.is_whitespace() != run_is_space {
            items.push(literal_item(std::mem::take(&mut run), run_is_space));
        }
        run_is_space = ch.is_whitespace();
        run.push(ch);
    }
    if !run.is_empty() {
        items.push(literal_item(run, run_is_space));
    }
}

fn literal_item(text: String, is_space: bool) -> Item<'static> {
    if is_space {
        Item::OwnedSpace(text.into_boxed_str())
    } else {
        Item::OwnedLiteral(text.into_boxed_str())
    }
}

/// Turn parsed fields into a timestamp, filling fields the pattern omits
fn resolve(parsed: &Parsed) -> Option<NaiveDateTime> {
    let date = match parsed.to_naive_date() {
        Ok(date) => date,
        Err(e) if e.kind() == ParseErrorKind::NotEnough => {
            let mut filled = parsed.clone();
            let _ = filled.set_month(1);
            let _ = filled.set_day(1);
            filled.to_naive_date().ok()?
        }
        Err(_) => return None,
    };

    let time = match parsed.to_naive_time() {
        Ok(time) => time,
        Err(e) if e.kind() == ParseErrorKind::NotEnough => {
            let mut filled = parsed.clone();
            let _ = filled.set_ampm(false);
            let _ = filled.set_minute(0);
            filled.to_naive_time().unwrap_or(NaiveTime::MIN)
        }
        Err(_) => return None,
    };

    Some(NaiveDateTime::new(date, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_default_matches_compiled() {
        let compiled = PrefixFormat::compile(DEFAULT_PREFIX_FORMAT).unwrap();
        assert_eq!(compiled, PrefixFormat::default());
    }

    #[test]
    fn test_parse_default_prefix() {
        let format = PrefixFormat::default();

        let (ts, rest) = format.parse_prefix("202307141744 Testing").unwrap();
        assert_eq!(ts, at(2023, 7, 14, 17, 44));
        assert_eq!(rest, " Testing");

        let (ts, rest) = format.parse_prefix("202307141746").unwrap();
        assert_eq!(ts, at(2023, 7, 14, 17, 46));
        assert_eq!(rest, "");
    }

    #[test]
    fn test_rejects_non_dates() {
        let format = PrefixFormat::default();

        assert!(format.parse_prefix("Grocery list").is_none());
        assert!(format.parse_prefix("").is_none());
        // Month 13
        assert!(format.parse_prefix("202313011200 Nope").is_none());
        // February 30th
        assert!(format.parse_prefix("202302301200 Nope").is_none());
        // Hour 25
        assert!(format.parse_prefix("202307142500 Nope").is_none());
    }

    #[test]
    fn test_separated_pattern() {
        let format = PrefixFormat::compile("YYYY-MM-DD HHmm").unwrap();

        let (ts, rest) = format.parse_prefix("2023-07-02 1555 Call with Sally").unwrap();
        assert_eq!(ts, at(2023, 7, 2, 15, 55));
        assert_eq!(rest, " Call with Sally");
        assert_eq!(format.format(&ts), "2023-07-02 1555");
    }

    #[test]
    fn test_date_only_pattern_defaults_to_midnight() {
        let format = PrefixFormat::compile("YYYY-MM-DD").unwrap();

        let (ts, _) = format.parse_prefix("2023-05-30 Concert").unwrap();
        assert_eq!(ts, at(2023, 5, 30, 0, 0));
    }

    #[test]
    fn test_year_month_pattern_defaults_to_first_day() {
        let format = PrefixFormat::compile("YYYYMM").unwrap();

        let (ts, _) = format.parse_prefix("202305 Budget").unwrap();
        assert_eq!(ts, at(2023, 5, 1, 0, 0));
    }

    #[test]
    fn test_twelve_hour_pattern() {
        let format = PrefixFormat::compile("YYYY-MM-DD hhmm A").unwrap();

        let (ts, _) = format.parse_prefix("2023-07-02 0355 PM Call").unwrap();
        assert_eq!(ts, at(2023, 7, 2, 15, 55));
        assert_eq!(format.format(&ts), "2023-07-02 0355 PM");
    }

    #[test]
    fn test_escaped_literal() {
        let format = PrefixFormat::compile("YYYY-MM-DD[T]HHmm").unwrap();

        let (ts, rest) = format.parse_prefix("2023-07-02T1555 Call").unwrap();
        assert_eq!(ts, at(2023, 7, 2, 15, 55));
        assert_eq!(rest, " Call");
        assert_eq!(format.format(&ts), "2023-07-02T1555");
    }

    #[test]
    fn test_compile_errors() {
        assert_eq!(PrefixFormat::compile(""), Err(FormatError::Empty));
        assert_eq!(
            PrefixFormat::compile("MMDDHHmm"),
            Err(FormatError::MissingYear("MMDDHHmm".to_string()))
        );
        assert!(matches!(
            PrefixFormat::compile("YYYY[T"),
            Err(FormatError::UnterminatedLiteral { offset: 4, .. })
        ));
    }

    #[test]
    fn test_from_str_and_display() {
        let format: PrefixFormat = "YYYYMMDD".parse().unwrap();
        assert_eq!(format.to_string(), "YYYYMMDD");
        assert_eq!(format.pattern(), "YYYYMMDD");
    }
}
