//! Almanac Date-Prefix Parser
//!
//! Recognises names that begin with a date written in a configurable
//! pattern:
//!
//! - **format**: moment-style pattern compiled to chrono format items
//! - **dated_name**: prefix parsing and title extraction
//! - **error**: pattern compilation errors
//!
//! # Example
//!
//! ```rust
//! use almanac::parse::{parse_dated_name, PrefixFormat};
//!
//! let format = PrefixFormat::default(); // YYYYMMDDHHmm
//! let dated = parse_dated_name("202307021555 Call with Sally", &format).unwrap();
//! assert_eq!(dated.title, "Call with Sally");
//!
//! assert!(parse_dated_name("Grocery list", &format).is_none());
//! ```

pub mod dated_name;
pub mod error;
pub mod format;

pub use dated_name::{extract_title, parse_dated_name, DatedName};
pub use error::{FormatError, FormatResult};
pub use format::{PrefixFormat, DEFAULT_PREFIX_FORMAT};
