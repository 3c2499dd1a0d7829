//! Prefix format error types
//!
//! Parsing a *name* never fails loudly (a name without a date is simply not
//! dated); only compiling a malformed *pattern* is an error.

use thiserror::Error;

/// Errors raised while compiling a date-prefix pattern
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// `[` escape without a closing `]`
    #[error("Unterminated literal in prefix format {pattern:?} at byte {offset}")]
    UnterminatedLiteral { pattern: String, offset: usize },

    /// Pattern has no year token, so no absolute date can be recovered
    #[error("Prefix format {0:?} has no year token (YYYY or YY)")]
    MissingYear(String),

    /// Empty pattern
    #[error("Prefix format is empty")]
    Empty,
}

/// Result type alias for format compilation
pub type FormatResult<T> = Result<T, FormatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FormatError::MissingYear("MMDD".to_string());
        assert_eq!(
            err.to_string(),
            "Prefix format \"MMDD\" has no year token (YYYY or YY)"
        );

        let err = FormatError::UnterminatedLiteral {
            pattern: "YYYY[T".to_string(),
            offset: 4,
        };
        assert!(err.to_string().contains("byte 4"));
    }
}
