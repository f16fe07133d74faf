use std::path::PathBuf;

use thiserror::Error;

/// A string field that could not be coerced to its typed value.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("expected {expected}, found {value:?}")]
pub struct ParseError {
    pub expected: &'static str,
    pub value: String,
}

impl ParseError {
    pub fn new(expected: &'static str, value: &str) -> Self {
        Self {
            expected,
            value: value.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no header row")]
    MissingHeader { path: PathBuf },

    /// A row is malformed (column count mismatch, invalid UTF-8).
    #[error("malformed CSV in {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row could not be deserialized: a required column is absent or a
    /// field failed coercion. `column` is set when csv can tell which one.
    #[error(
        "invalid record on line {line} ({}): {source}",
        .column.as_deref().unwrap_or("unknown column")
    )]
    Parse {
        line: u64,
        column: Option<String>,
        #[source]
        source: csv::Error,
    },

    /// A week-window comparison was asked for with an absent date.
    #[error("cannot compare dates: one of the dates is missing")]
    MissingDate,

    /// Upstream filtering let through a record it should have removed.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("failed to render chart: {0}")]
    Chart(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_quotes_value() {
        let err = ParseError::new("an integer", "abc");
        assert_eq!(err.to_string(), "expected an integer, found \"abc\"");
    }

    #[test]
    fn io_error_names_path() {
        let err = AnalysisError::Io {
            path: PathBuf::from("enrollments.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            err.to_string(),
            "failed to read enrollments.csv: no such file"
        );
    }
}
