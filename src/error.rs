//! Error types for trueno-bars operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring, scaling or drawing a chart.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A column role the layout needs was never configured.
    #[error("Missing configuration: {0} column is required")]
    MissingConfig(&'static str),

    /// Group-by and stack-by were both requested.
    #[error("Conflicting layout: {first} cannot be combined with {second}")]
    ConflictingLayout {
        /// Layout configured first.
        first: &'static str,
        /// Layout configured second.
        second: &'static str,
    },

    /// The chart type does not support the requested layout.
    #[error("Unsupported layout for {chart}: {layout}")]
    UnsupportedLayout {
        /// Chart type name.
        chart: &'static str,
        /// Requested layout.
        layout: &'static str,
    },

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// A value that must be numeric could not be read as a number.
    #[error("Column '{column}' holds a non-numeric value at row {row}")]
    NonNumeric {
        /// Column name.
        column: String,
        /// Row index in the caller's input.
        row: usize,
    },

    /// Invalid quantile configuration.
    #[error("Invalid quantile configuration: {0}")]
    InvalidQuantiles(String),

    /// Scale domain error (e.g., empty band domain).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Number format specifier could not be parsed.
    #[error("Invalid format specifier: {0}")]
    InvalidFormat(String),

    /// Chart settings could not be parsed.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 when unknown).
        line: usize,
        /// Parser message.
        message: String,
    },

    /// A mark index passed to an interaction call does not exist.
    #[error("No mark at index {0}")]
    MarkNotFound(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingConfig("x");
        assert!(err.to_string().contains("x column"));
    }

    #[test]
    fn test_conflicting_layout_names_both() {
        let err = Error::ConflictingLayout { first: "group-by", second: "stack-by" };
        let msg = err.to_string();
        assert!(msg.contains("group-by"));
        assert!(msg.contains("stack-by"));
    }

    #[test]
    fn test_config_parse_line() {
        let err = Error::ConfigParse { line: 7, message: "bad".to_string() };
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_io_from() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
