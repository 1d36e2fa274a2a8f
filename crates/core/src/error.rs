//! Error types for the realis-explorer system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the realis-explorer system.
///
/// A filter that matches nothing is not an error; it yields an empty row set
/// and zero-count statistics.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or missing required field while cleaning or deriving metrics.
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Caller-supplied query input failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Chart drawing or image encoding failed.
    #[error("Chart error: {0}")]
    Chart(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data format error.
    pub fn data_format(msg: impl Into<String>) -> Self {
        Error::DataFormat(msg.into())
    }

    /// Create an input validation error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a chart rendering error.
    pub fn chart(msg: impl Into<String>) -> Self {
        Error::Chart(msg.into())
    }

    /// Whether this error was caused by the caller's query input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::data_format("Unit Price ($ PSF) is not numeric: 'abc'");
        assert_eq!(
            err.to_string(),
            "Data format error: Unit Price ($ PSF) is not numeric: 'abc'"
        );

        let err = Error::invalid_input("size_min must be an integer");
        assert!(err.is_invalid_input());
        assert!(!Error::config("x").is_invalid_input());
        assert_eq!(Error::chart("no font").to_string(), "Chart error: no font");
    }
}
