//! Error types for the nextdate library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for nextdate operations.
///
/// Row-level problems never show up here: they become
/// [`ParseDiagnostic`](crate::record::ParseDiagnostic) values and the batch
/// continues. Only file-, config- and network-level failures propagate.
#[derive(Debug, Error)]
pub enum NextDateError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error opening or reading a spreadsheet.
    #[error("Spreadsheet error in '{path}': {message}")]
    Spreadsheet { path: PathBuf, message: String },

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A required API credential is absent.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("HTTP request failed: {message}")]
    Http { message: String, transient: bool },

    /// The generation service answered with a non-success status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The generation service answered with something we cannot use.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NextDateError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            NextDateError::Http { transient, .. } => *transient,
            NextDateError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            NextDateError::FileNotFound(path)
        } else {
            NextDateError::Io { path, source }
        }
    }
}

impl From<reqwest::Error> for NextDateError {
    fn from(e: reqwest::Error) -> Self {
        let transient = e.is_timeout() || e.is_connect() || e.is_request();
        NextDateError::Http {
            message: e.to_string(),
            transient,
        }
    }
}

/// Result type alias for nextdate operations.
pub type Result<T> = std::result::Result<T, NextDateError>;
