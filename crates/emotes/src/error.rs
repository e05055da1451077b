//! Emotes error types.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, EmotesError>;

/// Errors that can occur while building an emote scoreboard.
#[derive(Error, Debug)]
pub enum EmotesError {
    /// A log file or directory could not be opened or read
    #[error("Failed to read {}: {source}", path.display())]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport or status errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The emote catalog answered, but without a usable emote set
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// The fetched vocabulary breaks the name rules (empty or duplicate names)
    #[error("Invalid vocabulary: {0}")]
    Vocabulary(String),

    /// A date argument could not be parsed as YYYY-MM-DD
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Downloading the log of one day failed
    #[error("Error downloading log for {date}: {source}")]
    Download {
        date: NaiveDate,
        #[source]
        source: Box<EmotesError>,
    },

    /// Accumulated usage no longer matches the vocabulary it was built from
    #[error("Aggregation invariant violated: {0}")]
    Invariant(String),
}

impl EmotesError {
    /// Create a log read error for a path.
    pub fn log_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LogRead {
            path: path.into(),
            source,
        }
    }

    /// Create a catalog error.
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Create a vocabulary error.
    pub fn vocabulary(msg: impl Into<String>) -> Self {
        Self::Vocabulary(msg.into())
    }

    /// Create an invariant violation error.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}
