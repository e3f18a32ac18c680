//! Core error types for tilawah-core.
//!
//! Every concern gets its own `thiserror` enum; [`CoreError`] aggregates
//! them so gateway operations can use `?` across engine, storage and
//! collaborator failures.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for tilawah-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Streak engine rejected a reading event
    #[error("Streak error: {0}")]
    Streak(#[from] StreakError),

    /// Daily verse selection preconditions violated
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Content, completion or persistence provider failed
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Streak engine errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreakError {
    /// The reading date precedes the last recorded reading date.
    #[error("non-monotonic date: {today} is earlier than last reading on {last_read}")]
    NonMonotonicDate {
        last_read: NaiveDate,
        today: NaiveDate,
    },
}

/// Daily verse selection errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// No chapters to choose from
    #[error("chapter table is empty")]
    EmptyChapterTable,

    /// The drawn chapter is missing from the table (or has no verses)
    #[error("chapter {chapter} not found in chapter table")]
    ChapterNotFound { chapter: u32 },
}

/// Failure reported by an external collaborator.
///
/// The core never retries these; they propagate to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{service} failed: {message}")]
pub struct CollaboratorError {
    pub service: String,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            message: message.into(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored row could not be decoded
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not determine or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Surah number outside 1..=114
    #[error("Surah {0} does not exist (expected 1..=114)")]
    UnknownSurah(u32),

    /// Ayat number outside the surah's verse range
    #[error("Surah {surah} has {verse_count} ayat, {ayat} is out of range")]
    AyatOutOfRange {
        surah: u32,
        ayat: u32,
        verse_count: u32,
    },

    /// Juz number outside 1..=30
    #[error("Juz {0} does not exist (expected 1..=30)")]
    UnknownJuz(u32),

    /// Bookmark missing or owned by someone else
    #[error("Bookmark not found: {0}")]
    UnknownBookmark(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
