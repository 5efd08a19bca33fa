use thiserror::Error;

/// Main error type for validation operations
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("checksum mismatch: expected {expected}, got {computed}")]
    ChecksumMismatch { expected: String, computed: String },

    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("integrity failure: {0}")]
    Integrity(String),

    #[error("failed to open archive: {0}")]
    ContainerOpen(String),

    #[error("no rules found for category: {0}")]
    UnknownCategory(String),

    #[error("found {matched} matches, but minimum required is {min}")]
    TooFewMatches { matched: u32, min: u32 },

    #[error("found {matched} matches, but maximum allowed is {max}")]
    TooManyMatches { matched: u32, max: u32 },

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("output error: {0}")]
    Output(String),
}

impl CheckError {
    /// True for errors that mean "the target file is absent", counted
    /// separately from checksum or read failures.
    pub fn is_missing(&self) -> bool {
        matches!(self, CheckError::FileNotFound(_))
    }
}

/// Result type alias for validation operations
pub type Result<T> = std::result::Result<T, CheckError>;
