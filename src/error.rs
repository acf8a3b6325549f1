use std::io;
use thiserror::Error;

/// Errors raised while validating a boundary table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The table has no boundaries at all
    #[error("must supply at least one boundary")]
    EmptyTable,

    /// A boundary has an empty start string
    #[error("boundary #{index} has an empty start string")]
    EmptyStart { index: usize },

    /// A start string has no usable end
    #[error("start boundary {start:?} must have a non-empty end")]
    EmptyEnd { start: String },
}

/// Errors raised while reading a rune stream
#[derive(Error, Debug)]
pub enum ParseError {
    /// The underlying reader failed
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised by a history backend
#[derive(Error, Debug)]
pub enum HistoryError {
    /// libgit2 reported a failure
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// A snapshot id could not be found in the history
    #[error("unknown snapshot: {0}")]
    UnknownSnapshot(String),

    /// Any other backend failure
    #[error("{0}")]
    Backend(String),
}

impl HistoryError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Whether HEAD points at a branch with no commits yet
    pub fn is_unborn(&self) -> bool {
        matches!(self, Self::Git(e) if e.code() == git2::ErrorCode::UnbornBranch)
    }
}
