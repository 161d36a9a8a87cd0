//! Error types for the dispatch table.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal input errors. Each one aborts only the call that raised it; the table is
/// never left half-modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required argument was empty (an event name or a name filter).
    #[error("missing required argument: {0}")]
    MissingRequired(&'static str),

    /// The same key appeared twice while building a payload.
    #[error("duplicate key `{0}` in payload")]
    DuplicateKey(String),
}

impl Error {
    /// Returns `true` for [`Error::MissingRequired`].
    pub fn is_missing_required(&self) -> bool {
        matches!(self, Error::MissingRequired(_))
    }

    /// Returns `true` for [`Error::DuplicateKey`].
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::DuplicateKey(_))
    }
}
