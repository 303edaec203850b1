//! Error type shared by the container, SCR, and table modules.

use thiserror::Error;

/// Coarse classification of an [`Error`], used by frontends to decide
/// between "skip and continue" and "abort".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input does not follow the expected layout (bad magic, bad sizes, bad definitions).
    Format,
    /// A read ran past the end of the available data.
    UnexpectedEof,
    /// Filesystem or serialization failure.
    Io,
}

/// Error type for all `lifepack-core` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Signature bytes did not match.
    #[error("Invalid magic: expected {expected:02X?}, found {found:02X?}")]
    InvalidMagic { expected: Vec<u8>, found: Vec<u8> },

    /// The file is shorter than its fixed-size header.
    #[error("File too small: need at least {needed} bytes, got {actual}")]
    TooSmall { needed: usize, actual: usize },

    /// The size declared in the header disagrees with the real file size.
    #[error("Size mismatch: header declares {declared} bytes, file has {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    /// A read at `offset` needed more bytes than were available.
    #[error(
        "Unexpected end of data at offset 0x{offset:X}: need {needed} bytes, {available} available"
    )]
    UnexpectedEof { offset: usize, needed: usize, available: usize },

    /// An archive entry name that cannot be turned into a safe relative path.
    #[error("Invalid entry path: {0:?}")]
    InvalidEntryPath(String),

    /// Row layout or table definition problem.
    #[error("Layout error: {0}")]
    Layout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidMagic { .. }
            | Error::TooSmall { .. }
            | Error::SizeMismatch { .. }
            | Error::InvalidEntryPath(_)
            | Error::Layout(_) => ErrorKind::Format,
            Error::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            Error::Io(_) | Error::Json(_) | Error::Yaml(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn layout(msg: impl Into<String>) -> Self {
        Error::Layout(msg.into())
    }
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
