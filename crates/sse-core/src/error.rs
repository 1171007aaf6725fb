use std::path::{Path, PathBuf};

use thiserror::Error;

pub type SseResult<T> = Result<T, SseError>;

/// Coarse classification used for reporting and exit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input, wrong key length, bad arguments
    Input,
    /// Cipher, padding, or randomness failure
    Crypto,
    /// Index bytes truncated or malformed
    Format,
    /// Filesystem failure other than a missing file
    Io,
}

#[derive(Debug, Error)]
pub enum SseError {
    #[error("input error: {0}")]
    Input(String),

    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("invalid key length: {actual} bytes (expected {expected})")]
    InvalidKeyLength { actual: usize, expected: usize },

    #[error("key file {}: {source}", path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: Box<SseError>,
    },

    #[error("keyword must not be empty")]
    EmptyKeyword,

    #[error("PRF output of {0} bytes is shorter than a token")]
    InvalidTokenLength(usize),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("IV not found: record is {len} bytes")]
    IvMissing { len: usize },

    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("index format error: {0}")]
    Format(#[from] FormatError),

    #[error("build failed at {}: {source}", path.display())]
    BuildFailed {
        path: PathBuf,
        #[source]
        source: Box<SseError>,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SseError {
    /// Wrap an I/O error for `path`, mapping a missing file to [`SseError::NotFound`].
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            SseError::NotFound(path.to_path_buf())
        } else {
            SseError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SseError::Input(_)
            | SseError::NotFound(_)
            | SseError::NotADirectory(_)
            | SseError::NonUtf8Path(_)
            | SseError::InvalidKeyLength { .. }
            | SseError::EmptyKeyword
            | SseError::Config(_) => ErrorKind::Input,
            SseError::InvalidTokenLength(_)
            | SseError::DecryptionFailed(_)
            | SseError::IvMissing { .. }
            | SseError::RandomnessUnavailable(_) => ErrorKind::Crypto,
            SseError::Format(_) => ErrorKind::Format,
            SseError::Io { .. } => ErrorKind::Io,
            SseError::KeyFile { source, .. } | SseError::BuildFailed { source, .. } => {
                source.kind()
            }
        }
    }
}

/// Index deserialization failures.
///
/// Decoding never panics on these; the decoder stops and hands back whatever
/// it parsed before the offending byte.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("truncated {what} at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        what: &'static str,
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("unknown record tag {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    #[error("path record at offset {offset} has no preceding token record")]
    OrphanPath { offset: usize },

    #[error("path at offset {offset} is not valid UTF-8")]
    InvalidPath { offset: usize },

    #[error("unsupported index format version {0}")]
    UnsupportedVersion(u8),

    #[error("path {0:?} cannot be represented in the line format")]
    UnencodablePath(String),

    #[error("path of {0} bytes exceeds the record length limit")]
    PathTooLong(usize),
}
