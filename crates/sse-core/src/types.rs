use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::error::{SseError, SseResult};

/// Width of a search token in bytes (truncated PRF output)
pub const TOKEN_SIZE: usize = 16;

/// A search token standing in for a keyword.
///
/// Tokens are opaque: equality is the only meaningful comparison. The derived
/// ordering exists so tokens can key a sorted map.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token([u8; TOKEN_SIZE]);

impl Token {
    pub fn from_bytes(bytes: [u8; TOKEN_SIZE]) -> Self {
        Self(bytes)
    }

    /// Take a token from the first [`TOKEN_SIZE`] bytes of `bytes`.
    pub fn from_prefix(bytes: &[u8]) -> Option<Self> {
        let head = bytes.get(..TOKEN_SIZE)?;
        let mut token = [0u8; TOKEN_SIZE];
        token.copy_from_slice(head);
        Some(Self(token))
    }

    pub fn as_bytes(&self) -> &[u8; TOKEN_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Split a token file into its tokens.
    ///
    /// Returns the tokens plus any trailing bytes too short to form one.
    pub fn parse_batch(bytes: &[u8]) -> (Vec<Token>, &[u8]) {
        let chunks = bytes.chunks_exact(TOKEN_SIZE);
        let rest = chunks.remainder();
        let tokens = chunks.filter_map(Token::from_prefix).collect();
        (tokens, rest)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({})", self.to_hex())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Location of a ciphertext record, as stored in the index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentPath(String);

impl DocumentPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn from_path(path: &Path) -> SseResult<Self> {
        path.to_str()
            .map(|s| Self(s.to_string()))
            .ok_or_else(|| SseError::NonUtf8Path(path.to_path_buf()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn file_name(&self) -> Option<&OsStr> {
        self.as_path().file_name()
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
