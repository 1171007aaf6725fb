//! Index wire formats
//!
//! Record format (default):
//! ```text
//! "SSEI" | version: u8 = 1 |
//!   ( 'T' | token: [u8; 16] | ( 'P' | len: u32 BE | path: [u8; len] )* )*
//! ```
//! A `'T'` record opens a token group; the `'P'` records after it belong to
//! that token. Paths are length-prefixed, so any byte may appear in them.
//!
//! Line format (legacy):
//! ```text
//! <16 raw token bytes> ( ' ' <path> )* '\n'
//! ```
//! Token bytes are not escaped and may contain `' '` or `'\n'`; the decoder
//! only ever takes them by their fixed 16-byte stride. Paths cannot contain
//! either delimiter.
//!
//! Decoding never fails outright. On malformed input it stops and returns the
//! entries parsed so far together with the [`FormatError`] that stopped it.

use sse_core::{DocumentPath, FormatError, IndexFormat, SseResult, Token, TOKEN_SIZE};

use crate::index::Index;

const MAGIC: &[u8; 4] = b"SSEI";
const VERSION: u8 = 1;
const TAG_TOKEN: u8 = b'T';
const TAG_PATH: u8 = b'P';

/// Result of decoding an index blob.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub index: Index,
    /// Why decoding stopped early, if it did
    pub error: Option<FormatError>,
}

/// Serialize `index` in the default record format.
pub fn serialize(index: &Index) -> SseResult<Vec<u8>> {
    encode(index, IndexFormat::Records)
}

/// Deserialize an index, auto-detecting the format.
///
/// Malformed input yields the partially parsed index; the reason is logged.
pub fn deserialize(bytes: &[u8]) -> Index {
    let decoded = decode(bytes);
    if let Some(err) = &decoded.error {
        tracing::warn!(
            error = %err,
            tokens = decoded.index.len(),
            "index decoding stopped early; using partial index"
        );
    }
    decoded.index
}

pub fn encode(index: &Index, format: IndexFormat) -> SseResult<Vec<u8>> {
    match format {
        IndexFormat::Records => encode_records(index),
        IndexFormat::Lines => encode_lines(index),
    }
}

/// Decode an index blob: the record format if it starts with the magic
/// prefix, otherwise the line format.
pub fn decode(bytes: &[u8]) -> Decoded {
    let mut index = Index::new();
    let result = if bytes.starts_with(MAGIC) {
        decode_records(bytes, &mut index)
    } else {
        decode_lines(bytes, &mut index)
    };
    Decoded {
        index,
        error: result.err(),
    }
}

// ── Record format ─────────────────────────────────────────────────────────────

fn encode_records(index: &Index) -> SseResult<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);

    for (token, paths) in index.iter() {
        out.push(TAG_TOKEN);
        out.extend_from_slice(token.as_bytes());

        for path in paths {
            let bytes = path.as_str().as_bytes();
            let len =
                u32::try_from(bytes.len()).map_err(|_| FormatError::PathTooLong(bytes.len()))?;
            out.push(TAG_PATH);
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(bytes);
        }
    }

    Ok(out)
}

fn decode_records(bytes: &[u8], index: &mut Index) -> Result<(), FormatError> {
    let mut reader = Reader::new(bytes, MAGIC.len());

    let version = reader.byte("version")?;
    if version != VERSION {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let mut current: Option<Token> = None;
    while !reader.is_empty() {
        let offset = reader.pos;
        match reader.byte("tag")? {
            TAG_TOKEN => current = Some(reader.token()?),
            TAG_PATH => {
                let token = current.ok_or(FormatError::OrphanPath { offset })?;
                let len = reader.u32_be("path length")? as usize;
                let path_offset = reader.pos;
                let raw = reader.take("path", len)?;
                let path = std::str::from_utf8(raw)
                    .map_err(|_| FormatError::InvalidPath {
                        offset: path_offset,
                    })?;
                index.insert(token, DocumentPath::new(path));
            }
            tag => return Err(FormatError::UnknownTag { tag, offset }),
        }
    }

    Ok(())
}

// ── Line format ───────────────────────────────────────────────────────────────

fn encode_lines(index: &Index) -> SseResult<Vec<u8>> {
    let mut out = Vec::new();

    for (token, paths) in index.iter() {
        out.extend_from_slice(token.as_bytes());

        for path in paths {
            let s = path.as_str();
            if s.is_empty() || s.contains([' ', '\n']) {
                return Err(FormatError::UnencodablePath(s.to_string()).into());
            }
            out.push(b' ');
            out.extend_from_slice(s.as_bytes());
        }

        out.push(b'\n');
    }

    Ok(out)
}

fn decode_lines(bytes: &[u8], index: &mut Index) -> Result<(), FormatError> {
    let mut reader = Reader::new(bytes, 0);

    while !reader.is_empty() {
        let token = reader.token()?;

        while reader.peek() == Some(b' ') {
            reader.pos += 1;

            let start = reader.pos;
            let rest = &bytes[start..];
            let Some(len) = rest.iter().position(|&b| b == b' ' || b == b'\n') else {
                // A path must be terminated; an unterminated tail is truncated data
                return Err(FormatError::Truncated {
                    what: "path",
                    offset: start,
                    needed: rest.len() + 1,
                    remaining: rest.len(),
                });
            };

            let raw = &rest[..len];
            reader.pos += len;
            if raw.is_empty() {
                continue;
            }
            let path = std::str::from_utf8(raw)
                .map_err(|_| FormatError::InvalidPath { offset: start })?;
            index.insert(token, DocumentPath::new(path));
        }

        // Record terminator: whatever non-space byte ends the path list
        reader.pos += 1;
    }

    Ok(())
}

// ── Byte reader ───────────────────────────────────────────────────────────────

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn take(&mut self, what: &'static str, n: usize) -> Result<&'a [u8], FormatError> {
        let remaining = self.bytes.len().saturating_sub(self.pos);
        if remaining < n {
            return Err(FormatError::Truncated {
                what,
                offset: self.pos,
                needed: n,
                remaining,
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn byte(&mut self, what: &'static str) -> Result<u8, FormatError> {
        Ok(self.take(what, 1)?[0])
    }

    fn u32_be(&mut self, what: &'static str) -> Result<u32, FormatError> {
        let b = self.take(what, 4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn token(&mut self) -> Result<Token, FormatError> {
        let mut token = [0u8; TOKEN_SIZE];
        token.copy_from_slice(self.take("token", TOKEN_SIZE)?);
        Ok(Token::from_bytes(token))
    }
}
