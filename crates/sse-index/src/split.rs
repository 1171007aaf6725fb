//! Keyword splitter
//!
//! Splits raw document bytes on `' '`, `'\n'`, `'\r'` and `'\t'`. Runs of
//! delimiters never yield empty words. No decoding happens: words are byte
//! slices, so non-UTF-8 documents index fine.

const DELIMITERS: [u8; 4] = [b' ', b'\n', b'\r', b'\t'];

fn is_delimiter(b: u8) -> bool {
    DELIMITERS.contains(&b)
}

/// Iterate over the whitespace-delimited words of `bytes`.
pub fn split(bytes: &[u8]) -> Words<'_> {
    Words { rest: bytes }
}

/// Lazy word iterator returned by [`split`].
///
/// Holds only a borrowed cursor; cloning it or calling [`split`] again
/// restarts independently.
#[derive(Debug, Clone)]
pub struct Words<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Words<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.rest.iter().position(|&b| !is_delimiter(b))?;
        let tail = &self.rest[start..];
        let len = tail.iter().position(|&b| is_delimiter(b)).unwrap_or(tail.len());
        let (word, rest) = tail.split_at(len);
        self.rest = rest;
        Some(word)
    }
}

impl std::iter::FusedIterator for Words<'_> {}
