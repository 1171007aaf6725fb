//! Token → ciphertext-path multimap

use std::collections::{BTreeMap, BTreeSet};

use sse_core::{DocumentPath, Token};

/// The encrypted keyword index.
///
/// One token maps to the set of ciphertext paths whose plaintext contained the
/// keyword; one path appears under every token of its document. Adding the
/// same pair twice is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: BTreeMap<Token, BTreeSet<DocumentPath>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `(token -> path)`. Returns false if the pair was already present.
    pub fn insert(&mut self, token: Token, path: DocumentPath) -> bool {
        self.entries.entry(token).or_default().insert(path)
    }

    pub fn get(&self, token: &Token) -> Option<&BTreeSet<DocumentPath>> {
        self.entries.get(token)
    }

    /// Fold another (per-document) index into this one.
    pub fn merge(&mut self, other: Index) {
        for (token, paths) in other.entries {
            self.entries.entry(token).or_default().extend(paths);
        }
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of `(token, path)` pairs.
    pub fn pair_count(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, &BTreeSet<DocumentPath>)> {
        self.entries.iter()
    }
}

impl FromIterator<(Token, DocumentPath)> for Index {
    fn from_iter<I: IntoIterator<Item = (Token, DocumentPath)>>(iter: I) -> Self {
        let mut index = Index::new();
        for (token, path) in iter {
            index.insert(token, path);
        }
        index
    }
}
