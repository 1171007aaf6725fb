//! Encrypted search: query tokens → matched ciphertext paths → plaintexts
//!
//! Only token equality is evaluated; keywords never reach this module. Each
//! matched record is read and decrypted on its own, so one unreadable or
//! corrupted record yields an error for that path alone.

use std::collections::BTreeSet;
use std::path::Path;

use sse_core::{DocumentPath, SseResult, Token};
use sse_crypto::DocumentCipher;
use tracing::{debug, info, warn};

use crate::index::Index;
use crate::store::FileStore;

/// One matched document and the outcome of decrypting it.
#[derive(Debug)]
pub struct SearchHit {
    pub path: DocumentPath,
    pub result: SseResult<Vec<u8>>,
}

/// Union of the paths indexed under any of `tokens`.
pub fn match_paths(index: &Index, tokens: &[Token]) -> BTreeSet<DocumentPath> {
    tokens
        .iter()
        .filter_map(|token| index.get(token))
        .flatten()
        .cloned()
        .collect()
}

/// Resolve `tokens` against `index` and decrypt every matched record.
///
/// Records are read from `ciphertext_dir`, joined with the file name of each
/// indexed path. Hits come back in path order, one per distinct path.
pub fn search<S, C>(
    store: &S,
    index: &Index,
    tokens: &[Token],
    ciphertext_dir: &Path,
    cipher: &C,
) -> Vec<SearchHit>
where
    S: FileStore,
    C: DocumentCipher,
{
    let matched = match_paths(index, tokens);

    let hits: Vec<SearchHit> = matched
        .into_iter()
        .map(|path| {
            let result = open_record(store, &path, ciphertext_dir, cipher);
            match &result {
                Ok(plaintext) => debug!(path = %path, bytes = plaintext.len(), "decrypted match"),
                Err(e) => warn!(path = %path, error = %e, "could not decrypt match"),
            }
            SearchHit { path, result }
        })
        .collect();

    info!(
        tokens = tokens.len(),
        matches = hits.len(),
        failed = hits.iter().filter(|h| h.result.is_err()).count(),
        "search complete"
    );

    hits
}

fn open_record<S, C>(
    store: &S,
    path: &DocumentPath,
    ciphertext_dir: &Path,
    cipher: &C,
) -> SseResult<Vec<u8>>
where
    S: FileStore,
    C: DocumentCipher,
{
    let record_path = match path.file_name() {
        Some(name) => ciphertext_dir.join(name),
        None => path.as_path().to_path_buf(),
    };
    let record = store.read(&record_path)?;
    cipher.open(&record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use sse_core::{SseError, TOKEN_SIZE};
    use sse_crypto::{AesCbcCipher, CipherKey};

    fn t(b: u8) -> Token {
        Token::from_bytes([b; TOKEN_SIZE])
    }

    fn p(s: &str) -> DocumentPath {
        DocumentPath::new(s)
    }

    fn cipher() -> AesCbcCipher {
        AesCbcCipher::new(CipherKey::from_bytes([9u8; 32]))
    }

    fn index() -> Index {
        [
            (t(1), p("cipher/a.txt")),
            (t(1), p("cipher/b.txt")),
            (t(2), p("cipher/b.txt")),
            (t(3), p("cipher/c.txt")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn match_paths_unions_and_dedupes() {
        let matched = match_paths(&index(), &[t(1), t(2), t(2)]);
        assert_eq!(
            matched.into_iter().collect::<Vec<_>>(),
            vec![p("cipher/a.txt"), p("cipher/b.txt")]
        );
    }

    #[test]
    fn match_paths_unknown_token() {
        assert!(match_paths(&index(), &[t(9)]).is_empty());
        assert!(match_paths(&index(), &[]).is_empty());
    }

    #[test]
    fn search_isolates_failures() {
        let store = MemoryStore::new();
        store.create_dir("cipher");
        let c = cipher();
        store
            .write(Path::new("cipher/a.txt"), &c.seal(b"alpha doc").unwrap())
            .unwrap();
        // b.txt: shorter than an IV; c.txt absent
        store.write(Path::new("cipher/b.txt"), b"short").unwrap();

        let hits = search(&store, &index(), &[t(1), t(3)], Path::new("cipher"), &c);
        assert_eq!(hits.len(), 3);

        assert_eq!(hits[0].path, p("cipher/a.txt"));
        assert_eq!(hits[0].result.as_deref().unwrap(), b"alpha doc");
        assert!(matches!(hits[1].result, Err(SseError::IvMissing { len: 5 })));
        assert!(matches!(hits[2].result, Err(SseError::NotFound(_))));
    }

    #[test]
    fn search_reads_from_given_directory() {
        let store = MemoryStore::new();
        store.create_dir("moved");
        let c = cipher();
        store
            .write(Path::new("moved/c.txt"), &c.seal(b"gamma").unwrap())
            .unwrap();

        let hits = search(&store, &index(), &[t(3)], Path::new("moved"), &c);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, p("cipher/c.txt"));
        assert_eq!(hits[0].result.as_deref().unwrap(), b"gamma");
    }
}
