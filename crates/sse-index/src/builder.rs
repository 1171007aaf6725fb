//! Index build: plaintext directory → ciphertext directory + index
//!
//! Per regular file (non-recursive):
//!   read → split into words → PRF each word → index `token → output path`
//!   → seal body under a fresh IV → write `IV ‖ ciphertext` to the output path
//!
//! With more than one worker, documents are processed on a rayon pool. Each
//! document produces its own partial index; partials are merged once all
//! documents are done, so the index is never shared between workers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use sse_core::{DocumentPath, SseError, SseResult};
use sse_crypto::{AesCbcCipher, AesEcbPrf, DocumentCipher, KeyMaterial, Prf};
use tracing::{debug, info};

use crate::index::Index;
use crate::split::split;
use crate::store::FileStore;

/// Progress callback: (documents done, total documents, current file name)
pub type ProgressFn = Box<dyn Fn(u64, u64, &str) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Worker threads (0 = cpu_count, 1 = sequential)
    pub workers: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// Summary of a completed build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: u64,
    /// Words seen across all documents (before deduplication)
    pub words: u64,
    /// Distinct tokens in the index
    pub tokens: usize,
    /// Plaintext bytes encrypted
    pub bytes: u64,
}

struct Document {
    index: Index,
    words: u64,
    bytes: u64,
}

/// Build an index over `plaintext_dir`, writing ciphertext records into
/// `ciphertext_dir`.
///
/// Any failure aborts the build with [`SseError::BuildFailed`] naming the
/// document. Records already written stay on disk.
pub fn build<S>(
    store: &S,
    keys: &KeyMaterial,
    plaintext_dir: &Path,
    ciphertext_dir: &Path,
    options: &BuildOptions,
    progress: Option<&ProgressFn>,
) -> SseResult<(Index, BuildReport)>
where
    S: FileStore + Sync,
{
    let prf = AesEcbPrf::new(keys.prf.clone());
    let cipher = AesCbcCipher::new(keys.cipher.clone());
    build_with(
        store,
        &prf,
        &cipher,
        plaintext_dir,
        ciphertext_dir,
        options,
        progress,
    )
}

/// [`build`] with explicit PRF and cipher implementations.
pub fn build_with<S, P, C>(
    store: &S,
    prf: &P,
    cipher: &C,
    plaintext_dir: &Path,
    ciphertext_dir: &Path,
    options: &BuildOptions,
    progress: Option<&ProgressFn>,
) -> SseResult<(Index, BuildReport)>
where
    S: FileStore + Sync,
    P: Prf + Sync,
    C: DocumentCipher + Sync,
{
    for dir in [plaintext_dir, ciphertext_dir] {
        if !store.is_dir(dir) {
            return Err(SseError::NotADirectory(dir.to_path_buf()));
        }
    }

    let files = store.list_files(plaintext_dir)?;
    let total = files.len() as u64;
    let done = AtomicU64::new(0);

    let process = |file: &PathBuf| -> SseResult<Document> {
        let document = process_document(store, prf, cipher, file, ciphertext_dir).map_err(
            |source| SseError::BuildFailed {
                path: file.clone(),
                source: Box::new(source),
            },
        )?;

        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(cb) = progress {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            cb(n, total, &name);
        }
        Ok(document)
    };

    let documents: Vec<Document> = if options.workers == 1 {
        files.iter().map(&process).collect::<SseResult<_>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
            .map_err(|e| SseError::Config(format!("building worker pool: {e}")))?;
        pool.install(|| files.par_iter().map(&process).collect::<SseResult<_>>())?
    };

    let mut index = Index::new();
    let mut report = BuildReport::default();
    for document in documents {
        report.documents += 1;
        report.words += document.words;
        report.bytes += document.bytes;
        index.merge(document.index);
    }
    report.tokens = index.len();

    info!(
        documents = report.documents,
        tokens = report.tokens,
        pairs = index.pair_count(),
        bytes = report.bytes,
        "index build complete"
    );

    Ok((index, report))
}

fn process_document<S, P, C>(
    store: &S,
    prf: &P,
    cipher: &C,
    file: &Path,
    ciphertext_dir: &Path,
) -> SseResult<Document>
where
    S: FileStore,
    P: Prf,
    C: DocumentCipher,
{
    let plaintext = store.read(file)?;

    let name = file
        .file_name()
        .ok_or_else(|| SseError::Input(format!("no file name: {}", file.display())))?;
    let output_path = ciphertext_dir.join(name);
    let document_path = DocumentPath::from_path(&output_path)?;

    let mut index = Index::new();
    let mut words = 0u64;
    for word in split(&plaintext) {
        index.insert(prf.token(word)?, document_path.clone());
        words += 1;
    }

    let record = cipher.seal(&plaintext)?;
    store.write(&output_path, &record)?;

    debug!(
        file = %file.display(),
        output = %output_path.display(),
        words,
        tokens = index.len(),
        "encrypted document"
    );

    Ok(Document {
        index,
        words,
        bytes: plaintext.len() as u64,
    })
}
