//! sse-index: build and query an encrypted keyword index
//!
//! # Overview
//! - `split`: whitespace keyword splitter over raw document bytes
//! - `index`: token → ciphertext-path multimap with set semantics
//! - `codec`: index wire formats (tagged records, legacy lines)
//! - `store`: file access behind a small trait (disk or memory)
//! - `builder`: plaintext directory → ciphertext directory + index
//! - `search`: query tokens → matched paths → decrypted bodies
//!
//! # Leakage
//! The index reveals which documents share a token (search pattern) and a
//! query reveals which records it returns (access pattern). Keywords are
//! never stored; only their PRF tokens are.

pub mod builder;
pub mod codec;
pub mod index;
pub mod search;
pub mod split;
pub mod store;

pub use builder::{build, build_with, BuildOptions, BuildReport, ProgressFn};
pub use codec::{decode, deserialize, encode, serialize, Decoded};
pub use index::Index;
pub use search::{match_paths, search, SearchHit};
pub use split::{split, Words};
pub use store::{FileStore, LocalStore, MemoryStore};
