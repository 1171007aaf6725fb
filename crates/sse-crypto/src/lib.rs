//! sse-crypto: the two AES capabilities behind the SSE index
//!
//! ```text
//! KeyMaterial
//!   ├── PrfKey    → AesEcbPrf     keyword → Token (AES-256-ECB, no IV, first 16 bytes)
//!   └── CipherKey → AesCbcCipher  body → IV ‖ AES-256-CBC(body), fresh IV per document
//! ```
//!
//! The PRF and the document cipher are separate types with separate keys, so
//! an IV can never reach the PRF path and the cipher path can never run
//! without one.

pub mod cipher;
pub mod keys;
pub mod prf;
pub mod random;

pub use cipher::{decrypt, encrypt, AesCbcCipher, DocumentCipher};
pub use keys::{CipherKey, KeyMaterial, PrfKey};
pub use prf::{token, AesEcbPrf, Prf};
pub use random::{fill_random, random_iv};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of a CBC initialization vector
pub const IV_SIZE: usize = 16;

/// AES block size
pub const BLOCK_SIZE: usize = 16;
