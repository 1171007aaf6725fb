//! Document encryption: AES-256-CBC with PKCS#7 padding
//!
//! Ciphertext record format (binary):
//! ```text
//! [16 bytes: random IV][N * 16 bytes: CBC ciphertext]
//! ```
//!
//! The IV is drawn fresh for every document, so identical plaintexts produce
//! unrelated records.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use sse_core::{SseError, SseResult};

use crate::keys::CipherKey;
use crate::random::random_iv;
use crate::{BLOCK_SIZE, IV_SIZE};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Encryption of whole document bodies. Every call carries an IV.
pub trait DocumentCipher {
    fn encrypt(&self, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8>;

    fn decrypt(&self, iv: &[u8; IV_SIZE], ciphertext: &[u8]) -> SseResult<Vec<u8>>;

    /// Encrypt under a fresh random IV and return `IV ‖ ciphertext`.
    fn seal(&self, plaintext: &[u8]) -> SseResult<Vec<u8>> {
        let iv = random_iv()?;
        let ciphertext = self.encrypt(&iv, plaintext);

        let mut record = Vec::with_capacity(IV_SIZE + ciphertext.len());
        record.extend_from_slice(&iv);
        record.extend_from_slice(&ciphertext);
        Ok(record)
    }

    /// Split an `IV ‖ ciphertext` record and decrypt it.
    fn open(&self, record: &[u8]) -> SseResult<Vec<u8>> {
        if record.len() < IV_SIZE {
            return Err(SseError::IvMissing { len: record.len() });
        }

        let (iv, ciphertext) = record.split_at(IV_SIZE);
        let iv: &[u8; IV_SIZE] = iv
            .try_into()
            .map_err(|_| SseError::IvMissing { len: record.len() })?;
        self.decrypt(iv, ciphertext)
    }
}

/// AES-256-CBC document cipher.
#[derive(Debug, Clone)]
pub struct AesCbcCipher {
    key: CipherKey,
}

impl AesCbcCipher {
    pub fn new(key: CipherKey) -> Self {
        Self { key }
    }
}

impl DocumentCipher for AesCbcCipher {
    fn encrypt(&self, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
        encrypt(&self.key, iv, plaintext)
    }

    fn decrypt(&self, iv: &[u8; IV_SIZE], ciphertext: &[u8]) -> SseResult<Vec<u8>> {
        decrypt(&self.key, iv, ciphertext)
    }
}

/// Encrypt `plaintext` with AES-256-CBC under `iv`.
///
/// Output is always a whole number of blocks (an empty body pads to one block).
pub fn encrypt(key: &CipherKey, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(key.as_bytes().into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt AES-256-CBC `ciphertext` and strip its PKCS#7 padding.
pub fn decrypt(key: &CipherKey, iv: &[u8; IV_SIZE], ciphertext: &[u8]) -> SseResult<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(SseError::DecryptionFailed(format!(
            "ciphertext length {} is not a positive multiple of {BLOCK_SIZE}",
            ciphertext.len()
        )));
    }

    Aes256CbcDec::new(key.as_bytes().into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| {
            SseError::DecryptionFailed("invalid padding: wrong key or corrupted data".into())
        })
}
