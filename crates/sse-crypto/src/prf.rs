//! Keyword PRF: AES-256-ECB, truncated to a 16-byte token
//!
//! ECB with no IV is acceptable here only because the function is used as a
//! keyed PRF over short, independent keywords. It must never encrypt document
//! bodies; that is [`crate::cipher`]'s job.

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyInit};
use aes::Aes256;
use sse_core::{SseError, SseResult, Token};

use crate::keys::PrfKey;

type Aes256EcbEnc = ecb::Encryptor<Aes256>;

/// Deterministic keyword → token mapping.
pub trait Prf {
    fn token(&self, keyword: &[u8]) -> SseResult<Token>;
}

/// AES-256-ECB keyword PRF with PKCS#7 padding.
#[derive(Debug, Clone)]
pub struct AesEcbPrf {
    key: PrfKey,
}

impl AesEcbPrf {
    pub fn new(key: PrfKey) -> Self {
        Self { key }
    }
}

impl Prf for AesEcbPrf {
    fn token(&self, keyword: &[u8]) -> SseResult<Token> {
        token(&self.key, keyword)
    }
}

/// Derive the search token for `keyword`.
///
/// Keywords shorter than a block are padded, so the ciphertext is always at
/// least one block long; only its first 16 bytes become the token.
pub fn token(key: &PrfKey, keyword: &[u8]) -> SseResult<Token> {
    if keyword.is_empty() {
        return Err(SseError::EmptyKeyword);
    }

    let ciphertext =
        Aes256EcbEnc::new(key.as_bytes().into()).encrypt_padded_vec_mut::<Pkcs7>(keyword);

    Token::from_prefix(&ciphertext).ok_or(SseError::InvalidTokenLength(ciphertext.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KEY_SIZE;
    use proptest::prelude::*;

    fn fips197_key() -> PrfKey {
        let mut bytes = [0u8; KEY_SIZE];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        PrfKey::from_bytes(bytes)
    }

    #[test]
    fn test_known_answer() {
        // FIPS-197 C.3: a full-block keyword's token is the first ECB block
        let keyword = hex::decode("00112233445566778899aabbccddeeff").unwrap();
        let token = token(&fips197_key(), &keyword).unwrap();
        assert_eq!(token.to_hex(), "8ea2b7ca516745bfeafc49904b496089");
    }

    #[test]
    fn test_deterministic() {
        let prf = AesEcbPrf::new(PrfKey::from_bytes([7u8; KEY_SIZE]));
        assert_eq!(prf.token(b"quick").unwrap(), prf.token(b"quick").unwrap());
    }

    #[test]
    fn test_different_keywords_different_tokens() {
        let prf = AesEcbPrf::new(PrfKey::from_bytes([7u8; KEY_SIZE]));
        assert_ne!(prf.token(b"quick").unwrap(), prf.token(b"slow").unwrap());
    }

    #[test]
    fn test_different_keys_different_tokens() {
        let a = AesEcbPrf::new(PrfKey::from_bytes([1u8; KEY_SIZE]));
        let b = AesEcbPrf::new(PrfKey::from_bytes([2u8; KEY_SIZE]));
        assert_ne!(a.token(b"fox").unwrap(), b.token(b"fox").unwrap());
    }

    #[test]
    fn test_empty_keyword_rejected() {
        let prf = AesEcbPrf::new(PrfKey::from_bytes([7u8; KEY_SIZE]));
        assert!(matches!(prf.token(b""), Err(SseError::EmptyKeyword)));
    }

    #[test]
    fn test_single_byte_keyword() {
        let prf = AesEcbPrf::new(PrfKey::from_bytes([7u8; KEY_SIZE]));
        let a = prf.token(b"a").unwrap();
        let b = prf.token(b"b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_long_keyword_token_is_first_block() {
        // Keywords sharing their first 16 bytes share the first ECB block
        let prf = AesEcbPrf::new(PrfKey::from_bytes([9u8; KEY_SIZE]));
        let a = prf.token(b"0123456789abcdef-suffix-one").unwrap();
        let b = prf.token(b"0123456789abcdef-suffix-two").unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn token_is_deterministic(
            key in proptest::array::uniform32(any::<u8>()),
            keyword in proptest::collection::vec(any::<u8>(), 1..=64),
        ) {
            let key = PrfKey::from_bytes(key);
            let t1 = token(&key, &keyword).unwrap();
            let t2 = token(&key, &keyword).unwrap();
            prop_assert_eq!(t1, t2, "PRF must be deterministic for same key and input");
        }
    }
}
