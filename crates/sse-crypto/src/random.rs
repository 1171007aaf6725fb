//! Secure randomness for keys and IVs

use rand::rngs::OsRng;
use rand::RngCore;
use sse_core::{SseError, SseResult};

use crate::IV_SIZE;

/// Fill `buf` from the operating system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> SseResult<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| SseError::RandomnessUnavailable(e.to_string()))
}

/// Draw a fresh CBC initialization vector.
pub fn random_iv() -> SseResult<[u8; IV_SIZE]> {
    let mut iv = [0u8; IV_SIZE];
    fill_random(&mut iv)?;
    Ok(iv)
}
