//! Key material: independent PRF and cipher keys, key file persistence

use std::io::Write;
use std::path::Path;

use sse_core::{SseError, SseResult};
use zeroize::Zeroize;

use crate::random::fill_random;
use crate::KEY_SIZE;

macro_rules! secret_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            bytes: [u8; KEY_SIZE],
        }

        impl $name {
            pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
                Self { bytes }
            }

            /// Build a key from a slice, rejecting anything but exactly [`KEY_SIZE`] bytes.
            pub fn from_slice(slice: &[u8]) -> SseResult<Self> {
                let bytes: [u8; KEY_SIZE] =
                    slice.try_into().map_err(|_| SseError::InvalidKeyLength {
                        actual: slice.len(),
                        expected: KEY_SIZE,
                    })?;
                Ok(Self::from_bytes(bytes))
            }

            /// Generate a random 256-bit key.
            pub fn generate() -> SseResult<Self> {
                let mut bytes = [0u8; KEY_SIZE];
                fill_random(&mut bytes)?;
                Ok(Self::from_bytes(bytes))
            }

            pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
                &self.bytes
            }

            /// Load a key file holding exactly [`KEY_SIZE`] raw bytes.
            pub fn load(path: &Path) -> SseResult<Self> {
                read_key_file(path).map(Self::from_bytes)
            }

            /// Write the raw key bytes to `path`, replacing any existing file.
            pub fn save(&self, path: &Path) -> SseResult<()> {
                write_key_file(path, &self.bytes)
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                self.bytes.zeroize();
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("bytes", &"[REDACTED]")
                    .finish()
            }
        }
    };
}

secret_key!(
    /// Key for the keyword PRF. Zeroized on drop.
    PrfKey
);

secret_key!(
    /// Key for document encryption. Zeroized on drop.
    CipherKey
);

/// The two independent keys of an index owner.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub prf: PrfKey,
    pub cipher: CipherKey,
}

impl KeyMaterial {
    /// Generate both keys from independent random draws.
    pub fn generate() -> SseResult<Self> {
        Ok(Self {
            prf: PrfKey::generate()?,
            cipher: CipherKey::generate()?,
        })
    }

    pub fn load(prf_path: &Path, cipher_path: &Path) -> SseResult<Self> {
        Ok(Self {
            prf: PrfKey::load(prf_path)?,
            cipher: CipherKey::load(cipher_path)?,
        })
    }

    pub fn save(&self, prf_path: &Path, cipher_path: &Path) -> SseResult<()> {
        self.prf.save(prf_path)?;
        self.cipher.save(cipher_path)
    }
}

fn read_key_file(path: &Path) -> SseResult<[u8; KEY_SIZE]> {
    let key_file_error = |source| SseError::KeyFile {
        path: path.to_path_buf(),
        source: Box::new(source),
    };

    let mut data = std::fs::read(path).map_err(|e| key_file_error(SseError::io(path, e)))?;
    let result: Result<[u8; KEY_SIZE], _> = data.as_slice().try_into();
    let len = data.len();
    data.zeroize();

    result.map_err(|_| {
        key_file_error(SseError::InvalidKeyLength {
            actual: len,
            expected: KEY_SIZE,
        })
    })
}

fn write_key_file(path: &Path, bytes: &[u8; KEY_SIZE]) -> SseResult<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|e| SseError::io(path, e))?;
    file.write_all(bytes).map_err(|e| SseError::io(path, e))?;
    tracing::debug!(path = %path.display(), "wrote key file");
    Ok(())
}
