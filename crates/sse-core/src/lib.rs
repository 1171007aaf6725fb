pub mod config;
pub mod error;
pub mod types;

pub use config::{IndexFormat, SseConfig};
pub use error::{ErrorKind, FormatError, SseError, SseResult};
pub use types::{DocumentPath, Token, TOKEN_SIZE};
