use base64::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NcmError {
    #[error("not a valid NCM file (bad magic)")]
    InvalidMagic,
    #[error("unexpected end of input (needed {needed} bytes, {available} left)")]
    Truncated { needed: usize, available: usize },
    #[error("key recovery failed: {0}")]
    KeyRecovery(String),
    #[error("decryption failed: {0}")]
    Decrypt(String),
    #[error("base64 decode error: {0}")]
    Base64(#[from] DecodeError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tagging error: {0}")]
    Tag(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NcmError>;
