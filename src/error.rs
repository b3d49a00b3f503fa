//! Error types for hcompress

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CompressError>;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("cannot open input file {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create output file {}: {source}", .path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("empty input")]
    EmptyInput,

    #[error("presence bitmap marks no symbols")]
    EmptyAlphabet,

    #[error("input of {size} bytes exceeds the configured limit of {limit} bytes")]
    InputTooLarge { size: u64, limit: u64 },

    #[error("byte 0x{0:02x} has no entry in the code table")]
    UnknownSymbol(u8),

    #[error("input changed between passes: counted {expected} bytes, encoded {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("corrupt container: {0}")]
    Corrupt(String),

    #[error("extract from an empty heap")]
    HeapUnderflow,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CompressError {
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        CompressError::Corrupt(message.into())
    }
}
