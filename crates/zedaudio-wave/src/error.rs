use std::io;

use thiserror::Error;

/// Errors from parsing a WAV header or reading its sample stream.
#[derive(Debug, Error)]
pub enum WaveError {
    /// A fixed header tag or field did not match the canonical layout.
    #[error("malformed WAV header: {0}")]
    MalformedHeader(&'static str),

    /// The stream is well-formed but outside the playable envelope.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(&'static str),

    /// The stream ended mid-frame; no partial frame is delivered.
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
