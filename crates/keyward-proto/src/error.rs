//! Error types for the keyward wire protocol.
//!
//! Every variant here is a protocol violation or transport failure.
//! None of them are recoverable: the framing contract with the parent
//! is byte-exact, and once it is breached the stream position is
//! unknowable, so the process must abort and be respawned.

use thiserror::Error;

/// Wire protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame with a zero-length body
    #[error("empty frame")]
    EmptyFrame,

    /// Stream ended inside a frame
    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    TruncatedFrame {
        /// Bytes the frame claimed
        expected: usize,
        /// Bytes actually present
        actual: usize,
    },

    /// Frame body does not fit the u32 size prefix
    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),

    /// Command tag outside the defined range
    #[error("unknown command tag: {0}")]
    UnknownCommand(u8),

    /// Key field length runs past the end of the payload
    #[error("truncated key field: need {need} bytes, {have} remain")]
    TruncatedKeyField {
        /// Bytes the length prefix claimed
        need: usize,
        /// Bytes left in the payload
        have: usize,
    },

    /// Key too long for the 1-byte length prefix
    #[error("key field too long: {0} bytes")]
    KeyFieldTooLong(usize),

    /// Transport I/O failure
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
