//! Error types for steganographic embed/extract operations.
//!
//! This module provides the [`Error`] enum covering every failure mode
//! named by the embedding engines (pixel LSB, JPEG DCT, zero-width
//! character text) and the codec/crypto layers they share, along with a
//! convenient [`Result<T>`] alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`:
//!
//! ```rust,no_run
//! use veilcode::{Error, Result};
//!
//! fn check(e: Error) {
//!     match e {
//!         Error::CapacityExceeded { required, available, .. } => {
//!             eprintln!("need {required} bits, carrier holds {available}");
//!         }
//!         Error::DecryptionFailed(_) => eprintln!("wrong password or corrupt carrier"),
//!         _ => {}
//!     }
//! }
//! ```

use thiserror::Error as ThisError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the crate can produce.
#[derive(Debug, ThisError)]
pub enum Error {
    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A bit depth, dimension, length, or other argument was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The message would not fit in the carrier's available bits/coefficients.
    #[error(
        "capacity exceeded: need {required} bytes, carrier holds {available} bytes ({suggestion})"
    )]
    CapacityExceeded {
        /// Bytes (or bits, documented per call site) the payload requires.
        required: usize,
        /// Bytes (or bits) the carrier can actually hold.
        available: usize,
        /// A human-readable remedy (shorter message, larger image, higher bit depth, ...).
        suggestion: &'static str,
    },

    /// The declared payload length exceeds what the carrier delivered.
    #[error("truncated: expected {expected} bytes, found {found}")]
    Truncated {
        /// Bytes the frame header declared.
        expected: usize,
        /// Bytes actually available.
        found: usize,
    },

    /// The caller asked for one payload type but the carrier held another.
    #[error("payload type mismatch: expected {expected:#04x}, found {found:#04x}")]
    PayloadTypeMismatch {
        /// The type the caller requested.
        expected: u8,
        /// The type actually present in the frame header.
        found: u8,
    },

    /// A decoded zero-width-character run's digit count was not a multiple of four.
    #[error("invalid ZWC length: {0} digits is not a multiple of four")]
    InvalidZwcLength(usize),

    /// AES-CTR decryption could not even be attempted (blob too short).
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Deflate decompression failed, almost always due to a wrong password
    /// or a corrupt carrier.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// The carrier's image format was not recognised.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Every frame in a multi-frame carrier fell below the minimum usable capacity.
    #[error("no usable frames (need at least 8 bytes of capacity per frame)")]
    NoUsableFrames,
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_exceeded_message_includes_counts() {
        let e = Error::CapacityExceeded {
            required: 100,
            available: 40,
            suggestion: "use a larger image",
        };
        let msg = e.to_string();
        assert!(msg.contains("100"));
        assert!(msg.contains("40"));
        assert!(msg.contains("larger image"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
