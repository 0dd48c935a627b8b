//! # veilcode
//!
//! Steganographic embedding and extraction for raster images, JPEG DCT
//! coefficients, and zero-width Unicode text.
//!
//! Two carrier families are supported:
//! - Raster images — lossless pixel carriers via [`engine::pixel`], with
//!   [`engine::multiframe`] orchestrating animated/paged containers, and
//!   lossy JPEG carriers via [`engine::jpeg`] operating on quantized DCT
//!   coefficients.
//! - Unicode text — invisible code points interleaved with visible
//!   characters, via [`engine::zwc`].
//!
//! All four engines share a common pipeline: [`framing`] (typed,
//! length-prefixed payloads), [`codec`] (raw-deflate compression),
//! [`crypto`] (cyclic XOR and PBKDF2/AES-256-CTR encryption), and [`bits`]
//! (LSB-first bit/byte marshalling). [`capacity`] provides the pre-flight
//! sizing and filename-sanitization checks shared by callers.
//!
//! ## Quick start
//!
//! ```
//! use veilcode::engine::pixel::{self, PixelOptions};
//!
//! let mut rgba = vec![0xFFu8; 10 * 10 * 4];
//! let options = PixelOptions::new(1);
//! pixel::embed_text(&mut rgba, "Hello", options).unwrap();
//! assert_eq!(pixel::extract_text(&rgba, options).unwrap(), "Hello");
//! ```
//!
//! ## Confidentiality, not authentication
//!
//! Password-based encryption ([`crypto::kdf`]) provides confidentiality
//! only; there is no integrity tag. A wrong password decrypts to garbage
//! bytes that downstream decompression or UTF-8 decoding will almost
//! always reject, surfacing as [`Error::DecryptionFailed`] or
//! [`Error::DecompressionFailed`] rather than a dedicated "wrong password"
//! variant.

pub mod bits;
pub mod capacity;
pub mod codec;
pub mod crypto;
pub mod engine;
mod error;
pub mod framing;

pub use crypto::Password;
pub use error::{Error, Result};
