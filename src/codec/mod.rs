//! Compression adapter (C3).
//!
//! Wraps an external deflate codec behind a uniform `compress`/`decompress`
//! contract used by the payload framing layer (C5).

pub mod deflate;

pub use deflate::{compress, decompress};
