//! JPEG DCT coefficient engine (C8).

mod coefficients;

#[cfg(feature = "jpeg")]
mod codec;

pub use coefficients::{
    Block, Coefficients, Component, count_usable, embed_in_coefficients, extract_from_coefficients,
};

#[cfg(feature = "jpeg")]
pub use codec::{decode_coefficients, encode_coefficients};

use crate::Result;

/// External collaborator boundary (§6): something that can turn JPEG file
/// bytes into a [`Coefficients`] object and back. The DCT embedding engine
/// itself (`embed_in_coefficients`/`extract_from_coefficients`) never
/// depends on this trait — it operates purely on the coefficient model —
/// but callers working with real files need an implementation of it.
pub trait JpegCodec {
    /// Parses JPEG file bytes into their quantized coefficient model.
    fn extract_coefficients(&self, bytes: &[u8]) -> Result<Coefficients>;

    /// Re-serializes a (possibly mutated) coefficient model as JPEG file bytes.
    fn encode_from_coefficients(&self, coefficients: &Coefficients) -> Result<Vec<u8>>;
}

/// The from-scratch baseline codec in [`codec`], behind the `jpeg` feature.
#[cfg(feature = "jpeg")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BaselineJpegCodec;

#[cfg(feature = "jpeg")]
impl JpegCodec for BaselineJpegCodec {
    fn extract_coefficients(&self, bytes: &[u8]) -> Result<Coefficients> {
        codec::decode_coefficients(bytes)
    }

    fn encode_from_coefficients(&self, coefficients: &Coefficients) -> Result<Vec<u8>> {
        codec::encode_coefficients(coefficients)
    }
}
