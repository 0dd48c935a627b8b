//! Raw deflate compression (C3): RFC 1951, no zlib or gzip wrapper.
//!
//! Errors from the underlying codec are surfaced untransformed as
//! [`Error::DecompressionFailed`].

use std::io::{Read, Write};

use flate2::Compression;
use flate2::bufread::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::{Error, Result};

const DEFAULT_LEVEL: u32 = 6;

/// Compresses `bytes` with raw deflate at the default compression level.
pub fn compress(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(DEFAULT_LEVEL));
    encoder
        .write_all(bytes)
        .expect("writing to an in-memory encoder cannot fail");
    encoder
        .finish()
        .expect("finishing an in-memory encoder cannot fail")
}

/// Decompresses a raw deflate stream produced by [`compress`].
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::DecompressionFailed(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_trips() {
        let data = b"Hello, World! This is a test of Deflate compression.".to_vec();
        let compressed = compress(&data);
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn empty_input_round_trips() {
        let compressed = compress(&[]);
        assert_eq!(decompress(&compressed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn compresses_repetitive_data() {
        let data = vec![b'a'; 4096];
        let compressed = compress(&data);
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn garbage_input_fails_to_decompress() {
        let garbage = vec![0xffu8; 32];
        assert!(decompress(&garbage).is_err());
    }

    proptest! {
        #[test]
        fn round_trip_any_input(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let compressed = compress(&data);
            prop_assert_eq!(decompress(&compressed).unwrap(), data);
        }
    }
}
