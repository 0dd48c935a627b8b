//! Bit/byte marshalling (C1).
//!
//! Every embedding engine consumes and produces a plain bit stream; this
//! module is the sole place that converts between that stream and bytes,
//! LSB-first within each byte.

/// Converts a byte sequence into its bit stream, LSB-first per byte.
///
/// For byte `b`, emits `b>>0 & 1, b>>1 & 1, ..., b>>7 & 1` in that order.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &b in bytes {
        for i in 0..8 {
            bits.push((b >> i) & 1);
        }
    }
    bits
}

/// Reassembles a bit stream into bytes, 8 bits at a time, LSB-first.
///
/// A trailing partial byte (length not a multiple of 8) is dropped.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|chunk| {
            let mut byte = 0u8;
            for (i, &bit) in chunk.iter().enumerate() {
                byte |= (bit & 1) << i;
            }
            byte
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_trips_known_bytes() {
        let bytes = vec![0x00, 0xFF, 0xA5, 0x01, 0x80];
        assert_eq!(bits_to_bytes(&bytes_to_bits(&bytes)), bytes);
    }

    #[test]
    fn bit_order_is_lsb_first() {
        let bits = bytes_to_bits(&[0b0000_0001]);
        assert_eq!(bits, vec![1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn trailing_partial_byte_is_dropped() {
        let mut bits = bytes_to_bits(&[0xAB]);
        bits.push(1);
        bits.push(0);
        assert_eq!(bits_to_bytes(&bits), vec![0xAB]);
    }

    proptest! {
        #[test]
        fn round_trip_isomorphism(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(bits_to_bytes(&bytes_to_bits(&bytes)), bytes);
        }
    }
}
