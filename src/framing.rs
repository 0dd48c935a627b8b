//! Payload framing (C5): types, length-prefix headers, and the wrappers
//! that glue compression (C3) and password encryption (C4) together.

use crate::crypto::{Password, kdf};
use crate::{Error, Result, codec};

/// Payload type tag carried in the frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadType {
    /// UTF-8 text.
    Text = 0x01,
    /// Opaque binary data.
    Binary = 0x02,
}

impl PayloadType {
    /// The wire byte for this type.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parses a wire byte, if it names a known type.
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(PayloadType::Text),
            0x02 => Some(PayloadType::Binary),
            _ => None,
        }
    }
}

/// Length of the `[type: u8][len: u32 LE]` frame header.
pub const HEADER_LEN: usize = 5;

/// Compresses, optionally encrypts, and frames `raw_bytes`.
///
/// Output: `[type: u8] ‖ [len(x): u32 LE] ‖ x`, where `x` is `raw_bytes`
/// after compression and (if `password` is set) encryption.
pub fn encode_payload(kind: PayloadType, raw_bytes: &[u8], password: Option<&Password>) -> Vec<u8> {
    let mut x = codec::compress(raw_bytes);
    if let Some(password) = password {
        x = kdf::encrypt(&x, password);
    }

    let mut out = Vec::with_capacity(HEADER_LEN + x.len());
    out.push(kind.as_u8());
    out.extend_from_slice(&(x.len() as u32).to_le_bytes());
    out.extend_from_slice(&x);
    out
}

/// Reads the frame header, decrypts/decompresses, and returns `(type, raw_bytes)`.
///
/// Fails with [`Error::PayloadTypeMismatch`] if `expected_type` is set and
/// disagrees with the header, or [`Error::Truncated`] if fewer than `len`
/// bytes follow the header.
pub fn decode_payload(
    framed_bytes: &[u8],
    password: Option<&Password>,
    expected_type: Option<PayloadType>,
) -> Result<(PayloadType, Vec<u8>)> {
    if framed_bytes.len() < HEADER_LEN {
        return Err(Error::Truncated {
            expected: HEADER_LEN,
            found: framed_bytes.len(),
        });
    }
    let type_byte = framed_bytes[0];
    let kind = PayloadType::from_u8(type_byte)
        .ok_or_else(|| Error::invalid(format!("unknown payload type byte {type_byte:#04x}")))?;

    if let Some(expected) = expected_type {
        if expected != kind {
            return Err(Error::PayloadTypeMismatch {
                expected: expected.as_u8(),
                found: kind.as_u8(),
            });
        }
    }

    let len = u32::from_le_bytes(framed_bytes[1..5].try_into().unwrap()) as usize;
    let body = &framed_bytes[HEADER_LEN..];
    if body.len() < len {
        return Err(Error::Truncated {
            expected: len,
            found: body.len(),
        });
    }
    let mut x = body[..len].to_vec();

    if let Some(password) = password {
        x = kdf::decrypt(&x, password)?;
    }
    let raw_bytes = codec::decompress(&x)?;
    Ok((kind, raw_bytes))
}

/// Decodes without asserting an expected type, handing the caller whichever
/// type the header declares.
pub fn decode(framed_bytes: &[u8], password: Option<&Password>) -> Result<(PayloadType, Vec<u8>)> {
    decode_payload(framed_bytes, password, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_without_password() {
        let framed = encode_payload(PayloadType::Text, b"hello world", None);
        let (kind, raw) = decode_payload(&framed, None, None).unwrap();
        assert_eq!(kind, PayloadType::Text);
        assert_eq!(raw, b"hello world");
    }

    #[test]
    fn round_trips_with_password() {
        let password = Password::new("hunter2");
        let framed = encode_payload(PayloadType::Binary, b"\x00\x01\x02secret", Some(&password));
        let (kind, raw) = decode_payload(&framed, Some(&password), None).unwrap();
        assert_eq!(kind, PayloadType::Binary);
        assert_eq!(raw, b"\x00\x01\x02secret");
    }

    #[test]
    fn expected_type_mismatch_fails() {
        let framed = encode_payload(PayloadType::Text, b"hi", None);
        let err = decode_payload(&framed, None, Some(PayloadType::Binary)).unwrap_err();
        assert!(matches!(err, Error::PayloadTypeMismatch { .. }));
    }

    #[test]
    fn truncated_body_fails() {
        let mut framed = encode_payload(PayloadType::Text, b"hello world", None);
        framed.truncate(HEADER_LEN + 2);
        let err = decode_payload(&framed, None, None).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
    }

    #[test]
    fn wrong_password_fails_to_decode() {
        let secret = b"hello world, this message is long enough that a wrong key almost never produces a coincidentally valid deflate stream";
        let framed = encode_payload(PayloadType::Text, secret, Some(&Password::new("right")));
        match decode_payload(&framed, Some(&Password::new("wrong")), None) {
            Err(Error::DecompressionFailed(_) | Error::DecryptionFailed(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok((_, raw)) => assert_ne!(raw, secret, "wrong password must not decode to the original secret"),
        }
    }

    #[test]
    fn auto_detect_decode_returns_declared_type() {
        let framed = encode_payload(PayloadType::Binary, b"\x01\x02\x03", None);
        let (kind, raw) = decode(&framed, None).unwrap();
        assert_eq!(kind, PayloadType::Binary);
        assert_eq!(raw, b"\x01\x02\x03");
    }
}
