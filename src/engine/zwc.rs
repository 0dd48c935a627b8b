//! Zero-width character (ZWC) text engine (C9).
//!
//! Encodes a byte sequence as base-6 sequences of six zero-width code
//! points, bracketed by sentinels, and optionally scattered through a
//! cover text at natural break points.

use crate::crypto::Password;
use crate::framing::{self, PayloadType};
use crate::{Error, Result};

/// The ordered base-6 alphabet (§3, §6).
pub const ALPHABET: [char; 6] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}', '\u{2060}', '\u{2061}'];

const START: [char; 3] = ['\u{200B}', '\u{200C}', '\u{200B}'];
const END: [char; 3] = ['\u{200C}', '\u{200B}', '\u{200C}'];

const DIGITS_PER_BYTE: usize = 4;
const HEADER_ZWC_LEN: usize = framing::HEADER_LEN * DIGITS_PER_BYTE;

const BREAK_CHARS: [char; 8] = ['\n', ' ', '.', ',', ';', ':', '!', '?'];

fn digit_index(c: char) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|p| p as u8)
}

/// Encodes `bytes` as ZWC code points, four base-6 digits per byte,
/// most-significant digit first.
pub fn encode_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * DIGITS_PER_BYTE);
    for &b in bytes {
        let digits = [(b / 216) % 6, (b / 36) % 6, (b / 6) % 6, b % 6];
        for d in digits {
            out.push(ALPHABET[d as usize]);
        }
    }
    out
}

/// Decodes a run of ZWC code points (with any non-ZWC characters filtered
/// out first) back into bytes. Fails with [`Error::InvalidZwcLength`] if
/// the digit count is not a multiple of four.
pub fn decode_bytes(zwc: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = zwc.chars().filter_map(digit_index).collect();
    if digits.len() % DIGITS_PER_BYTE != 0 {
        return Err(Error::InvalidZwcLength(digits.len()));
    }
    Ok(digits
        .chunks_exact(DIGITS_PER_BYTE)
        .map(|d| {
            (d[0] as u32 * 216 + d[1] as u32 * 36 + d[2] as u32 * 6 + d[3] as u32) as u8
        })
        .collect())
}

/// Placement strategy for the embedded ZWC run within a cover text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Append `START ‖ zwc ‖ END` after the cover text unchanged.
    #[default]
    Appended,
    /// Scatter ZWC characters at natural break points within the cover text.
    Distributed,
}

/// Options for a ZWC text embed or extract.
#[derive(Debug, Clone, Default)]
pub struct ZwcOptions {
    /// How the ZWC run is placed within the cover text (encode only).
    pub placement: Placement,
    /// Password for the underlying payload encryption, if any.
    pub password: Option<Password>,
}

impl ZwcOptions {
    /// Creates options with the given placement and no password.
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            password: None,
        }
    }

    /// Sets the placement strategy.
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Sets the password.
    pub fn password(mut self, password: impl Into<Password>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Encodes `secret` as a payload, optionally password-encrypted, and
/// embeds it into `cover` as zero-width characters.
pub fn encode_text(cover: &str, secret: &str, options: &ZwcOptions) -> String {
    log::info!(
        "embedding {} bytes of ZWC text ({:?} placement, encrypted={})",
        secret.len(),
        options.placement,
        options.password.is_some(),
    );
    let framed = framing::encode_payload(PayloadType::Text, secret.as_bytes(), options.password.as_ref());
    let zwc: String = encode_bytes(&framed).chars().collect();

    match options.placement {
        Placement::Appended => append(cover, &zwc),
        Placement::Distributed => distribute(cover, &zwc),
    }
}

fn append(cover: &str, zwc: &str) -> String {
    let mut out = String::with_capacity(cover.len() + zwc.len() + 6);
    out.push_str(cover);
    out.extend(START);
    out.push_str(zwc);
    out.extend(END);
    out
}

fn distribute(cover: &str, zwc: &str) -> String {
    let break_positions: Vec<usize> = cover
        .char_indices()
        .filter(|(_, c)| BREAK_CHARS.contains(c))
        .map(|(i, c)| i + c.len_utf8())
        .collect();

    if break_positions.is_empty() {
        return append(cover, zwc);
    }

    let zwc_chars: Vec<char> = zwc.chars().collect();
    let chunks_per_point = zwc_chars.len().div_ceil(break_positions.len());

    let mut out = String::with_capacity(cover.len() + zwc.len() + 6);
    out.extend(START);

    let mut cursor = 0usize;
    let mut zwc_pos = 0usize;
    for &pos in &break_positions {
        out.push_str(&cover[cursor..pos]);
        cursor = pos;
        if zwc_pos < zwc_chars.len() {
            let take = chunks_per_point.min(zwc_chars.len() - zwc_pos);
            out.extend(&zwc_chars[zwc_pos..zwc_pos + take]);
            zwc_pos += take;
        }
    }
    out.push_str(&cover[cursor..]);

    // Any remainder (more digits than break points could hold) goes at the end.
    if zwc_pos < zwc_chars.len() {
        out.extend(&zwc_chars[zwc_pos..]);
    }
    out.extend(END);
    out
}

/// Returns true iff `text` contains the `START` sentinel followed by at
/// least 16 ZWC code points.
pub fn has_hidden_data(text: &str) -> bool {
    let Some(start_idx) = find_start(text) else {
        return false;
    };
    text[start_idx..].chars().filter(|c| ALPHABET.contains(c)).count() >= 16
}

/// Returns the byte offset immediately after the `START` sentinel, if present.
fn find_start(text: &str) -> Option<usize> {
    let start_str: String = START.iter().collect();
    text.find(&start_str).map(|i| i + start_str.len())
}

/// Removes every ZWC code point from `text`, regardless of sentinels.
pub fn strip_zwc(text: &str) -> String {
    text.chars().filter(|c| !ALPHABET.contains(c)).collect()
}

/// A single annotated code point, for debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotated {
    /// The underlying character.
    pub ch: char,
    /// A symbolic name (`ZWSP`, `ZWNJ`, `ZWJ`, `BOM`, `WJ`, `FUN`, `START`, `END`),
    /// or `None` for ordinary visible characters.
    pub name: Option<&'static str>,
}

fn symbolic_name(c: char) -> Option<&'static str> {
    match c {
        '\u{200B}' => Some("ZWSP"),
        '\u{200C}' => Some("ZWNJ"),
        '\u{200D}' => Some("ZWJ"),
        '\u{FEFF}' => Some("BOM"),
        '\u{2060}' => Some("WJ"),
        '\u{2061}' => Some("FUN"),
        _ => None,
    }
}

/// Annotates every character of `text` with a symbolic name where one
/// applies, for debugging. Sentinel runs are not specially detected here;
/// callers inspecting a decoded stream can do so via [`find_start`]-style logic.
pub fn visualize(text: &str) -> Vec<Annotated> {
    text.chars()
        .map(|ch| Annotated {
            ch,
            name: symbolic_name(ch),
        })
        .collect()
}

/// Extracts and decodes the secret previously embedded with [`encode_text`].
///
/// Returns `None` if fewer than one header's worth of ZWC characters (20)
/// follow the `START` sentinel.
pub fn decode_text(text: &str, options: &ZwcOptions) -> Result<Option<String>> {
    let password = options.password.as_ref();
    let Some(start_idx) = find_start(text) else {
        return Ok(None);
    };

    let zwc: String = text[start_idx..].chars().filter(|c| ALPHABET.contains(c)).collect();
    if zwc.chars().count() < HEADER_ZWC_LEN {
        return Ok(None);
    }

    let header_zwc: String = zwc.chars().take(HEADER_ZWC_LEN).collect();
    let header = decode_bytes(&header_zwc)?;
    let len = u32::from_le_bytes(header[1..5].try_into().unwrap()) as usize;

    let total_zwc_needed = HEADER_ZWC_LEN + len * DIGITS_PER_BYTE;
    let framed_zwc: String = zwc.chars().take(total_zwc_needed).collect();
    if framed_zwc.chars().count() < total_zwc_needed {
        return Err(Error::Truncated {
            expected: total_zwc_needed,
            found: framed_zwc.chars().count(),
        });
    }

    let framed_bytes = decode_bytes(&framed_zwc)?;
    let (_, raw_bytes) = framing::decode_payload(&framed_bytes, password, Some(PayloadType::Text))?;
    let secret = String::from_utf8(raw_bytes)
        .map_err(|e| Error::invalid(format!("decoded secret is not valid UTF-8: {e}")))?;
    Ok(Some(secret))
}

/// Advisory capacity heuristic (§4.9): not enforced unless the caller
/// checks it explicitly.
pub fn estimate_capacity(cover_len: usize) -> usize {
    let positions = (cover_len as f64 * 0.1).floor() as usize;
    let positions = positions.max(cover_len).saturating_sub(26);
    positions / DIGITS_PER_BYTE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trips_through_zwc() {
        for b in [0u8, 1, 42, 127, 255] {
            let zwc = encode_bytes(&[b]);
            assert_eq!(zwc.chars().count(), 4);
            assert_eq!(decode_bytes(&zwc).unwrap(), vec![b]);
        }
    }

    #[test]
    fn invalid_digit_count_fails() {
        let mut zwc = encode_bytes(&[5]);
        zwc.pop();
        assert!(matches!(decode_bytes(&zwc), Err(Error::InvalidZwcLength(_))));
    }

    #[test]
    fn appended_mode_round_trip() {
        let cover = "A perfectly ordinary sentence, repeated several times. ".repeat(10);
        let options = ZwcOptions::new(Placement::Appended);
        let encoded = encode_text(&cover, "Secret message", &options);
        assert!(has_hidden_data(&encoded));
        assert_eq!(decode_text(&encoded, &options).unwrap().unwrap(), "Secret message");
    }

    #[test]
    fn distributed_mode_round_trip() {
        let cover = "A perfectly ordinary sentence, repeated several times. ".repeat(10);
        let options = ZwcOptions::new(Placement::Distributed);
        let encoded = encode_text(&cover, "Secret message", &options);
        assert_eq!(decode_text(&encoded, &options).unwrap().unwrap(), "Secret message");
    }

    #[test]
    fn round_trip_with_password() {
        let cover = "A".repeat(300);
        let options = ZwcOptions::new(Placement::Appended).password("mypassword");
        let encoded = encode_text(&cover, "Secret message", &options);
        assert_eq!(decode_text(&encoded, &options).unwrap().unwrap(), "Secret message");
    }

    #[test]
    fn wrong_password_fails() {
        let cover = "A".repeat(300);
        let encode_options = ZwcOptions::new(Placement::Appended).password("right");
        let encoded = encode_text(&cover, "Secret message", &encode_options);
        let decode_options = ZwcOptions::new(Placement::Appended).password("wrong");
        let result = decode_text(&encoded, &decode_options);
        assert!(result.is_err());
    }

    #[test]
    fn no_start_sentinel_has_no_hidden_data() {
        assert!(!has_hidden_data("just plain text"));
    }

    #[test]
    fn strip_zwc_restores_original_for_appended_mode() {
        let cover = "hello world".to_string();
        let encoded = encode_text(&cover, "s", &ZwcOptions::new(Placement::Appended));
        assert_eq!(strip_zwc(&encoded).trim_end(), cover.trim_end());
    }

    #[test]
    fn visualize_names_known_code_points() {
        let annotated = visualize("a\u{200B}b");
        assert_eq!(annotated[1].name, Some("ZWSP"));
        assert_eq!(annotated[0].name, None);
    }
}
