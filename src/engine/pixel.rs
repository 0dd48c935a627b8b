//! Pixel LSB engine (C6).
//!
//! Embeds/extracts a bit stream into the low bits of the R, G, B channels
//! of an RGBA buffer. The alpha channel is never touched (§4.6, §9): this
//! keeps transparency masks bit-identical and is a hard invariant, not an
//! optimisation.

use crate::bits::{bits_to_bytes, bytes_to_bits};
use crate::capacity::{self, CapacityLimits};
use crate::{Error, Result};

/// Minimum valid bit depth.
pub const MIN_BIT_DEPTH: u8 = 1;
/// Maximum valid bit depth.
pub const MAX_BIT_DEPTH: u8 = 4;

/// Magic byte identifying a file-embedding header (§6).
const FILE_HEADER_MAGIC: u8 = 0x55;

fn validate_bit_depth(bit_depth: u8) -> Result<()> {
    if !(MIN_BIT_DEPTH..=MAX_BIT_DEPTH).contains(&bit_depth) {
        return Err(Error::invalid(format!(
            "bit depth {bit_depth} out of range {MIN_BIT_DEPTH}..={MAX_BIT_DEPTH}"
        )));
    }
    Ok(())
}

/// Options for a pixel-LSB embed or extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelOptions {
    /// Number of low bits used per non-alpha channel byte (1-4).
    pub bit_depth: u8,
    /// Pre-flight payload-size gate (C10), checked before the carrier is mutated.
    pub capacity_limits: CapacityLimits,
}

impl Default for PixelOptions {
    fn default() -> Self {
        Self {
            bit_depth: MIN_BIT_DEPTH,
            capacity_limits: CapacityLimits::default(),
        }
    }
}

impl PixelOptions {
    /// Creates options with the given bit depth.
    pub fn new(bit_depth: u8) -> Self {
        Self {
            bit_depth,
            ..Self::default()
        }
    }

    /// Sets the bit depth.
    pub fn bit_depth(mut self, bit_depth: u8) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Sets the capacity limits.
    pub fn capacity_limits(mut self, capacity_limits: CapacityLimits) -> Self {
        self.capacity_limits = capacity_limits;
        self
    }
}

/// Returns the number of RGB channel bytes in an RGBA buffer of `len` bytes
/// (i.e. `len` with every fourth, alpha, byte excluded).
fn channel_byte_count(len: usize) -> usize {
    (len / 4) * 3
}

/// Computes the pixel-LSB byte capacity of a `width × height` RGBA image at
/// the given bit depth: `floor(width · height · 3 · bit_depth / 8)`.
pub fn calculate_capacity(width: u32, height: u32, bit_depth: u8) -> usize {
    (width as u64 * height as u64 * 3 * bit_depth as u64 / 8) as usize
}

/// Iterates the non-alpha bytes of an RGBA buffer.
fn channel_bytes(rgba: &[u8]) -> impl Iterator<Item = &u8> {
    rgba.iter()
        .enumerate()
        .filter(|(i, _)| i % 4 != 3)
        .map(|(_, b)| b)
}

fn channel_bytes_mut(rgba: &mut [u8]) -> impl Iterator<Item = &mut u8> {
    rgba.iter_mut()
        .enumerate()
        .filter(|(i, _)| i % 4 != 3)
        .map(|(_, b)| b)
}

/// Embeds `bits` into the low `bit_depth` bits of each non-alpha channel
/// byte of `rgba`, in place. Fails with [`Error::CapacityExceeded`] if
/// `bits` does not fit.
pub fn embed_bits(rgba: &mut [u8], bits: &[u8], bit_depth: u8) -> Result<()> {
    validate_bit_depth(bit_depth)?;

    let capacity_bits = channel_byte_count(rgba.len()) * bit_depth as usize;
    if bits.len() > capacity_bits {
        return Err(Error::CapacityExceeded {
            required: bits.len().div_ceil(8),
            available: capacity_bits / 8,
            suggestion: "use a shorter message, a larger image, or a higher bit depth",
        });
    }

    let mask = !(0xFFu8 << bit_depth);
    let mut chunks = bits.chunks(bit_depth as usize);
    for byte in channel_bytes_mut(rgba) {
        let Some(chunk) = chunks.next() else { break };
        let mut value = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            value |= (bit & 1) << i;
        }
        *byte = (*byte & !mask) | value;
    }
    Ok(())
}

/// Extracts `bit_count` bits from the low `bit_depth` bits of each
/// non-alpha channel byte of `rgba`, starting at channel-byte index 0.
pub fn extract_bits(rgba: &[u8], bit_count: usize, bit_depth: u8) -> Result<Vec<u8>> {
    validate_bit_depth(bit_depth)?;

    let capacity_bits = channel_byte_count(rgba.len()) * bit_depth as usize;
    if bit_count > capacity_bits {
        return Err(Error::CapacityExceeded {
            required: bit_count.div_ceil(8),
            available: capacity_bits / 8,
            suggestion: "request fewer bits than the carrier holds",
        });
    }

    let mut bits = Vec::with_capacity(bit_count);
    'outer: for byte in channel_bytes(rgba) {
        for i in 0..bit_depth {
            if bits.len() == bit_count {
                break 'outer;
            }
            bits.push((byte >> i) & 1);
        }
    }
    Ok(bits)
}

/// Embeds a UTF-8 text message with a 4-byte little-endian length prefix
/// (the image-text header, §6) into `rgba`.
pub fn embed_text(rgba: &mut [u8], message: &str, options: PixelOptions) -> Result<()> {
    capacity::check_capacity(message.len(), options.capacity_limits.max_payload_bytes, &options.capacity_limits)?;
    log::info!(
        "embedding {} bytes of text into a pixel carrier (capacity {} bytes, bit depth {})",
        message.len(),
        channel_byte_count(rgba.len()) * options.bit_depth as usize / 8,
        options.bit_depth,
    );
    let mut framed = (message.len() as u32).to_le_bytes().to_vec();
    framed.extend_from_slice(message.as_bytes());
    embed_bits(rgba, &bytes_to_bits(&framed), options.bit_depth)
}

/// Extracts a UTF-8 text message previously embedded with [`embed_text`].
pub fn extract_text(rgba: &[u8], options: PixelOptions) -> Result<String> {
    let header_bits = extract_bits(rgba, 32, options.bit_depth)?;
    let header = bits_to_bytes(&header_bits);
    let len = u32::from_le_bytes(header.try_into().unwrap()) as usize;

    let total_bits = 32 + 8 * len;
    let bits = extract_bits(rgba, total_bits, options.bit_depth)?;
    let bytes = bits_to_bytes(&bits[32..]);

    String::from_utf8(bytes).map_err(|e| Error::invalid(format!("extracted bytes are not valid UTF-8: {e}")))
}

/// Embeds raw binary data with no internal header; the caller supplies the
/// length out of band for extraction.
pub fn embed_data(rgba: &mut [u8], data: &[u8], options: PixelOptions) -> Result<()> {
    capacity::check_capacity(data.len(), options.capacity_limits.max_payload_bytes, &options.capacity_limits)?;
    log::info!(
        "embedding {} bytes of binary data into a pixel carrier (bit depth {})",
        data.len(),
        options.bit_depth,
    );
    embed_bits(rgba, &bytes_to_bits(data), options.bit_depth)
}

/// Extracts `len` bytes of raw binary data previously embedded with
/// [`embed_data`].
pub fn extract_data(rgba: &[u8], len: usize, options: PixelOptions) -> Result<Vec<u8>> {
    let bits = extract_bits(rgba, 8 * len, options.bit_depth)?;
    Ok(bits_to_bytes(&bits))
}

/// Embeds `data` under `filename` using the file-embedding header (§6):
/// `magic: u8 = 0x55`, `name_len: u8`, `name: bytes[name_len]`,
/// `file_size: u32 LE`, followed by `data` itself. `filename` is sanitized
/// (C10) before being written.
pub fn embed_file(rgba: &mut [u8], filename: &str, data: &[u8], options: PixelOptions) -> Result<()> {
    capacity::check_length(data.len(), capacity::MAX_EMBED_FILE_SIZE, "embedded file")?;
    let name = capacity::sanitize_filename(filename);

    let required = 1 + 1 + name.len() + 4 + data.len();
    capacity::check_capacity(required, options.capacity_limits.max_payload_bytes, &options.capacity_limits)?;
    log::info!(
        "embedding file {name:?} ({} bytes) into a pixel carrier (bit depth {})",
        data.len(),
        options.bit_depth,
    );

    let mut framed = Vec::with_capacity(required);
    framed.push(FILE_HEADER_MAGIC);
    framed.push(name.len() as u8);
    framed.extend_from_slice(name.as_bytes());
    framed.extend_from_slice(&(data.len() as u32).to_le_bytes());
    framed.extend_from_slice(data);

    embed_bits(rgba, &bytes_to_bits(&framed), options.bit_depth)
}

/// Extracts a `(filename, data)` pair previously embedded with [`embed_file`].
pub fn extract_file(rgba: &[u8], options: PixelOptions) -> Result<(String, Vec<u8>)> {
    let prefix_bits = extract_bits(rgba, 8 * 2, options.bit_depth)?;
    let prefix = bits_to_bytes(&prefix_bits);
    if prefix[0] != FILE_HEADER_MAGIC {
        return Err(Error::invalid(format!(
            "expected file header magic {FILE_HEADER_MAGIC:#04x}, found {:#04x}",
            prefix[0]
        )));
    }
    let name_len = prefix[1] as usize;

    let header_bits_len = 8 * (2 + name_len + 4);
    let header_bits = extract_bits(rgba, header_bits_len, options.bit_depth)?;
    let header = bits_to_bytes(&header_bits);
    let name = String::from_utf8(header[2..2 + name_len].to_vec())
        .map_err(|e| Error::invalid(format!("embedded filename is not valid UTF-8: {e}")))?;
    let file_size = u32::from_le_bytes(header[2 + name_len..2 + name_len + 4].try_into().unwrap()) as usize;

    let total_bits = header_bits_len + 8 * file_size;
    let bits = extract_bits(rgba, total_bits, options.bit_depth)?;
    let bytes = bits_to_bytes(&bits);
    let data = bytes[2 + name_len + 4..].to_vec();

    Ok((name, data))
}

/// Validates `width`/`height` (§4.10) before an embed.
pub fn validate_carrier_dimensions(width: u32, height: u32) -> Result<()> {
    capacity::validate_dimensions(width, height)
}
