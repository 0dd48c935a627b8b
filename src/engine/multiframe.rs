//! Multi-frame orchestrator (C7).
//!
//! Applies the pixel LSB engine (C6) across the frames of an animated or
//! paged image (animated GIF, multi-page TIFF) under one of three modes.

use crate::capacity::{self, CapacityLimits};
use crate::engine::pixel;
use crate::{Error, Result};

/// Minimum byte capacity (at bit depth 1) for a frame to be considered usable.
pub const MIN_USABLE_CAPACITY: usize = 8;

const MAX_CHUNK_SIZE: u32 = 1_000_000;
const MAX_TOTAL_CHUNKS: u32 = 10_000;
const PROBE_FRAME_COUNT: usize = 5;

/// Length of the multi-frame chunk header, in bytes.
pub const CHUNK_HEADER_LEN: usize = 12;

/// A single RGBA frame plus its pixel dimensions.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA pixel buffer, row-major, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

impl Frame {
    fn capacity(&self, bit_depth: u8) -> usize {
        pixel::calculate_capacity(self.width, self.height, bit_depth)
    }

    fn is_usable(&self) -> bool {
        self.capacity(1) >= MIN_USABLE_CAPACITY
    }
}

/// Selects how a framed payload is spread across a multi-frame carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Embed the full payload into the first usable frame.
    First,
    /// Embed the full payload into every frame with sufficient capacity.
    All,
    /// Partition the payload across usable frames using chunk headers.
    Split,
}

fn usable_indices(frames: &[Frame]) -> Vec<usize> {
    frames
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_usable())
        .map(|(i, _)| i)
        .collect()
}

/// Options for a multi-frame embed or extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiFrameOptions {
    /// Pixel-LSB bit depth applied to each carried frame.
    pub bit_depth: u8,
    /// How the payload is spread across usable frames (embed only).
    pub mode: Mode,
    /// Which frame to read from in first/all mode (extract only); ignored
    /// once split mode is auto-detected.
    pub frame_index: usize,
    /// Pre-flight payload-size gate (C10), checked before any frame is mutated.
    pub capacity_limits: CapacityLimits,
}

impl Default for MultiFrameOptions {
    fn default() -> Self {
        Self {
            bit_depth: 1,
            mode: Mode::First,
            frame_index: 0,
            capacity_limits: CapacityLimits::default(),
        }
    }
}

impl MultiFrameOptions {
    /// Creates options with the given bit depth and mode.
    pub fn new(bit_depth: u8, mode: Mode) -> Self {
        Self {
            bit_depth,
            mode,
            ..Self::default()
        }
    }

    /// Sets the bit depth.
    pub fn bit_depth(mut self, bit_depth: u8) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Sets the mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the frame index read in first/all mode.
    pub fn frame_index(mut self, frame_index: usize) -> Self {
        self.frame_index = frame_index;
        self
    }

    /// Sets the capacity limits.
    pub fn capacity_limits(mut self, capacity_limits: CapacityLimits) -> Self {
        self.capacity_limits = capacity_limits;
        self
    }
}

/// Embeds `framed_payload` (already produced by [`crate::framing::encode_payload`])
/// across `frames` according to `options`.
pub fn embed(frames: &mut [Frame], framed_payload: &[u8], options: MultiFrameOptions) -> Result<()> {
    let usable = usable_indices(frames);
    if usable.is_empty() {
        return Err(Error::NoUsableFrames);
    }
    capacity::check_capacity(
        framed_payload.len(),
        options.capacity_limits.max_payload_bytes,
        &options.capacity_limits,
    )?;
    log::info!(
        "embedding {} bytes across {} usable frame(s) in {:?} mode",
        framed_payload.len(),
        usable.len(),
        options.mode,
    );

    match options.mode {
        Mode::First => {
            let idx = usable[0];
            pixel::embed_data(&mut frames[idx].rgba, framed_payload, pixel::PixelOptions::new(options.bit_depth))
        }
        Mode::All => {
            for &idx in &usable {
                if frames[idx].capacity(options.bit_depth) >= framed_payload.len() {
                    pixel::embed_data(
                        &mut frames[idx].rgba,
                        framed_payload,
                        pixel::PixelOptions::new(options.bit_depth),
                    )?;
                }
            }
            Ok(())
        }
        Mode::Split => embed_split(frames, &usable, framed_payload, options.bit_depth),
    }
}

fn embed_split(frames: &mut [Frame], usable: &[usize], framed_payload: &[u8], bit_depth: u8) -> Result<()> {
    let total_chunks = {
        let mut remaining = framed_payload.len();
        let mut count = 0u32;
        for &idx in usable {
            if remaining == 0 {
                break;
            }
            let cap = frames[idx].capacity(bit_depth).saturating_sub(CHUNK_HEADER_LEN);
            if cap == 0 {
                continue;
            }
            remaining = remaining.saturating_sub(cap);
            count += 1;
        }
        count
    };

    if total_chunks == 0 {
        return Err(Error::CapacityExceeded {
            required: framed_payload.len(),
            available: 0,
            suggestion: "use more or larger frames",
        });
    }

    let mut offset = 0usize;
    let mut chunk_index = 0u32;
    for &idx in usable {
        if offset >= framed_payload.len() {
            break;
        }
        let cap = frames[idx].capacity(bit_depth).saturating_sub(CHUNK_HEADER_LEN);
        if cap == 0 {
            continue;
        }
        let take = cap.min(framed_payload.len() - offset);
        let chunk_size = take as u32;

        let mut bytes = Vec::with_capacity(CHUNK_HEADER_LEN + take);
        bytes.extend_from_slice(&chunk_index.to_le_bytes());
        bytes.extend_from_slice(&total_chunks.to_le_bytes());
        bytes.extend_from_slice(&chunk_size.to_le_bytes());
        bytes.extend_from_slice(&framed_payload[offset..offset + take]);

        pixel::embed_data(&mut frames[idx].rgba, &bytes, pixel::PixelOptions::new(bit_depth))?;

        offset += take;
        chunk_index += 1;
    }

    Ok(())
}

fn read_chunk_header(frame: &Frame, bit_depth: u8) -> Option<(u32, u32, u32)> {
    let header = pixel::extract_data(&frame.rgba, CHUNK_HEADER_LEN, pixel::PixelOptions::new(bit_depth)).ok()?;
    let chunk_index = u32::from_le_bytes(header[0..4].try_into().unwrap());
    let total_chunks = u32::from_le_bytes(header[4..8].try_into().unwrap());
    let chunk_size = u32::from_le_bytes(header[8..12].try_into().unwrap());

    let plausible = chunk_size > 0
        && chunk_size <= MAX_CHUNK_SIZE
        && total_chunks > 0
        && total_chunks < MAX_TOTAL_CHUNKS
        && chunk_index < total_chunks;

    plausible.then_some((chunk_index, total_chunks, chunk_size))
}

/// Probes the first few frames for a plausible chunk header to decide
/// whether the carrier is in split mode.
fn detect_split_mode(frames: &[Frame], bit_depth: u8) -> bool {
    frames
        .iter()
        .take(PROBE_FRAME_COUNT)
        .any(|f| f.is_usable() && read_chunk_header(f, bit_depth).is_some())
}

/// Extracts the framed payload from a multi-frame carrier.
///
/// Auto-detects split mode by probing the first five frames for a
/// plausible chunk header; otherwise reads `frame_index` (default 0)
/// as a first/all-mode carrier.
pub fn extract(frames: &[Frame], options: MultiFrameOptions) -> Result<Vec<u8>> {
    let bit_depth = options.bit_depth;
    if detect_split_mode(frames, bit_depth) {
        extract_split(frames, bit_depth)
    } else {
        let frame = frames
            .get(options.frame_index)
            .ok_or_else(|| Error::invalid(format!("frame index {} out of range", options.frame_index)))?;
        // The caller doesn't know the payload length up front; read the
        // 5-byte frame header first to learn it.
        let header = pixel::extract_data(&frame.rgba, 5, pixel::PixelOptions::new(bit_depth))?;
        let len = u32::from_le_bytes(header[1..5].try_into().unwrap()) as usize;
        pixel::extract_data(&frame.rgba, 5 + len, pixel::PixelOptions::new(bit_depth))
    }
}

fn extract_split(frames: &[Frame], bit_depth: u8) -> Result<Vec<u8>> {
    let mut chunks: Vec<(u32, u32, Vec<u8>)> = Vec::new();

    for frame in frames.iter().filter(|f| f.is_usable()) {
        let Some((chunk_index, total_chunks, chunk_size)) = read_chunk_header(frame, bit_depth) else {
            continue;
        };
        let data = pixel::extract_data(
            &frame.rgba,
            CHUNK_HEADER_LEN + chunk_size as usize,
            pixel::PixelOptions::new(bit_depth),
        )?;
        chunks.push((chunk_index, total_chunks, data[CHUNK_HEADER_LEN..].to_vec()));
    }

    if chunks.is_empty() {
        return Err(Error::NoUsableFrames);
    }

    let expected_total = chunks[0].1;
    chunks.sort_by_key(|(idx, _, _)| *idx);

    let mut out = Vec::new();
    for (_, total, data) in &chunks {
        if *total != expected_total {
            return Err(Error::invalid("inconsistent total_chunks across chunk headers"));
        }
        out.extend_from_slice(data);
    }
    Ok(out)
}
