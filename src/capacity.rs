//! Capacity & validation (C10): pre-flight sizing, strict/warn modes, and
//! dimension/length guards shared by the embedding engines.

use crate::{Error, Result};

/// Upper bound on a secret payload's raw length, in bytes.
pub const MAX_SECRET_LENGTH: usize = 50_000;
/// Upper bound on a cover text's length, in bytes.
pub const MAX_COVER_LENGTH: usize = 100_000;
/// Upper bound on a message's raw length, in bytes.
pub const MAX_MESSAGE_LENGTH: usize = 10_485_760;
/// Upper bound on a file embedded via the binary helpers, in bytes.
pub const MAX_EMBED_FILE_SIZE: usize = 10_485_760;
/// Upper bound on a carrier image's encoded size, in bytes.
pub const MAX_IMAGE_SIZE: usize = 52_428_800;
/// Upper bound on either side of a carrier image, in pixels.
pub const MAX_IMAGE_DIMENSION: u32 = 10_000;
/// Upper bound on a sanitized filename's length, in bytes.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Governs whether exceeding an estimated or exact capacity is a hard
/// failure (`true`, the default) or a warning that lets the embed proceed
/// (`false`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityLimits {
    /// Whether capacity overruns are hard errors (`true`) or warnings.
    pub strict_capacity: bool,
    /// Caller-supplied ceiling on the estimated post-framing payload size.
    pub max_payload_bytes: usize,
}

impl Default for CapacityLimits {
    fn default() -> Self {
        Self {
            strict_capacity: true,
            max_payload_bytes: MAX_MESSAGE_LENGTH,
        }
    }
}

impl CapacityLimits {
    /// Returns limits with `strict_capacity` demoted to a warning.
    pub fn warn_only(max_payload_bytes: usize) -> Self {
        Self {
            strict_capacity: false,
            max_payload_bytes,
        }
    }
}

/// Outcome of a capacity pre-flight check: either the embed may proceed
/// unconditionally, or it may proceed with a warning message attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityCheck {
    /// Estimated/actual size is within bounds.
    Ok,
    /// Size exceeds bounds, but `strict_capacity` is `false` so the caller
    /// may proceed at their own risk.
    Warning(String),
}

/// Estimates post-compression/encryption size for a text payload of length `len`.
pub fn estimate_text_size(len: usize, encrypted: bool) -> usize {
    let base = (len as f64 * 0.6).ceil() as usize;
    base + if encrypted { 32 } else { 0 }
}

/// Estimates post-compression/encryption size for a binary payload of length `len`.
pub fn estimate_binary_size(len: usize, encrypted: bool) -> usize {
    let base = (len as f64 * 0.7).ceil() as usize;
    base + if encrypted { 32 } else { 0 }
}

/// Validates that `width`/`height` are positive and within `MAX_IMAGE_DIMENSION`,
/// and that the total pixel count is within `MAX_IMAGE_DIMENSION²`.
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::invalid("image dimensions must be positive"));
    }
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(Error::invalid(format!(
            "image dimension exceeds maximum of {MAX_IMAGE_DIMENSION}"
        )));
    }
    let pixels = width as u64 * height as u64;
    let max_pixels = MAX_IMAGE_DIMENSION as u64 * MAX_IMAGE_DIMENSION as u64;
    if pixels > max_pixels {
        return Err(Error::invalid(format!(
            "image pixel count {pixels} exceeds maximum of {max_pixels}"
        )));
    }
    Ok(())
}

/// Checks `required` bytes/bits against `available` capacity, gated by
/// `limits.strict_capacity`.
pub fn check_capacity(required: usize, available: usize, limits: &CapacityLimits) -> Result<CapacityCheck> {
    if required <= available {
        return Ok(CapacityCheck::Ok);
    }
    let message = format!(
        "payload requires {required} bytes but carrier holds only {available} bytes"
    );
    if limits.strict_capacity {
        Err(Error::CapacityExceeded {
            required,
            available,
            suggestion: "use a shorter message, a larger image, a higher bit depth, or enable chroma embedding",
        })
    } else {
        log::warn!("{message}; proceeding because strict_capacity is disabled");
        Ok(CapacityCheck::Warning(message))
    }
}

/// Checks `len` (a secret or cover length) against `max`, failing with
/// [`Error::InvalidArgument`] if it is exceeded.
pub fn check_length(len: usize, max: usize, what: &str) -> Result<()> {
    if len > max {
        return Err(Error::invalid(format!(
            "{what} length {len} exceeds maximum of {max}"
        )));
    }
    Ok(())
}

/// Strips `/ \ ? % * : | " < >` and leading dots from `name`, truncates to
/// [`MAX_FILENAME_LENGTH`] while preserving the extension, and falls back
/// to `"file"` if the result is empty.
pub fn sanitize_filename(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !"/\\?%*:|\"<>".contains(*c))
        .collect();
    let trimmed = stripped.trim_start_matches('.');

    let sanitized = if trimmed.len() > MAX_FILENAME_LENGTH {
        truncate_preserving_extension(trimmed, MAX_FILENAME_LENGTH)
    } else {
        trimmed.to_string()
    };

    if sanitized.is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

fn truncate_preserving_extension(name: &str, max_len: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot < name.len() - 1 => {
            let ext = &name[dot..];
            if ext.len() >= max_len {
                name[..max_len].to_string()
            } else {
                let stem_budget = max_len - ext.len();
                format!("{}{}", &name[..stem_budget.min(dot)], ext)
            }
        }
        _ => name[..max_len].to_string(),
    }
}
