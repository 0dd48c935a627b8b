//! External image codec collaborator (§6), backed by the `image` crate.
//!
//! Provides `decode`/`encode` for single-frame raster carriers (PNG, WebP,
//! TIFF) and `decode_frames`/`encode_frames` for the animated GIF case
//! consumed by the multi-frame orchestrator (C7).

use std::io::Cursor;

use image::codecs::gif::{GifDecoder, GifEncoder};
use image::{AnimationDecoder, ImageFormat, ImageReader, RgbaImage};

use crate::engine::multiframe::Frame;
use crate::{Error, Result};

/// A decoded single-frame raster image.
#[derive(Debug, Clone)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA pixel buffer, row-major, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

/// Decodes `bytes` (PNG, WebP, TIFF, or any other format the `image` crate
/// recognises) into an RGBA buffer.
pub fn decode(bytes: &[u8]) -> Result<Image> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(Error::Io)?;
    let format = reader.format();
    let dynamic = reader
        .decode()
        .map_err(|e| Error::UnsupportedFormat(format!("{e} (guessed format: {format:?})")))?;
    let rgba = dynamic.to_rgba8();
    Ok(Image {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Encodes an RGBA buffer in the given format.
pub fn encode(image: &Image, format: ImageFormat) -> Result<Vec<u8>> {
    let buffer = RgbaImage::from_raw(image.width, image.height, image.rgba.clone())
        .ok_or_else(|| Error::invalid("RGBA buffer length does not match width*height*4"))?;
    let mut out = Vec::new();
    buffer
        .write_to(&mut Cursor::new(&mut out), format)
        .map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
    Ok(out)
}

/// Decodes every frame of an animated GIF into RGBA [`Frame`]s suitable for
/// the multi-frame orchestrator (C7).
pub fn decode_frames(bytes: &[u8]) -> Result<Vec<Frame>> {
    let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    Ok(frames
        .into_iter()
        .map(|f| {
            let buffer = f.into_buffer();
            Frame {
                width: buffer.width(),
                height: buffer.height(),
                rgba: buffer.into_raw(),
            }
        })
        .collect())
}

/// Re-encodes a sequence of RGBA [`Frame`]s as an animated GIF.
///
/// Pass-through frames must already carry their original pixel data
/// bit-exact (§4.7); this function does not special-case unmodified frames.
pub fn encode_frames(frames: &[Frame]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        for frame in frames {
            let buffer = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
                .ok_or_else(|| Error::invalid("RGBA frame length does not match width*height*4"))?;
            encoder
                .encode_frame(image::Frame::new(buffer))
                .map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_round_trips() {
        let image = Image {
            width: 4,
            height: 4,
            rgba: vec![0xFFu8; 4 * 4 * 4],
        };
        let encoded = encode(&image, ImageFormat::Png).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.width, 4);
        assert_eq!(decoded.height, 4);
        assert_eq!(decoded.rgba, image.rgba);
    }

    #[test]
    fn unrecognised_bytes_fail_to_decode() {
        assert!(decode(b"definitely not an image").is_err());
    }
}
