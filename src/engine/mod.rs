//! The embedding engines: pixel LSB (C6), multi-frame orchestration (C7),
//! JPEG DCT coefficients (C8), and zero-width-character text (C9).

pub mod jpeg;
pub mod multiframe;
pub mod pixel;
pub mod zwc;

#[cfg(feature = "images")]
pub mod image_io;
