//! End-to-end round-trip scenarios (spec §8 scenarios 1-3).

use veilcode::engine::jpeg::{self, Block, Coefficients, Component};
use veilcode::engine::pixel;

#[test]
fn pixel_lsb_round_trip_white_image() {
    let mut rgba = vec![0xFFu8; 10 * 10 * 4];
    let options = pixel::PixelOptions::new(1);
    pixel::embed_text(&mut rgba, "Hello", options).unwrap();
    assert_eq!(pixel::extract_text(&rgba, options).unwrap(), "Hello");

    for i in (3..rgba.len()).step_by(4) {
        assert_eq!(rgba[i], 0xFF);
    }
}

#[test]
fn bit_depth_capacity_matches_spec_table() {
    assert_eq!(pixel::calculate_capacity(100, 100, 1), 3750);
    assert_eq!(pixel::calculate_capacity(100, 100, 2), 7500);
    assert_eq!(pixel::calculate_capacity(100, 100, 4), 15_000);
}

fn coefficients_with_usable_acs(num_blocks: usize) -> Coefficients {
    let mut blocks: Vec<Block> = Vec::with_capacity(num_blocks);
    for i in 0..num_blocks {
        let mut block = [0i32; 64];
        block[0] = 15;
        for (j, slot) in block.iter_mut().enumerate().skip(1) {
            let v = ((i * 5 + j * 2) % 7) as i32 - 3;
            *slot = if (-1..=1).contains(&v) { v + 4 } else { v };
        }
        blocks.push(block);
    }
    Coefficients {
        width: 8,
        height: (8 * num_blocks) as u32,
        components: vec![Component {
            id: 1,
            blocks_per_row: 1,
            blocks_per_col: num_blocks,
            blocks,
        }],
    }
}

#[test]
fn jpeg_coefficient_round_trip_with_50_byte_payload() {
    let mut coefficients = coefficients_with_usable_acs(40);
    assert!(jpeg::count_usable(&coefficients, false) >= 800);

    let payload: Vec<u8> = (0..50u8).collect();
    let bits = veilcode::bits::bytes_to_bits(&payload);
    jpeg::embed_in_coefficients(&mut coefficients, &bits, false).unwrap();

    let extracted_bits = jpeg::extract_from_coefficients(&coefficients, bits.len(), false).unwrap();
    assert_eq!(veilcode::bits::bits_to_bytes(&extracted_bits), payload);
}

#[cfg(feature = "jpeg")]
#[test]
fn jpeg_file_level_round_trip() {
    use veilcode::engine::jpeg::{BaselineJpegCodec, JpegCodec};

    let mut coefficients = coefficients_with_usable_acs(40);
    let payload: Vec<u8> = (0..50u8).collect();
    let bits = veilcode::bits::bytes_to_bits(&payload);
    jpeg::embed_in_coefficients(&mut coefficients, &bits, false).unwrap();

    let codec = BaselineJpegCodec;
    let bytes = codec.encode_from_coefficients(&coefficients).unwrap();
    let decoded = codec.extract_coefficients(&bytes).unwrap();

    let extracted_bits = jpeg::extract_from_coefficients(&decoded, bits.len(), false).unwrap();
    assert_eq!(veilcode::bits::bits_to_bytes(&extracted_bits), payload);
}
