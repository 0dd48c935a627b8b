//! Minimal baseline JPEG bitstream codec (feature `jpeg`).
//!
//! Parses and re-serializes the *entropy-coded* layer of a baseline,
//! non-subsampled (4:4:4), single-scan JPEG file down to its quantized DCT
//! coefficients, without ever performing a forward/inverse DCT or colour
//! transform — exactly the granularity C8 operates on. This stands in for
//! the `extractCoefficients`/`encodeFromCoefficients` external collaborator
//! named in §6; a production deployment would more likely delegate to a
//! vendored libjpeg binding, but none in this dependency stack exposes
//! coefficient-level access.

use std::collections::HashMap;

use super::coefficients::{Block, Coefficients, Component};
use crate::{Error, Result};

const ZIGZAG: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27, 20,
    13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58, 59,
    52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

#[derive(Debug, Clone)]
struct HuffmanTable {
    /// Maps a (code, length) pair, packed as `(length << 16) | code`, to a symbol byte.
    codes: HashMap<u32, u8>,
}

impl HuffmanTable {
    fn from_counts(counts: &[u8; 16], symbols: &[u8]) -> Self {
        let mut codes = HashMap::new();
        let mut code = 0u32;
        let mut symbol_idx = 0usize;
        for (len_minus_one, &count) in counts.iter().enumerate() {
            let length = len_minus_one + 1;
            for _ in 0..count {
                let key = ((length as u32) << 16) | code;
                codes.insert(key, symbols[symbol_idx]);
                symbol_idx += 1;
                code += 1;
            }
            code <<= 1;
        }
        Self { codes }
    }

    fn lookup(&self, length: usize, code: u32) -> Option<u8> {
        self.codes.get(&(((length as u32) << 16) | code)).copied()
    }

    /// Builds canonical codes for re-encoding: `(symbol) -> (code, length)`.
    fn canonical_codes(&self) -> HashMap<u8, (u32, usize)> {
        self.codes
            .iter()
            .map(|(&key, &symbol)| {
                let length = (key >> 16) as usize;
                let code = key & 0xFFFF;
                (symbol, (code, length))
            })
            .collect()
    }
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bit_buf: u32,
    bit_count: u32,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit_buf: 0,
            bit_count: 0,
        }
    }

    fn fill(&mut self) {
        while self.bit_count <= 24 && self.pos < self.data.len() {
            let mut byte = self.data[self.pos];
            self.pos += 1;
            if byte == 0xFF {
                // Byte-stuffing: 0xFF00 in the stream represents a literal 0xFF.
                if self.pos < self.data.len() && self.data[self.pos] == 0x00 {
                    self.pos += 1;
                } else {
                    // A real marker inside the scan data; stop feeding bits.
                    self.pos -= 1;
                    byte = 0;
                }
            }
            self.bit_buf = (self.bit_buf << 8) | byte as u32;
            self.bit_count += 8;
        }
    }

    fn read_bit(&mut self) -> Result<u8> {
        self.fill();
        if self.bit_count == 0 {
            return Err(Error::Truncated { expected: 1, found: 0 });
        }
        self.bit_count -= 1;
        Ok(((self.bit_buf >> self.bit_count) & 1) as u8)
    }

    fn read_bits(&mut self, n: usize) -> Result<u32> {
        let mut value = 0u32;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u32;
        }
        Ok(value)
    }

    fn decode_huffman(&mut self, table: &HuffmanTable) -> Result<u8> {
        let mut code = 0u32;
        for length in 1..=16 {
            code = (code << 1) | self.read_bit()? as u32;
            if let Some(symbol) = table.lookup(length, code) {
                return Ok(symbol);
            }
        }
        Err(Error::UnsupportedFormat("unresolvable Huffman code".into()))
    }
}

fn extend_magnitude(value: u32, bits: u8) -> i32 {
    if bits == 0 {
        return 0;
    }
    let half = 1i32 << (bits - 1);
    let v = value as i32;
    if v < half { v - (1 << bits) + 1 } else { v }
}

struct BitWriter {
    out: Vec<u8>,
    bit_buf: u32,
    bit_count: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            bit_buf: 0,
            bit_count: 0,
        }
    }

    fn write_bits(&mut self, value: u32, length: usize) {
        for i in (0..length).rev() {
            let bit = (value >> i) & 1;
            self.bit_buf = (self.bit_buf << 1) | bit;
            self.bit_count += 1;
            if self.bit_count == 8 {
                let byte = self.bit_buf as u8;
                self.out.push(byte);
                if byte == 0xFF {
                    self.out.push(0x00);
                }
                self.bit_buf = 0;
                self.bit_count = 0;
            }
        }
    }

    fn flush(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            let pad = 8 - self.bit_count;
            self.bit_buf <<= pad;
            self.bit_buf |= (1 << pad) - 1;
            let byte = self.bit_buf as u8;
            self.out.push(byte);
            if byte == 0xFF {
                self.out.push(0x00);
            }
        }
        self.out
    }
}

fn magnitude_bits(value: i32) -> (u8, u32) {
    if value == 0 {
        return (0, 0);
    }
    let abs = value.unsigned_abs();
    let bits = 32 - abs.leading_zeros();
    let encoded = if value < 0 { (value - 1) as u32 & ((1 << bits) - 1) } else { abs };
    (bits as u8, encoded)
}

struct FrameComponent {
    id: u8,
    h_sampling: u8,
    v_sampling: u8,
}

struct ScanComponent {
    id: u8,
    dc_table: u8,
    ac_table: u8,
}

/// Decodes the entropy-coded quantized coefficients of a baseline, 4:4:4,
/// single-scan JPEG.
pub fn decode_coefficients(bytes: &[u8]) -> Result<Coefficients> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return Err(Error::UnsupportedFormat("not a JPEG file (missing SOI marker)".into()));
    }

    let mut dc_tables: [Option<HuffmanTable>; 4] = Default::default();
    let mut ac_tables: [Option<HuffmanTable>; 4] = Default::default();
    let mut frame_components: Vec<FrameComponent> = Vec::new();
    let mut width = 0u32;
    let mut height = 0u32;
    let mut pos = 2usize;

    loop {
        if pos + 1 >= bytes.len() {
            return Err(Error::Truncated {
                expected: pos + 2,
                found: bytes.len(),
            });
        }
        if bytes[pos] != 0xFF {
            return Err(Error::UnsupportedFormat("expected marker".into()));
        }
        let marker = bytes[pos + 1];
        pos += 2;

        if marker == 0xD9 {
            break; // EOI
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            continue; // no length field
        }

        if pos + 1 >= bytes.len() {
            return Err(Error::Truncated {
                expected: pos + 2,
                found: bytes.len(),
            });
        }
        let len = u16::from_be_bytes([bytes[pos], bytes[pos + 1]]) as usize;
        if len < 2 || pos + len > bytes.len() {
            return Err(Error::Truncated {
                expected: pos + len,
                found: bytes.len(),
            });
        }
        let segment = &bytes[pos + 2..pos + len];
        let segment_end = pos + len;

        match marker {
            0xC0 => {
                // SOF0: baseline
                height = u16::from_be_bytes([segment[1], segment[2]]) as u32;
                width = u16::from_be_bytes([segment[3], segment[4]]) as u32;
                let num_components = segment[5] as usize;
                for i in 0..num_components {
                    let base = 6 + i * 3;
                    let id = segment[base];
                    let sampling = segment[base + 1];
                    let _quant_table = segment[base + 2];
                    frame_components.push(FrameComponent {
                        id,
                        h_sampling: sampling >> 4,
                        v_sampling: sampling & 0x0F,
                    });
                }
            }
            0xC2 => {
                return Err(Error::UnsupportedFormat("progressive JPEG is not supported".into()));
            }
            0xC4 => {
                let mut offset = 0usize;
                while offset < segment.len() {
                    if offset + 17 > segment.len() {
                        return Err(Error::Truncated {
                            expected: offset + 17,
                            found: segment.len(),
                        });
                    }
                    let class_and_id = segment[offset];
                    let class = class_and_id >> 4;
                    let id = (class_and_id & 0x0F) as usize;
                    if id > 3 {
                        return Err(Error::UnsupportedFormat(format!(
                            "Huffman table id {id} out of range 0..=3"
                        )));
                    }
                    let counts: [u8; 16] = segment[offset + 1..offset + 17].try_into().unwrap();
                    let total: usize = counts.iter().map(|&c| c as usize).sum();
                    if offset + 17 + total > segment.len() {
                        return Err(Error::Truncated {
                            expected: offset + 17 + total,
                            found: segment.len(),
                        });
                    }
                    let symbols = &segment[offset + 17..offset + 17 + total];
                    let table = HuffmanTable::from_counts(&counts, symbols);
                    if class == 0 {
                        dc_tables[id] = Some(table);
                    } else {
                        ac_tables[id] = Some(table);
                    }
                    offset += 17 + total;
                }
            }
            0xDA => {
                let num_scan_components = segment[0] as usize;
                let mut scan_components = Vec::with_capacity(num_scan_components);
                for i in 0..num_scan_components {
                    let base = 1 + i * 2;
                    let id = segment[base];
                    let tables = segment[base + 1];
                    scan_components.push(ScanComponent {
                        id,
                        dc_table: tables >> 4,
                        ac_table: tables & 0x0F,
                    });
                }

                if frame_components.iter().any(|c| c.h_sampling != 1 || c.v_sampling != 1) {
                    return Err(Error::UnsupportedFormat(
                        "chroma-subsampled JPEG is not supported (4:4:4 only)".into(),
                    ));
                }

                let blocks_per_row = width.div_ceil(8) as usize;
                let blocks_per_col = height.div_ceil(8) as usize;
                let mut components: Vec<Component> = frame_components
                    .iter()
                    .map(|fc| Component {
                        id: fc.id,
                        blocks_per_row,
                        blocks_per_col,
                        blocks: vec![[0i32; 64]; blocks_per_row * blocks_per_col],
                    })
                    .collect();

                let scan_data = &bytes[segment_end..];
                let mut reader = BitReader::new(scan_data);
                let mut dc_pred = vec![0i32; components.len()];

                for block_index in 0..blocks_per_row * blocks_per_col {
                    for (comp_idx, scan_component) in scan_components.iter().enumerate() {
                        let dc_table = dc_tables[scan_component.dc_table as usize]
                            .as_ref()
                            .ok_or_else(|| Error::UnsupportedFormat("missing DC Huffman table".into()))?;
                        let ac_table = ac_tables[scan_component.ac_table as usize]
                            .as_ref()
                            .ok_or_else(|| Error::UnsupportedFormat("missing AC Huffman table".into()))?;

                        let mut block = [0i32; 64];

                        let dc_size = reader.decode_huffman(dc_table)?;
                        let dc_diff = if dc_size == 0 {
                            0
                        } else {
                            extend_magnitude(reader.read_bits(dc_size as usize)?, dc_size)
                        };
                        dc_pred[comp_idx] += dc_diff;
                        block[0] = dc_pred[comp_idx];

                        let mut k = 1usize;
                        while k <= 63 {
                            let rs = reader.decode_huffman(ac_table)?;
                            let run = rs >> 4;
                            let size = rs & 0x0F;
                            if size == 0 {
                                if run == 15 {
                                    k += 16; // ZRL
                                    continue;
                                }
                                break; // EOB
                            }
                            k += run as usize;
                            if k > 63 {
                                break;
                            }
                            let value = extend_magnitude(reader.read_bits(size as usize)?, size);
                            block[ZIGZAG[k]] = value;
                            k += 1;
                        }

                        components[comp_idx].blocks[block_index] = block;
                        let _ = scan_component.id;
                    }
                }

                return Ok(Coefficients { width, height, components });
            }
            _ => {}
        }
        pos = segment_end;
    }

    Err(Error::UnsupportedFormat("no scan data found".into()))
}

/// Standard JPEG luminance/chrominance quantization tables (quality ~50),
/// used only when constructing Huffman tables for re-encoding; coefficient
/// values themselves are taken verbatim from `coefficients`.
fn default_huffman_spec(class_dc: bool) -> ([u8; 16], Vec<u8>) {
    // The standard JPEG Annex K tables.
    if class_dc {
        (
            [0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        )
    } else {
        (
            [0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7D],
            vec![
                0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12, 0x21, 0x31, 0x41, 0x06, 0x13, 0x51,
                0x61, 0x07, 0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xA1, 0x08, 0x23, 0x42, 0xB1, 0xC1,
                0x15, 0x52, 0xD1, 0xF0, 0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0A, 0x16, 0x17, 0x18,
                0x19, 0x1A, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39,
                0x3A, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x53, 0x54, 0x55, 0x56, 0x57,
                0x58, 0x59, 0x5A, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6A, 0x73, 0x74, 0x75,
                0x76, 0x77, 0x78, 0x79, 0x7A, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x92,
                0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7,
                0xA8, 0xA9, 0xAA, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xC2, 0xC3,
                0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8,
                0xD9, 0xDA, 0xE1, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xF1, 0xF2,
                0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8, 0xF9, 0xFA,
            ],
        )
    }
}

fn write_huffman_segment(out: &mut Vec<u8>, class: u8, id: u8, counts: &[u8; 16], symbols: &[u8]) {
    let len = 2 + 1 + 16 + symbols.len();
    out.extend_from_slice(&[0xFF, 0xC4]);
    out.extend_from_slice(&(len as u16).to_be_bytes());
    out.push((class << 4) | id);
    out.extend_from_slice(counts);
    out.extend_from_slice(symbols);
}

/// Re-serializes `coefficients` as a baseline, 4:4:4 JPEG file using
/// standard Huffman tables. The caller is responsible for ensuring
/// coefficient magnitudes still fit JPEG's signed-magnitude encoding
/// (true for anything produced by [`super::embed_in_coefficients`]).
pub fn encode_coefficients(coefficients: &Coefficients) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.extend_from_slice(&[0xFF, 0xD8]);

    // SOF0
    let num_components = coefficients.components.len();
    let sof_len = 8 + num_components * 3;
    out.extend_from_slice(&[0xFF, 0xC0]);
    out.extend_from_slice(&(sof_len as u16).to_be_bytes());
    out.push(8); // sample precision
    out.extend_from_slice(&(coefficients.height as u16).to_be_bytes());
    out.extend_from_slice(&(coefficients.width as u16).to_be_bytes());
    out.push(num_components as u8);
    for component in &coefficients.components {
        out.push(component.id);
        out.push(0x11); // 1x1 sampling (4:4:4)
        out.push(0); // quant table id (unused at this layer)
    }

    let (dc_counts, dc_symbols) = default_huffman_spec(true);
    let (ac_counts, ac_symbols) = default_huffman_spec(false);
    write_huffman_segment(&mut out, 0, 0, &dc_counts, &dc_symbols);
    write_huffman_segment(&mut out, 1, 0, &ac_counts, &ac_symbols);

    let dc_table = HuffmanTable::from_counts(&dc_counts, &dc_symbols).canonical_codes();
    let ac_table = HuffmanTable::from_counts(&ac_counts, &ac_symbols).canonical_codes();

    // SOS
    let sos_len = 6 + num_components * 2;
    out.extend_from_slice(&[0xFF, 0xDA]);
    out.extend_from_slice(&(sos_len as u16).to_be_bytes());
    out.push(num_components as u8);
    for component in &coefficients.components {
        out.push(component.id);
        out.push(0x00); // DC table 0, AC table 0
    }
    out.extend_from_slice(&[0, 63, 0]);

    let mut writer = BitWriter::new();
    let mut dc_pred = vec![0i32; num_components];
    let blocks_total = coefficients
        .components
        .first()
        .map(|c| c.blocks.len())
        .unwrap_or(0);

    for block_index in 0..blocks_total {
        for (comp_idx, component) in coefficients.components.iter().enumerate() {
            let block: &Block = &component.blocks[block_index];
            encode_block(&mut writer, block, &dc_table, &ac_table, &mut dc_pred[comp_idx]);
        }
    }

    out.extend_from_slice(&writer.flush());
    out.extend_from_slice(&[0xFF, 0xD9]);
    Ok(out)
}

fn encode_block(
    writer: &mut BitWriter,
    block: &Block,
    dc_table: &HashMap<u8, (u32, usize)>,
    ac_table: &HashMap<u8, (u32, usize)>,
    dc_pred: &mut i32,
) {
    let diff = block[0] - *dc_pred;
    *dc_pred = block[0];
    let (size, encoded) = magnitude_bits(diff);
    let (code, length) = dc_table[&size];
    writer.write_bits(code, length);
    if size > 0 {
        writer.write_bits(encoded, size as usize);
    }

    let mut zigzagged = [0i32; 64];
    for (zz_index, &natural_index) in ZIGZAG.iter().enumerate() {
        zigzagged[zz_index] = block[natural_index];
    }

    let mut run = 0u8;
    for &value in &zigzagged[1..64] {
        if value == 0 {
            run += 1;
            if run == 16 {
                let (code, length) = ac_table[&0xF0];
                writer.write_bits(code, length);
                run = 0;
            }
            continue;
        }
        let (size, encoded) = magnitude_bits(value);
        let rs = (run << 4) | size;
        let (code, length) = ac_table[&rs];
        writer.write_bits(code, length);
        writer.write_bits(encoded, size as usize);
        run = 0;
    }
    if run > 0 {
        let (code, length) = ac_table[&0x00]; // EOB
        writer.write_bits(code, length);
    }
}
