//! JPEG coefficient data model (§3) and the DCT embedding engine (C8).

use crate::{Error, Result};

/// One 8×8 block of quantized DCT coefficients, natural (non-zigzag) order.
/// Index 0 is the DC term; 1..=63 are AC.
pub type Block = [i32; 64];

/// A single colour component's grid of 8×8 coefficient blocks, row-major.
#[derive(Debug, Clone)]
pub struct Component {
    /// Component id. Id 1 is luma (`Y`) in the JFIF convention; other ids
    /// are chroma.
    pub id: u8,
    /// Blocks per row of this component's sampled grid.
    pub blocks_per_row: usize,
    /// Blocks per column of this component's sampled grid.
    pub blocks_per_col: usize,
    /// `blocks_per_row * blocks_per_col` blocks, row-major.
    pub blocks: Vec<Block>,
}

/// A parsed JPEG object: one list of colour components, each with a 2D
/// grid of quantized coefficient blocks.
#[derive(Debug, Clone)]
pub struct Coefficients {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Colour components, in scan order.
    pub components: Vec<Component>,
}

impl Coefficients {
    /// Deep-clones this coefficient object. Embedding mutates coefficients
    /// in place (§3, §9); callers that need to retain the original should
    /// clone first.
    pub fn deep_clone(&self) -> Self {
        self.clone()
    }
}

/// A coefficient is usable iff its value is not in `{-1, 0, +1}` (§3).
fn is_usable(value: i32) -> bool {
    !(-1..=1).contains(&value)
}

struct CoefficientCursor<'a> {
    components: &'a mut [Component],
    use_chroma: bool,
}

impl<'a> CoefficientCursor<'a> {
    fn for_each_usable(&mut self, mut visit: impl FnMut(&mut i32) -> bool) {
        'outer: for component in self.components.iter_mut() {
            if !self.use_chroma && component.id != 1 {
                continue;
            }
            for block in component.blocks.iter_mut() {
                for slot in block.iter_mut().skip(1) {
                    if !is_usable(*slot) {
                        continue;
                    }
                    if !visit(slot) {
                        break 'outer;
                    }
                }
            }
        }
    }
}

/// Counts usable AC coefficients across the selected components, per the
/// embedding iteration order in §4.8.
pub fn count_usable(coefficients: &Coefficients, use_chroma: bool) -> usize {
    let mut count = 0usize;
    for component in &coefficients.components {
        if !use_chroma && component.id != 1 {
            continue;
        }
        for block in &component.blocks {
            for &c in &block[1..=63] {
                if is_usable(c) {
                    count += 1;
                }
            }
        }
    }
    count
}

/// Embeds `bits` into the LSBs of usable AC coefficients, in place,
/// following the iteration order and bit-placement rule of §4.8.
///
/// Visiting coefficient `c` with magnitude `a = |c|` and sign `s`: set
/// `a' = (a & !1) | bit`. If `a'` would land in `{0, 1}` (unusable), the
/// coefficient is skipped without consuming the bit. Otherwise `s·a'` is
/// written back, preserving sign and the set of usable coefficients.
pub fn embed_in_coefficients(coefficients: &mut Coefficients, bits: &[u8], use_chroma: bool) -> Result<()> {
    let mut bit_iter = bits.iter().copied();
    let mut consumed = 0usize;

    let mut cursor = CoefficientCursor {
        components: &mut coefficients.components,
        use_chroma,
    };
    cursor.for_each_usable(|c| {
        let Some(bit) = bit_iter.clone().next() else {
            return false;
        };
        let sign = c.signum();
        let magnitude = c.unsigned_abs() as i32;
        let new_magnitude = (magnitude & !1) | (bit & 1) as i32;
        if new_magnitude <= 1 {
            return true;
        }
        *c = sign * new_magnitude;
        bit_iter.next();
        consumed += 1;
        true
    });

    if consumed < bits.len() {
        return Err(Error::CapacityExceeded {
            required: bits.len(),
            available: consumed,
            suggestion: "use a shorter message or enable chroma embedding",
        });
    }
    Ok(())
}

/// Extracts `bit_count` bits from the LSBs of usable AC coefficients,
/// following the same iteration order as [`embed_in_coefficients`].
pub fn extract_from_coefficients(coefficients: &Coefficients, bit_count: usize, use_chroma: bool) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(bit_count);
    'outer: for component in &coefficients.components {
        if !use_chroma && component.id != 1 {
            continue;
        }
        for block in &component.blocks {
            for &c in &block[1..=63] {
                if !is_usable(c) {
                    continue;
                }
                if bits.len() == bit_count {
                    break 'outer;
                }
                bits.push((c.unsigned_abs() & 1) as u8);
            }
        }
    }

    if bits.len() < bit_count {
        return Err(Error::CapacityExceeded {
            required: bit_count,
            available: bits.len(),
            suggestion: "request fewer bits than the carrier holds",
        });
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{bits_to_bytes, bytes_to_bits};

    fn sample_coefficients(num_blocks: usize) -> Coefficients {
        let mut blocks = Vec::with_capacity(num_blocks);
        for i in 0..num_blocks {
            let mut block = [0i32; 64];
            block[0] = 10; // DC, never touched
            for (j, slot) in block.iter_mut().enumerate().skip(1) {
                // A mix of usable and unusable values.
                *slot = ((i * 7 + j * 3) % 9) as i32 - 2;
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
    fn round_trips_arbitrary_bits() {
        let mut coefficients = sample_coefficients(50);
        let usable = count_usable(&coefficients, false);
        assert!(usable >= 800, "need a large usable pool, got {usable}");

        let payload = vec![0xABu8; 50];
        let bits = bytes_to_bits(&payload);
        embed_in_coefficients(&mut coefficients, &bits, false).unwrap();

        let extracted_bits = extract_from_coefficients(&coefficients, bits.len(), false).unwrap();
        assert_eq!(bits_to_bytes(&extracted_bits), payload);
    }

    #[test]
    fn dc_term_is_never_touched() {
        let mut coefficients = sample_coefficients(10);
        let bits = vec![1u8; 400];
        embed_in_coefficients(&mut coefficients, &bits, false).unwrap();
        for block in &coefficients.components[0].blocks {
            assert_eq!(block[0], 10);
        }
    }

    #[test]
    fn capacity_exceeded_reports_consumed_and_required() {
        let mut coefficients = sample_coefficients(1);
        let usable = count_usable(&coefficients, false);
        let bits = vec![1u8; usable + 10];
        let err = embed_in_coefficients(&mut coefficients, &bits, false).unwrap_err();
        match err {
            Error::CapacityExceeded { required, available, .. } => {
                assert_eq!(required, usable + 10);
                assert_eq!(available, usable);
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
    }

    #[test]
    fn chroma_excluded_by_default() {
        let mut coefficients = sample_coefficients(5);
        coefficients.components.push(Component {
            id: 2,
            blocks_per_row: 1,
            blocks_per_col: 5,
            blocks: coefficients.components[0].blocks.clone(),
        });
        let luma_only = count_usable(&coefficients, false);
        let with_chroma = count_usable(&coefficients, true);
        assert!(with_chroma > luma_only);
    }

    #[test]
    fn deep_clone_is_independent() {
        let coefficients = sample_coefficients(3);
        let mut clone = coefficients.deep_clone();
        clone.components[0].blocks[0][1] = 99;
        assert_ne!(coefficients.components[0].blocks[0][1], 99);
    }
}
