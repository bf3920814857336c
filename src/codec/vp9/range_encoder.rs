//! VP9 Binary Arithmetic Range Encoder
//!
//! This module implements the VP9 boolean range encoder, the inverse of the
//! decoder in range_coder.rs. Output starts with a zero marker bit and is
//! padded on finalization so the decoder never runs short of input.

use super::symbol::SymbolWriter;

/// Range encoder for VP9 encoding
///
/// The encoder maintains:
/// - A range value that narrows as symbols are encoded
/// - A low value representing the bottom of the current range
/// - A shift counter deciding when a byte is ready
/// - An output buffer, patched in place on carry
pub struct RangeEncoder {
    /// Current range (starts at 255)
    range: u32,
    /// Current low value (bottom of range)
    low: u32,
    /// Bits shifted since the last output byte, offset by -24
    count: i32,
    /// Output buffer
    buffer: Vec<u8>,
}

impl RangeEncoder {
    /// Create a new range encoder
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with pre-allocated buffer capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let mut encoder = RangeEncoder {
            range: 255,
            low: 0,
            count: -24,
            buffer: Vec::with_capacity(capacity),
        };
        // Marker bit
        encoder.write_bool(false, 128);
        encoder
    }

    /// Add one to the already written bytes, rippling through 0xFF runs
    fn propagate_carry(&mut self) {
        for byte in self.buffer.iter_mut().rev() {
            if *byte == 0xFF {
                *byte = 0;
            } else {
                *byte += 1;
                return;
            }
        }
    }

    /// Finalize encoding and return the encoded bytes
    pub fn finalize(mut self) -> Vec<u8> {
        for _ in 0..32 {
            self.write_bool(false, 128);
        }

        // Keep the final byte from looking like a superframe index marker
        if let Some(&last) = self.buffer.last() {
            if last & 0xE0 == 0xC0 {
                self.buffer.push(0);
            }
        }

        self.buffer
    }

    /// Get current buffer size
    pub fn size(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for RangeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolWriter for RangeEncoder {
    #[inline]
    fn write_bool(&mut self, bit: bool, prob: u8) {
        let split = 1 + (((self.range - 1) * prob as u32) >> 8);

        let mut low = self.low;
        let mut range = split;
        if bit {
            low = low.wrapping_add(split);
            range = self.range - split;
        }

        // Renormalize so the range is back in 128..=255
        let mut shift = range.leading_zeros() as i32 - 24;
        range <<= shift;
        let mut count = self.count + shift;

        if count >= 0 {
            let offset = shift - count;

            if (low << (offset - 1)) & 0x8000_0000 != 0 {
                self.propagate_carry();
            }

            self.buffer.push((low >> (24 - offset)) as u8);
            low <<= offset;
            shift = count;
            low &= 0xFF_FFFF;
            count -= 8;
        }

        self.low = low << shift;
        self.count = count;
        self.range = range;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::vp9::range_coder::RangeCoder;
    use crate::codec::vp9::symbol::SymbolReader;
    use crate::codec::vp9::tables::{MV_CLASS_TREE, MV_JOINT_TREE};

    #[test]
    fn test_range_encoder_creation() {
        let encoder = RangeEncoder::new();
        assert_eq!(encoder.size(), 0);
        let data = encoder.finalize();
        assert!(!data.is_empty());
        assert_eq!(data[0] & 0x80, 0);
    }

    #[test]
    fn test_roundtrip_literal() {
        let mut encoder = RangeEncoder::new();

        let original = [7u32, 15, 3, 0, 10, 5];
        for &val in &original {
            encoder.write_literal(val, 4);
        }

        let encoded = encoder.finalize();

        let mut decoder = RangeCoder::new(&encoded).unwrap();
        for &expected in &original {
            assert_eq!(decoder.read_literal(4), expected, "Mismatch in roundtrip");
        }
    }

    #[test]
    fn test_roundtrip_bool() {
        let mut encoder = RangeEncoder::new();

        encoder.write_bool(true, 128);
        encoder.write_bool(false, 128);
        encoder.write_bool(true, 200);
        encoder.write_bool(false, 50);
        encoder.write_bool(true, 1);
        encoder.write_bool(false, 255);

        let encoded = encoder.finalize();

        let mut decoder = RangeCoder::new(&encoded).unwrap();
        assert!(decoder.read_bool(128));
        assert!(!decoder.read_bool(128));
        assert!(decoder.read_bool(200));
        assert!(!decoder.read_bool(50));
        assert!(decoder.read_bool(1));
        assert!(!decoder.read_bool(255));
    }

    #[test]
    fn test_roundtrip_skewed_sequence() {
        // Long runs of unlikely symbols exercise carry propagation
        let mut encoder = RangeEncoder::new();
        let bits: Vec<(bool, u8)> = (0..4000u32)
            .map(|i| ((i * 7 + i / 3) % 5 != 0, (1 + (i * 37) % 255) as u8))
            .collect();
        for &(bit, prob) in &bits {
            encoder.write_bool(bit, prob);
        }
        let encoded = encoder.finalize();

        let mut decoder = RangeCoder::new(&encoded).unwrap();
        for (i, &(bit, prob)) in bits.iter().enumerate() {
            assert_eq!(decoder.read_bool(prob), bit, "bit {} differs", i);
        }
    }

    #[test]
    fn test_roundtrip_tree() {
        let joint_probs = [32u8, 64, 96];
        let class_probs = [224u8, 144, 192, 168, 192, 176, 192, 198, 198, 245];

        let mut encoder = RangeEncoder::new();
        for symbol in 0..4u8 {
            encoder.write_tree(&MV_JOINT_TREE, &joint_probs, symbol);
        }
        for symbol in 0..11u8 {
            encoder.write_tree(&MV_CLASS_TREE, &class_probs, symbol);
        }
        let encoded = encoder.finalize();

        let mut decoder = RangeCoder::new(&encoded).unwrap();
        for symbol in 0..4u8 {
            assert_eq!(decoder.read_tree(&MV_JOINT_TREE, &joint_probs), symbol);
        }
        for symbol in 0..11u8 {
            assert_eq!(decoder.read_tree(&MV_CLASS_TREE, &class_probs), symbol);
        }
    }
}
