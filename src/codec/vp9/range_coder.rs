//! VP9 Binary Arithmetic Range Decoder
//!
//! VP9 codes every compressed-header and tile symbol with a boolean range
//! coder. This decoder keeps an 8-bit window onto the arithmetic-coded value
//! and refills it one bit at a time, which makes it exactly inverse to
//! [`RangeEncoder`](super::range_encoder::RangeEncoder). Bits past the end of
//! the buffer read as zero.

use super::symbol::SymbolReader;
use crate::error::{Error, Result};

/// Range coder state for VP9 decoding
///
/// The decoder maintains:
/// - An 8-bit range value (starts at 255)
/// - The value window, always below the range
/// - A bit position in the input buffer
pub struct RangeCoder<'a> {
    /// Input data buffer
    data: &'a [u8],
    /// Next bit to shift into the value window
    bit_pos: usize,
    /// Current range
    range: u32,
    /// Current value window
    value: u32,
}

impl<'a> RangeCoder<'a> {
    /// Minimum range value before renormalization
    pub const MIN_RANGE: u32 = 128;

    /// Initialize a new range decoder and consume the marker bit
    ///
    /// Fails on an empty buffer or when the leading marker bit is set, which
    /// only happens for corrupt data.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::invalid_input("range coder buffer is empty"));
        }

        let mut coder = RangeCoder {
            data,
            bit_pos: 8,
            range: 255,
            value: data[0] as u32,
        };

        if coder.read_bool(128) {
            return Err(Error::codec("range coder marker bit is set"));
        }

        Ok(coder)
    }

    /// Next input bit, zero once the buffer is exhausted
    #[inline]
    fn next_bit(&mut self) -> u32 {
        let byte = self.bit_pos >> 3;
        let bit = match self.data.get(byte) {
            Some(&b) => ((b >> (7 - (self.bit_pos & 7))) & 1) as u32,
            None => 0,
        };
        self.bit_pos += 1;
        bit
    }

    /// Get current position in bytes (rounded up)
    pub fn position(&self) -> usize {
        (self.bit_pos + 7) >> 3
    }

    /// Check if all data has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.bit_pos >= self.data.len() * 8
    }
}

impl SymbolReader for RangeCoder<'_> {
    #[inline]
    fn read_bool(&mut self, prob: u8) -> bool {
        // Split point between the zero and one sub-ranges
        let split = 1 + (((self.range - 1) * prob as u32) >> 8);

        let bit = if self.value < split {
            self.range = split;
            false
        } else {
            self.range -= split;
            self.value -= split;
            true
        };

        while self.range < Self::MIN_RANGE {
            self.range <<= 1;
            self.value = (self.value << 1) | self.next_bit();
        }

        bit
    }
}
