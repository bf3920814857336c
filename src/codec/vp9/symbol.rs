//! Symbol coding interfaces
//!
//! The motion-vector model never touches arithmetic-coder state directly. It
//! codes booleans against 8-bit probabilities, fixed-width literals, and
//! tree-coded symbols through these two traits, which the boolean range
//! decoder and encoder implement.

use super::tree::{self, TreeNode};

/// Source of decoded symbols
pub trait SymbolReader {
    /// Read one boolean coded with probability `prob` of being `false`
    fn read_bool(&mut self, prob: u8) -> bool;

    /// Read a single equiprobable bit
    #[inline]
    fn read_bit(&mut self) -> bool {
        self.read_bool(128)
    }

    /// Read `bits` equiprobable bits as an unsigned value, MSB first
    #[inline]
    fn read_literal(&mut self, bits: u8) -> u32 {
        let mut value = 0u32;
        for _ in 0..bits {
            value = (value << 1) | self.read_bit() as u32;
        }
        value
    }

    /// Read a tree-coded symbol
    fn read_tree(&mut self, tree: &[TreeNode], probs: &[u8]) -> u8 {
        let mut node = 0usize;
        loop {
            let bit = self.read_bool(probs[node >> 1]);
            match tree[node + bit as usize] {
                TreeNode::Leaf(symbol) => return symbol,
                TreeNode::Inner(next) => node = next as usize,
            }
        }
    }
}

/// Sink for encoded symbols
pub trait SymbolWriter {
    /// Write one boolean with probability `prob` of being `false`
    fn write_bool(&mut self, bit: bool, prob: u8);

    /// Write a single equiprobable bit
    #[inline]
    fn write_bit(&mut self, bit: bool) {
        self.write_bool(bit, 128);
    }

    /// Write the low `bits` bits of `value`, MSB first
    #[inline]
    fn write_literal(&mut self, value: u32, bits: u8) {
        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 != 0);
        }
    }

    /// Write a tree-coded symbol
    ///
    /// # Panics
    ///
    /// Panics if `symbol` is not a leaf of `tree`.
    fn write_tree(&mut self, tree: &[TreeNode], probs: &[u8], symbol: u8) {
        let found = tree::walk(tree, symbol, |node, bit| self.write_bool(bit, probs[node >> 1]));
        assert!(found, "symbol {} is not a leaf of the coding tree", symbol);
    }
}
