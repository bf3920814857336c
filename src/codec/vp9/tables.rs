//! VP9 Motion Vector Tables and Constants
//!
//! This module contains the static data shared by the motion-vector model:
//! - Magnitude class layout and coding limits
//! - Binary tree topologies for tree-coded symbols
//! - Default probabilities loaded on key frames and resets
//! - Block size information used by the global motion predictor
//!
//! The trees and default probabilities are part of the bitstream contract and
//! must not be altered.

use serde::{Deserialize, Serialize};

use super::tree::TreeNode::{self, Inner, Leaf};

// =============================================================================
// Model Dimensions
// =============================================================================

/// Number of joint types
pub const MV_JOINTS: usize = 4;

/// Number of magnitude classes
pub const MV_CLASSES: usize = 11;

/// Bits in the class0 integer part
pub const CLASS0_BITS: usize = 1;

/// Number of class0 integer values
pub const CLASS0_SIZE: usize = 1 << CLASS0_BITS;

/// Integer offset bits coded for the largest class
pub const MV_OFFSET_BITS: usize = MV_CLASSES + CLASS0_BITS - 2;

/// Number of fractional-pel values
pub const MV_FP_SIZE: usize = 4;

/// Maximum bits needed to represent a component magnitude
pub const MV_MAX_BITS: usize = MV_CLASSES + CLASS0_BITS + 2;

/// Largest codable component magnitude
pub const MV_MAX: i32 = (1 << MV_MAX_BITS) - 1;

/// Bits of a motion vector component in use
pub const MV_IN_USE_BITS: usize = 14;

/// Exclusive upper bound of a valid component
pub const MV_UPP: i32 = (1 << MV_IN_USE_BITS) - 1;

/// Exclusive lower bound of a valid component
pub const MV_LOW: i32 = -(1 << MV_IN_USE_BITS);

/// Magnitudes at or above this bound all land in the top class
pub const MV_CLASS_SATURATION: u32 = (CLASS0_SIZE as u32) * 4096;

// =============================================================================
// Adaptation Parameters
// =============================================================================

/// Count at which one frame's statistics reach full update weight
pub const MV_COUNT_SAT: u32 = 20;

/// Largest update weight (out of 256) applied in a single adaptation
pub const MV_MAX_UPDATE_FACTOR: u32 = 128;

/// Full-pel reference magnitude at which 1/8-pel precision is switched off
pub const COMPANDED_MVREF_THRESH: i32 = 8;

/// Probability of the per-probability update flag in the compressed header
pub const MV_UPDATE_PROB: u8 = 252;

/// Number of persisted frame contexts
pub const FRAME_CONTEXTS: usize = 4;

// =============================================================================
// Coding Trees
// =============================================================================

/// Joint type tree: ZERO, HNZVZ, HZVNZ, HNZVNZ
#[rustfmt::skip]
pub const MV_JOINT_TREE: [TreeNode; 2 * (MV_JOINTS - 1)] = [
    Leaf(0), Inner(2), // zero vs. rest
    Leaf(1), Inner(4), // horizontal only vs. rest
    Leaf(2), Leaf(3),  // vertical only vs. both
];

/// Magnitude class tree
#[rustfmt::skip]
pub const MV_CLASS_TREE: [TreeNode; 2 * (MV_CLASSES - 1)] = [
    Leaf(0), Inner(2),
    Leaf(1), Inner(4),
    Inner(6), Inner(8),
    Leaf(2), Leaf(3),
    Inner(10), Inner(12),
    Leaf(4), Leaf(5),
    Leaf(6), Inner(14),
    Inner(16), Inner(18),
    Leaf(7), Leaf(8),
    Leaf(9), Leaf(10),
];

/// Class0 integer tree
pub const MV_CLASS0_TREE: [TreeNode; 2 * (CLASS0_SIZE - 1)] = [Leaf(0), Leaf(1)];

/// Fractional-pel tree
#[rustfmt::skip]
pub const MV_FP_TREE: [TreeNode; 2 * (MV_FP_SIZE - 1)] = [
    Leaf(0), Inner(2),
    Leaf(1), Inner(4),
    Leaf(2), Leaf(3),
];

// =============================================================================
// Magnitude Class Lookup
// =============================================================================

const LOG_IN_BASE_2_SIZE: usize = (MV_CLASS_SATURATION as usize >> 3) + 1;

const fn build_log_in_base_2() -> [u8; LOG_IN_BASE_2_SIZE] {
    let mut table = [0u8; LOG_IN_BASE_2_SIZE];
    let mut i = 2;
    while i < LOG_IN_BASE_2_SIZE {
        table[i] = table[i >> 1] + 1;
        i += 1;
    }
    table
}

/// floor(log2(i)) for i in 1..=1024, with entry 0 defined as 0
pub static LOG_IN_BASE_2: [u8; LOG_IN_BASE_2_SIZE] = build_log_in_base_2();

// =============================================================================
// Default Probabilities
// =============================================================================

/// Default joint probabilities
pub const DEFAULT_JOINT_PROBS: [u8; MV_JOINTS - 1] = [32, 64, 96];

/// Default sign probability (both components)
pub const DEFAULT_SIGN_PROB: u8 = 128;

/// Default class probabilities, indexed by [component]
pub const DEFAULT_CLASS_PROBS: [[u8; MV_CLASSES - 1]; 2] = [
    [224, 144, 192, 168, 192, 176, 192, 198, 198, 245], // vertical
    [216, 128, 176, 160, 176, 176, 192, 198, 198, 208], // horizontal
];

/// Default class0 probabilities, indexed by [component]
pub const DEFAULT_CLASS0_PROBS: [[u8; CLASS0_SIZE - 1]; 2] = [[216], [208]];

/// Default offset bit probabilities (both components)
pub const DEFAULT_BITS_PROBS: [u8; MV_OFFSET_BITS] =
    [136, 140, 148, 160, 176, 192, 224, 234, 234, 240];

/// Default class0 fractional-pel probabilities (both components)
pub const DEFAULT_CLASS0_FP_PROBS: [[u8; MV_FP_SIZE - 1]; CLASS0_SIZE] =
    [[128, 128, 64], [96, 112, 64]];

/// Default fractional-pel probabilities (both components)
pub const DEFAULT_FP_PROBS: [u8; MV_FP_SIZE - 1] = [64, 96, 64];

/// Default class0 high-precision probability (both components)
pub const DEFAULT_CLASS0_HP_PROB: u8 = 160;

/// Default high-precision probability (both components)
pub const DEFAULT_HP_PROB: u8 = 128;

// =============================================================================
// Motion Vectors
// =============================================================================

/// Motion vector with 1/8-pel precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MotionVector {
    pub row: i16, // Vertical component in 1/8-pel units
    pub col: i16, // Horizontal component in 1/8-pel units
}

impl MotionVector {
    pub const fn new(row: i16, col: i16) -> Self {
        MotionVector { row, col }
    }

    pub const fn zero() -> Self {
        MotionVector { row: 0, col: 0 }
    }

    pub const fn is_zero(&self) -> bool {
        self.row == 0 && self.col == 0
    }
}

// =============================================================================
// Block Sizes
// =============================================================================

/// VP9 block sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum BlockSize {
    Block4x4 = 0,
    Block4x8 = 1,
    Block8x4 = 2,
    Block8x8 = 3,
    Block8x16 = 4,
    Block16x8 = 5,
    Block16x16 = 6,
    Block16x32 = 7,
    Block32x16 = 8,
    Block32x32 = 9,
    Block32x64 = 10,
    Block64x32 = 11,
    Block64x64 = 12,
}

impl BlockSize {
    /// Width in pixels
    pub const fn width(&self) -> usize {
        match self {
            BlockSize::Block4x4 | BlockSize::Block4x8 => 4,
            BlockSize::Block8x4 | BlockSize::Block8x8 | BlockSize::Block8x16 => 8,
            BlockSize::Block16x8 | BlockSize::Block16x16 | BlockSize::Block16x32 => 16,
            BlockSize::Block32x16 | BlockSize::Block32x32 | BlockSize::Block32x64 => 32,
            BlockSize::Block64x32 | BlockSize::Block64x64 => 64,
        }
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        match self {
            BlockSize::Block4x4 | BlockSize::Block8x4 => 4,
            BlockSize::Block4x8 | BlockSize::Block8x8 | BlockSize::Block16x8 => 8,
            BlockSize::Block8x16 | BlockSize::Block16x16 | BlockSize::Block32x16 => 16,
            BlockSize::Block16x32 | BlockSize::Block32x32 | BlockSize::Block64x32 => 32,
            BlockSize::Block32x64 | BlockSize::Block64x64 => 64,
        }
    }

    /// Width in 4x4 units
    pub const fn width_4x4(&self) -> usize {
        self.width() >> 2
    }

    /// Height in 4x4 units
    pub const fn height_4x4(&self) -> usize {
        self.height() >> 2
    }

    /// From block dimensions
    pub fn from_dimensions(width: usize, height: usize) -> Option<Self> {
        match (width, height) {
            (4, 4) => Some(BlockSize::Block4x4),
            (4, 8) => Some(BlockSize::Block4x8),
            (8, 4) => Some(BlockSize::Block8x4),
            (8, 8) => Some(BlockSize::Block8x8),
            (8, 16) => Some(BlockSize::Block8x16),
            (16, 8) => Some(BlockSize::Block16x8),
            (16, 16) => Some(BlockSize::Block16x16),
            (16, 32) => Some(BlockSize::Block16x32),
            (32, 16) => Some(BlockSize::Block32x16),
            (32, 32) => Some(BlockSize::Block32x32),
            (32, 64) => Some(BlockSize::Block32x64),
            (64, 32) => Some(BlockSize::Block64x32),
            (64, 64) => Some(BlockSize::Block64x64),
            _ => None,
        }
    }
}
