//! Global motion prediction
//!
//! A frame-level rotation-zoom model predicts a motion vector for every
//! block from its centre position. The model is a similarity transform:
//!
//! ```text
//! | x |   |  H0  H1 | | x0 |   | H2 |
//! | y | = | -H1  H0 | | y0 | + | H3 |
//! ```
//!
//! with `H0 = s * cos(r)`, `H1 = -s * sin(r)`, a scale `s` built from the
//! zoom parameter and an angle `r` from the rotation parameter. The
//! predicted vector is the displacement of the block centre in 1/8 pel.

use serde::{Deserialize, Serialize};

use super::symbol::{SymbolReader, SymbolWriter};
use super::tables::{BlockSize, MotionVector};
use crate::error::{Error, Result};
use super::tree::TreeNode::{self, Inner, Leaf};

/// Fractional bits of the zoom parameter
pub const ZOOM_PRECISION_BITS: u32 = 6;

/// Fractional bits of the rotation parameter (degrees)
pub const ROTATION_PRECISION_BITS: u32 = 4;

/// Number of global motion types
pub const GLOBAL_MOTION_TYPES: usize = 3;

/// Coding tree for the global motion type
pub const GLOBAL_MOTION_TYPE_TREE: [TreeNode; 2 * (GLOBAL_MOTION_TYPES - 1)] =
    [Leaf(0), Inner(2), Leaf(1), Leaf(2)];

/// Translation is by far the most common non-zero model
pub const DEFAULT_GLOBAL_MOTION_TYPE_PROBS: [u8; GLOBAL_MOTION_TYPES - 1] = [240, 255];

/// Kind of global motion model in use for a reference frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GlobalMotionType {
    #[default]
    Zero = 0,
    Translation = 1,
    RotZoom = 2,
}

impl GlobalMotionType {
    /// Type for a tree-decoded symbol
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(GlobalMotionType::Zero),
            1 => Some(GlobalMotionType::Translation),
            2 => Some(GlobalMotionType::RotZoom),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Global motion model parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalMotionParams {
    pub gm_type: GlobalMotionType,
    /// Zoom in units of 2^-ZOOM_PRECISION_BITS; 0 means no scaling
    pub zoom: i32,
    /// Rotation in units of 2^-ROTATION_PRECISION_BITS degrees
    pub rotation: i32,
    /// Translation in 1/8 pel
    pub mv: MotionVector,
}

impl GlobalMotionParams {
    /// Pure translation model
    pub const fn translation(mv: MotionVector) -> Self {
        GlobalMotionParams {
            gm_type: GlobalMotionType::Translation,
            zoom: 0,
            rotation: 0,
            mv,
        }
    }

    /// Transform coefficients `[H0, H1, H2, H3]`
    fn rotzoom(&self) -> [f64; 4] {
        let scale = 1.0 + self.zoom as f64 / (1u32 << ZOOM_PRECISION_BITS) as f64;
        let angle = (self.rotation as f64 / (1u32 << ROTATION_PRECISION_BITS) as f64).to_radians();
        [
            scale * angle.cos(),
            -scale * angle.sin(),
            self.mv.col as f64 / 8.0,
            self.mv.row as f64 / 8.0,
        ]
    }
}

/// Per-frame probabilities for global motion type symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalMotionContext {
    pub type_probs: [u8; GLOBAL_MOTION_TYPES - 1],
}

impl Default for GlobalMotionContext {
    fn default() -> Self {
        GlobalMotionContext {
            type_probs: DEFAULT_GLOBAL_MOTION_TYPE_PROBS,
        }
    }
}

/// Predicted displacement of pixel position `(col, row)`
fn global_mv(col: i32, row: i32, params: &GlobalMotionParams) -> MotionVector {
    let h = params.rotzoom();
    let (x0, y0) = (col as f64, row as f64);
    let x = h[0] * x0 + h[1] * y0 + h[2];
    let y = -h[1] * x0 + h[0] * y0 + h[3];

    let to_eighth_pel = |v: f64, origin: i32| {
        let d = (v * 8.0 + 0.5).floor() as i64 - 8 * origin as i64;
        d.clamp(i16::MIN as i64, i16::MAX as i64) as i16
    };

    MotionVector::new(to_eighth_pel(y, row), to_eighth_pel(x, col))
}

/// Global motion vector at the centre of a block whose top-left pixel is
/// `(col, row)`
pub fn global_block_center_mv(
    col: i32,
    row: i32,
    bsize: BlockSize,
    params: &GlobalMotionParams,
) -> MotionVector {
    global_mv(
        col + bsize.width_4x4() as i32 * 2,
        row + bsize.height_4x4() as i32 * 2,
        params,
    )
}

/// Global motion vector at the centre of 4x4 sub-block `block` (0..4, raster
/// order) of the 8x8 block whose top-left pixel is `(col, row)`
pub fn global_sub8x8_center_mv(
    col: i32,
    row: i32,
    block: usize,
    params: &GlobalMotionParams,
) -> MotionVector {
    let col = col + if block & 1 == 0 { 2 } else { 6 };
    let row = row + if block & 2 == 0 { 2 } else { 6 };
    global_mv(col, row, params)
}

/// Read a global motion type symbol
pub fn read_global_motion_type<R: SymbolReader>(
    r: &mut R,
    probs: &[u8; GLOBAL_MOTION_TYPES - 1],
) -> Result<GlobalMotionType> {
    let symbol = r.read_tree(&GLOBAL_MOTION_TYPE_TREE, probs);
    GlobalMotionType::from_index(symbol as usize)
        .ok_or_else(|| Error::codec(format!("Unknown global motion type {}", symbol)))
}

/// Write a global motion type symbol
pub fn write_global_motion_type<W: SymbolWriter>(
    w: &mut W,
    probs: &[u8; GLOBAL_MOTION_TYPES - 1],
    gm_type: GlobalMotionType,
) {
    w.write_tree(&GLOBAL_MOTION_TYPE_TREE, probs, gm_type.index() as u8);
}
