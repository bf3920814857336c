//! Motion vector joint types
//!
//! The joint type records which components of a motion vector difference are
//! nonzero. Only nonzero components are coded; the vertical component (row)
//! uses component model 0 and the horizontal component (col) model 1.

use super::tables::{MotionVector, MV_JOINTS};

/// Which components of a motion vector are nonzero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MvJoint {
    /// row == 0, col == 0
    Zero = 0,
    /// Horizontal nonzero, vertical zero: row == 0, col != 0
    HnzVz = 1,
    /// Horizontal zero, vertical nonzero: row != 0, col == 0
    HzVnz = 2,
    /// Both nonzero
    HnzVnz = 3,
}

impl MvJoint {
    /// All joint types in symbol order
    pub const ALL: [MvJoint; MV_JOINTS] =
        [MvJoint::Zero, MvJoint::HnzVz, MvJoint::HzVnz, MvJoint::HnzVnz];

    /// Joint type of a motion vector
    pub const fn of(mv: &MotionVector) -> Self {
        Self::from_components(mv.row as i32, mv.col as i32)
    }

    /// Joint type of a `(row, col)` pair held at wider precision
    pub const fn from_components(row: i32, col: i32) -> Self {
        match (row == 0, col == 0) {
            (true, true) => MvJoint::Zero,
            (true, false) => MvJoint::HnzVz,
            (false, true) => MvJoint::HzVnz,
            (false, false) => MvJoint::HnzVnz,
        }
    }

    /// Joint type for a tree-decoded symbol
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below `MV_JOINTS`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index]
    }

    /// Symbol index
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether the vertical (row) component is coded
    pub const fn has_vertical(self) -> bool {
        matches!(self, MvJoint::HzVnz | MvJoint::HnzVnz)
    }

    /// Whether the horizontal (col) component is coded
    pub const fn has_horizontal(self) -> bool {
        matches!(self, MvJoint::HnzVz | MvJoint::HnzVnz)
    }
}
