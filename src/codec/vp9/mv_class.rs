//! Motion vector magnitude classes
//!
//! A nonzero component `v` is coded as a sign plus `z = |v| - 1`. The value
//! `z` falls in one of eleven exponential classes; the offset inside the class
//! is then split, from the low end, into a high-precision bit, two
//! fractional-pel bits, and the remaining integer bits.
//!
//! ```text
//! class 0:   z in [0, 16)                offset = d:1 | fp:2 | hp:1
//! class c:   z in [2 << (c + 2), 2 << (c + 3))   offset = d:c | fp:2 | hp:1
//! ```
//!
//! Magnitudes at or above `CLASS0_SIZE * 4096` all map to class 10. Its
//! integer part has `MV_OFFSET_BITS` bits, so anything beyond the legal
//! motion vector range loses its top bits. This ceiling is intentional.

use super::tables::{CLASS0_BITS, CLASS0_SIZE, LOG_IN_BASE_2, MV_CLASSES, MV_CLASS_SATURATION};

/// Exponential magnitude class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum MvClass {
    Class0 = 0,
    Class1 = 1,
    Class2 = 2,
    Class3 = 3,
    Class4 = 4,
    Class5 = 5,
    Class6 = 6,
    Class7 = 7,
    Class8 = 8,
    Class9 = 9,
    Class10 = 10,
}

impl MvClass {
    /// All classes in index order
    pub const ALL: [MvClass; MV_CLASSES] = [
        MvClass::Class0,
        MvClass::Class1,
        MvClass::Class2,
        MvClass::Class3,
        MvClass::Class4,
        MvClass::Class5,
        MvClass::Class6,
        MvClass::Class7,
        MvClass::Class8,
        MvClass::Class9,
        MvClass::Class10,
    ];

    /// Class for a tree-decoded symbol index
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below `MV_CLASSES`.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index]
    }

    /// Class index
    pub const fn index(self) -> usize {
        self as usize
    }

    /// First magnitude (`|v| - 1`) of the class
    pub const fn base(self) -> u32 {
        match self {
            MvClass::Class0 => 0,
            c => (CLASS0_SIZE as u32) << (c as u32 + 2),
        }
    }

    /// Number of magnitudes covered by the class
    pub const fn width(self) -> u32 {
        match self {
            MvClass::Class0 => (CLASS0_SIZE as u32) << 3,
            c => (CLASS0_SIZE as u32) << (c as u32 + 2),
        }
    }

    /// Number of integer bits coded beyond class0 for this class
    pub const fn offset_bits(self) -> usize {
        self as usize + CLASS0_BITS - 1
    }
}

/// Classify a magnitude `z = |v| - 1`, returning the class and the offset
/// within it
pub fn classify(z: u32) -> (MvClass, u32) {
    let class = if z >= MV_CLASS_SATURATION {
        MvClass::Class10
    } else {
        MvClass::from_index(LOG_IN_BASE_2[(z >> 3) as usize] as usize)
    };
    (class, z - class.base())
}

/// Magnitude `z` for a class and in-class offset
pub const fn magnitude(class: MvClass, offset: u32) -> u32 {
    class.base() + offset
}

/// One motion vector component split into its coded fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentSymbols {
    /// Negative component
    pub sign: bool,
    /// Magnitude class
    pub class: MvClass,
    /// Integer part: the class0 index, or the offset bits beyond class0
    pub int_bits: u32,
    /// Fractional pel (0..4)
    pub fp: u8,
    /// High-precision bit
    pub hp: u8,
}

impl ComponentSymbols {
    /// Split a nonzero component into its coded fields
    ///
    /// # Panics
    ///
    /// Panics if `v` is zero; zero components are never coded and are
    /// filtered out by the joint type beforehand.
    pub fn from_component(v: i32) -> Self {
        assert!(v != 0, "zero motion vector component has no magnitude class");
        let sign = v < 0;
        let z = v.unsigned_abs() - 1;
        let (class, offset) = classify(z);
        ComponentSymbols {
            sign,
            class,
            int_bits: offset >> 3,
            fp: ((offset >> 1) & 3) as u8,
            hp: (offset & 1) as u8,
        }
    }

    /// In-class offset assembled from the coded fields
    pub const fn offset(&self) -> u32 {
        (self.int_bits << 3) | ((self.fp as u32) << 1) | self.hp as u32
    }

    /// Signed component value
    pub fn value(&self) -> i32 {
        let mag = (magnitude(self.class, self.offset()) + 1) as i32;
        if self.sign {
            -mag
        } else {
            mag
        }
    }
}
