//! Common test utilities for vp9mv integration tests
//!
//! Deterministic motion vector streams and helpers for coding whole frames
//! through a session.

#![allow(dead_code)]

use vp9mv_lib::codec::vp9::{
    lower_mv_precision, use_mv_hp, MotionVector, MvSession, RangeCoder, RangeEncoder,
};

// ============================================================================
// Motion Vector Generation
// ============================================================================

/// Small linear congruential generator so tests are reproducible
pub struct MvGenerator {
    state: u64,
}

impl MvGenerator {
    pub fn new(seed: u64) -> Self {
        MvGenerator {
            state: seed.wrapping_mul(6364136223846793005).wrapping_add(1),
        }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 33) as u32
    }

    /// Component skewed toward small values, like real motion
    fn component(&mut self) -> i16 {
        let r = self.next_u32();
        let magnitude = match r % 10 {
            0..=3 => 0,
            4..=6 => (r >> 4) % 16,
            7..=8 => (r >> 4) % 512,
            _ => (r >> 4) % 8000,
        } as i16;
        if (r >> 30) & 1 == 1 {
            -magnitude
        } else {
            magnitude
        }
    }

    pub fn next_mv(&mut self) -> MotionVector {
        MotionVector::new(self.component(), self.component())
    }

    /// A `(mv, ref_mv)` pair that is codable with the given precision setting
    pub fn next_pair(&mut self, allow_hp: bool) -> (MotionVector, MotionVector) {
        let mut ref_mv = self.next_mv();
        lower_mv_precision(&mut ref_mv, allow_hp);

        let diff = self.next_mv();
        let mut mv = MotionVector::new(ref_mv.row + diff.row, ref_mv.col + diff.col);
        if !(allow_hp && use_mv_hp(&ref_mv)) {
            // Keep the difference on the 1/4-pel grid
            mv.row -= diff.row & 1;
            mv.col -= diff.col & 1;
        }
        (mv, ref_mv)
    }

    pub fn pairs(&mut self, n: usize, allow_hp: bool) -> Vec<(MotionVector, MotionVector)> {
        (0..n).map(|_| self.next_pair(allow_hp)).collect()
    }
}

// ============================================================================
// Frame Coding
// ============================================================================

/// Encode every pair with `session`, returning the coded bytes
pub fn encode_frame(
    session: &mut MvSession,
    pairs: &[(MotionVector, MotionVector)],
    allow_hp: bool,
) -> Vec<u8> {
    let mut encoder = RangeEncoder::new();
    for (mv, ref_mv) in pairs {
        session
            .write_mv(&mut encoder, mv, ref_mv, allow_hp)
            .expect("Failed to encode motion vector");
    }
    encoder.finalize()
}

/// Decode `refs.len()` vectors from `data` with `session`
pub fn decode_frame(
    session: &mut MvSession,
    data: &[u8],
    refs: &[MotionVector],
    allow_hp: bool,
) -> Vec<MotionVector> {
    let mut decoder = RangeCoder::new(data).expect("Failed to create range decoder");
    refs.iter()
        .map(|ref_mv| {
            session
                .read_mv(&mut decoder, ref_mv, allow_hp)
                .expect("Failed to decode motion vector")
        })
        .collect()
}
