//! Motion vector probability model
//!
//! An [`NmvContext`] holds every probability used to code motion vector
//! differences: the joint type plus one [`NmvComponent`] per axis. During a
//! frame, each coded difference is tallied into an [`NmvContextCounts`] of
//! the same shape; once the frame is done, [`adapt_mv_probs`] blends the
//! prior context with those counts to produce the probabilities for the next
//! frame.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::mv_class::{ComponentSymbols, MvClass};
use super::mv_joint::MvJoint;
use super::prob::{merge_probs, tree_merge_probs};
use super::tree::TreeNode;
use super::tables::{
    MotionVector, CLASS0_SIZE, COMPANDED_MVREF_THRESH, DEFAULT_BITS_PROBS, DEFAULT_CLASS0_FP_PROBS,
    DEFAULT_CLASS0_HP_PROB, DEFAULT_CLASS0_PROBS, DEFAULT_CLASS_PROBS, DEFAULT_FP_PROBS,
    DEFAULT_HP_PROB, DEFAULT_JOINT_PROBS, DEFAULT_SIGN_PROB, MV_CLASSES, MV_CLASS0_TREE,
    MV_CLASS_TREE, MV_COUNT_SAT, MV_FP_SIZE, MV_FP_TREE, MV_JOINTS, MV_JOINT_TREE, MV_LOW,
    MV_MAX_UPDATE_FACTOR, MV_OFFSET_BITS, MV_UPP,
};

// =============================================================================
// Probabilities
// =============================================================================

/// Probabilities for one motion vector component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NmvComponent {
    pub sign: u8,
    pub classes: [u8; MV_CLASSES - 1],
    pub class0: [u8; CLASS0_SIZE - 1],
    pub bits: [u8; MV_OFFSET_BITS],
    pub class0_fp: [[u8; MV_FP_SIZE - 1]; CLASS0_SIZE],
    pub fp: [u8; MV_FP_SIZE - 1],
    pub class0_hp: u8,
    pub hp: u8,
}

impl NmvComponent {
    /// Default probabilities for component 0 (vertical) or 1 (horizontal)
    pub const fn default_for(component: usize) -> Self {
        NmvComponent {
            sign: DEFAULT_SIGN_PROB,
            classes: DEFAULT_CLASS_PROBS[component],
            class0: DEFAULT_CLASS0_PROBS[component],
            bits: DEFAULT_BITS_PROBS,
            class0_fp: DEFAULT_CLASS0_FP_PROBS,
            fp: DEFAULT_FP_PROBS,
            class0_hp: DEFAULT_CLASS0_HP_PROB,
            hp: DEFAULT_HP_PROB,
        }
    }

    fn probs(&self) -> impl Iterator<Item = u8> + '_ {
        std::iter::once(self.sign)
            .chain(self.classes)
            .chain(self.class0)
            .chain(self.bits)
            .chain(self.class0_fp.into_iter().flatten())
            .chain(self.fp)
            .chain([self.class0_hp, self.hp])
    }
}

/// Full motion vector probability context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NmvContext {
    pub joints: [u8; MV_JOINTS - 1],
    /// Indexed by component: 0 = vertical (row), 1 = horizontal (col)
    pub comps: [NmvComponent; 2],
}

/// Default context loaded on key frames and error-resilient resets
pub const DEFAULT_NMV_CONTEXT: NmvContext = NmvContext {
    joints: DEFAULT_JOINT_PROBS,
    comps: [NmvComponent::default_for(0), NmvComponent::default_for(1)],
};

impl NmvContext {
    /// Reset every probability to the default table
    pub fn init_defaults(&mut self) {
        *self = DEFAULT_NMV_CONTEXT;
    }

    /// Check that no probability is 0
    ///
    /// Contexts read from outside the coder (saved frame contexts, JSON
    /// priors) must pass this before they are used for coding or adaptation.
    pub fn validate(&self) -> Result<()> {
        let zero_joint = self.joints.contains(&0);
        let zero_comp = self.comps.iter().position(|c| c.probs().any(|p| p == 0));

        if zero_joint {
            return Err(Error::invalid_input("Joint probability of 0 in motion vector context"));
        }
        if let Some(comp) = zero_comp {
            return Err(Error::invalid_input(format!(
                "Probability of 0 in motion vector component {}",
                comp
            )));
        }
        Ok(())
    }
}

impl Default for NmvContext {
    fn default() -> Self {
        DEFAULT_NMV_CONTEXT
    }
}

// =============================================================================
// Counts
// =============================================================================

/// Symbol counts for one motion vector component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NmvComponentCounts {
    pub sign: [u32; 2],
    pub classes: [u32; MV_CLASSES],
    pub class0: [u32; CLASS0_SIZE],
    pub bits: [[u32; 2]; MV_OFFSET_BITS],
    pub class0_fp: [[u32; MV_FP_SIZE]; CLASS0_SIZE],
    pub fp: [u32; MV_FP_SIZE],
    pub class0_hp: [u32; 2],
    pub hp: [u32; 2],
}

impl NmvComponentCounts {
    /// Tally every symbol of a nonzero component
    ///
    /// `usehp` scales the high-precision bit's contribution and is either 0 or
    /// 1.
    ///
    /// # Panics
    ///
    /// Panics if `v` is zero.
    pub fn increment(&mut self, v: i32, incr: u32, usehp: u32) {
        let s = ComponentSymbols::from_component(v);
        let d = s.int_bits as usize;
        let f = s.fp as usize;
        let e = s.hp as usize;

        self.sign[s.sign as usize] += incr;
        self.classes[s.class.index()] += incr;

        if s.class == MvClass::Class0 {
            self.class0[d] += incr;
            self.class0_fp[d][f] += incr;
            self.class0_hp[e] += usehp * incr;
        } else {
            for i in 0..s.class.offset_bits() {
                self.bits[i][(d >> i) & 1] += incr;
            }
            self.fp[f] += incr;
            self.hp[e] += usehp * incr;
        }
    }

    /// Add another component's counts into this one
    pub fn merge(&mut self, other: &NmvComponentCounts) {
        fn add<const N: usize>(dst: &mut [u32; N], src: &[u32; N]) {
            for (d, s) in dst.iter_mut().zip(src) {
                *d = d.saturating_add(*s);
            }
        }

        add(&mut self.sign, &other.sign);
        add(&mut self.classes, &other.classes);
        add(&mut self.class0, &other.class0);
        for (d, s) in self.bits.iter_mut().zip(&other.bits) {
            add(d, s);
        }
        for (d, s) in self.class0_fp.iter_mut().zip(&other.class0_fp) {
            add(d, s);
        }
        add(&mut self.fp, &other.fp);
        add(&mut self.class0_hp, &other.class0_hp);
        add(&mut self.hp, &other.hp);
    }
}

/// Symbol counts for a full motion vector context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NmvContextCounts {
    pub joints: [u32; MV_JOINTS],
    pub comps: [NmvComponentCounts; 2],
}

impl NmvContextCounts {
    /// Tally one motion vector difference
    ///
    /// Statistics always count the high-precision bit, whether or not it was
    /// actually coded for this vector.
    pub fn accumulate(&mut self, mv: &MotionVector) {
        let j = MvJoint::of(mv);
        self.joints[j.index()] += 1;

        if j.has_vertical() {
            self.comps[0].increment(mv.row as i32, 1, 1);
        }
        if j.has_horizontal() {
            self.comps[1].increment(mv.col as i32, 1, 1);
        }
    }

    /// Add counts gathered elsewhere (another tile or thread) into these
    pub fn merge(&mut self, other: &NmvContextCounts) {
        for (d, s) in self.joints.iter_mut().zip(&other.joints) {
            *d = d.saturating_add(*s);
        }
        for (d, s) in self.comps.iter_mut().zip(&other.comps) {
            d.merge(s);
        }
    }

    /// Zero every counter
    pub fn reset(&mut self) {
        *self = NmvContextCounts::default();
    }

    /// Number of motion vectors tallied
    pub fn total(&self) -> u64 {
        self.joints.iter().map(|&c| c as u64).sum()
    }
}

/// Tally a motion vector difference when statistics are being gathered
pub fn accumulate_mv(mv: &MotionVector, counts: Option<&mut NmvContextCounts>) {
    if let Some(counts) = counts {
        counts.accumulate(mv);
    }
}

// =============================================================================
// Adaptation
// =============================================================================

#[inline]
fn adapt_prob(pre_prob: u8, counts: [u32; 2]) -> u8 {
    merge_probs(pre_prob, counts, MV_COUNT_SAT, MV_MAX_UPDATE_FACTOR)
}

#[inline]
fn adapt_probs(tree: &[TreeNode], pre_probs: &[u8], counts: &[u32], probs: &mut [u8]) {
    tree_merge_probs(tree, pre_probs, counts, MV_COUNT_SAT, MV_MAX_UPDATE_FACTOR, probs);
}

/// Adapt motion vector probabilities to one frame's statistics
///
/// `pre_fc` is the stored context the frame started from and is only read;
/// results are written into `fc`. The high-precision probabilities are only
/// touched when `allow_hp` is set, otherwise `fc` keeps its current values.
pub fn adapt_mv_probs(
    pre_fc: &NmvContext,
    counts: &NmvContextCounts,
    allow_hp: bool,
    fc: &mut NmvContext,
) {
    adapt_probs(&MV_JOINT_TREE, &pre_fc.joints, &counts.joints, &mut fc.joints);

    for ((comp, pre_comp), c) in fc.comps.iter_mut().zip(&pre_fc.comps).zip(&counts.comps) {
        comp.sign = adapt_prob(pre_comp.sign, c.sign);
        adapt_probs(&MV_CLASS_TREE, &pre_comp.classes, &c.classes, &mut comp.classes);
        adapt_probs(&MV_CLASS0_TREE, &pre_comp.class0, &c.class0, &mut comp.class0);

        for j in 0..MV_OFFSET_BITS {
            comp.bits[j] = adapt_prob(pre_comp.bits[j], c.bits[j]);
        }

        for j in 0..CLASS0_SIZE {
            adapt_probs(&MV_FP_TREE, &pre_comp.class0_fp[j], &c.class0_fp[j], &mut comp.class0_fp[j]);
        }

        adapt_probs(&MV_FP_TREE, &pre_comp.fp, &c.fp, &mut comp.fp);

        if allow_hp {
            comp.class0_hp = adapt_prob(pre_comp.class0_hp, c.class0_hp);
            comp.hp = adapt_prob(pre_comp.hp, c.hp);
        }
    }
}

// =============================================================================
// Precision
// =============================================================================

/// Whether 1/8-pel precision may be coded relative to `ref_mv`
///
/// High precision is only used for small reference vectors: both components
/// must be below `COMPANDED_MVREF_THRESH` full pels.
pub fn use_mv_hp(ref_mv: &MotionVector) -> bool {
    (ref_mv.row as i32).abs() >> 3 < COMPANDED_MVREF_THRESH
        && (ref_mv.col as i32).abs() >> 3 < COMPANDED_MVREF_THRESH
}

/// Round a vector to 1/4-pel when 1/8-pel precision is unavailable for it
///
/// Odd components move one unit toward zero.
pub fn lower_mv_precision(mv: &mut MotionVector, allow_hp: bool) {
    if allow_hp && use_mv_hp(mv) {
        return;
    }
    if mv.row & 1 != 0 {
        mv.row += if mv.row > 0 { -1 } else { 1 };
    }
    if mv.col & 1 != 0 {
        mv.col += if mv.col > 0 { -1 } else { 1 };
    }
}

/// Whether a single component lies strictly inside the codable range
#[inline]
pub(crate) fn is_component_valid(v: i32) -> bool {
    v > MV_LOW && v < MV_UPP
}

/// Whether both components lie strictly inside the codable range
pub fn is_mv_valid(mv: &MotionVector) -> bool {
    is_component_valid(mv.row as i32) && is_component_valid(mv.col as i32)
}
