//! Motion vector symbol coding
//!
//! Reads and writes motion vector differences against an [`NmvContext`], and
//! the forward probability updates for that context carried in the
//! compressed frame header.
//!
//! A vector is coded as the difference from its reference (predicted)
//! vector:
//! - the joint type, choosing which components follow
//! - per nonzero component: sign, class, integer bits, fractional pel, and
//!   the high-precision bit when 1/8-pel precision is in use

use tracing::{debug, trace, warn};

use super::mv_class::{ComponentSymbols, MvClass};
use super::mv_entropy::{
    accumulate_mv, is_component_valid, use_mv_hp, NmvComponent, NmvContext, NmvContextCounts,
};
use super::mv_joint::MvJoint;
use super::symbol::{SymbolReader, SymbolWriter};
use super::tables::{
    MotionVector, MV_CLASS0_TREE, MV_CLASS_TREE, MV_FP_TREE, MV_JOINT_TREE, MV_MAX, MV_UPDATE_PROB,
};
use crate::error::{Error, Result};

// =============================================================================
// Motion vectors
// =============================================================================

fn read_component<R: SymbolReader>(r: &mut R, comp: &NmvComponent, usehp: bool) -> i32 {
    let sign = r.read_bool(comp.sign);
    let class = MvClass::from_index(r.read_tree(&MV_CLASS_TREE, &comp.classes) as usize);

    let (int_bits, fp_probs, hp_prob) = if class == MvClass::Class0 {
        let d = r.read_tree(&MV_CLASS0_TREE, &comp.class0) as usize;
        (d as u32, &comp.class0_fp[d], comp.class0_hp)
    } else {
        let mut d = 0u32;
        for i in 0..class.offset_bits() {
            d |= (r.read_bool(comp.bits[i]) as u32) << i;
        }
        (d, &comp.fp, comp.hp)
    };

    let fp = r.read_tree(&MV_FP_TREE, fp_probs);
    let hp = if usehp { r.read_bool(hp_prob) as u8 } else { 1 };

    ComponentSymbols {
        sign,
        class,
        int_bits,
        fp,
        hp,
    }
    .value()
}

fn write_component<W: SymbolWriter>(w: &mut W, comp: &NmvComponent, v: i32, usehp: bool) {
    let s = ComponentSymbols::from_component(v);

    w.write_bool(s.sign, comp.sign);
    w.write_tree(&MV_CLASS_TREE, &comp.classes, s.class.index() as u8);

    let (fp_probs, hp_prob) = if s.class == MvClass::Class0 {
        w.write_tree(&MV_CLASS0_TREE, &comp.class0, s.int_bits as u8);
        (&comp.class0_fp[s.int_bits as usize], comp.class0_hp)
    } else {
        for i in 0..s.class.offset_bits() {
            w.write_bool((s.int_bits >> i) & 1 != 0, comp.bits[i]);
        }
        (&comp.fp, comp.hp)
    };

    w.write_tree(&MV_FP_TREE, fp_probs, s.fp);
    if usehp {
        w.write_bool(s.hp != 0, hp_prob);
    }
}

/// Decode a motion vector coded relative to `ref_mv`
///
/// The decoded difference is tallied into `counts` when given. A vector that
/// lands outside the legal range means the stream is corrupt.
pub fn read_mv<R: SymbolReader>(
    r: &mut R,
    ref_mv: &MotionVector,
    ctx: &NmvContext,
    counts: Option<&mut NmvContextCounts>,
    allow_hp: bool,
) -> Result<MotionVector> {
    let joint = MvJoint::from_index(r.read_tree(&MV_JOINT_TREE, &ctx.joints) as usize);
    let usehp = allow_hp && use_mv_hp(ref_mv);

    let row = if joint.has_vertical() {
        read_component(r, &ctx.comps[0], usehp)
    } else {
        0
    };
    let col = if joint.has_horizontal() {
        read_component(r, &ctx.comps[1], usehp)
    } else {
        0
    };

    // Component magnitudes never exceed MV_MAX + 1, so the difference fits
    let diff = MotionVector::new(row as i16, col as i16);
    accumulate_mv(&diff, counts);

    let mv_row = ref_mv.row as i32 + row;
    let mv_col = ref_mv.col as i32 + col;
    if !is_component_valid(mv_row) || !is_component_valid(mv_col) {
        warn!(
            "Corrupt motion vector ({}, {}) from reference ({}, {})",
            mv_row, mv_col, ref_mv.row, ref_mv.col
        );
        return Err(Error::codec(format!(
            "motion vector ({}, {}) out of range",
            mv_row, mv_col
        )));
    }

    trace!(
        "Decoded MV ({}, {}) joint {:?} hp {}",
        mv_row,
        mv_col,
        joint,
        usehp
    );

    Ok(MotionVector::new(mv_row as i16, mv_col as i16))
}

/// Encode `mv` relative to `ref_mv`
///
/// When 1/8-pel precision is not in use for this reference, the difference
/// must already be of 1/4-pel precision (see
/// [`lower_mv_precision`](super::mv_entropy::lower_mv_precision)).
pub fn write_mv<W: SymbolWriter>(
    w: &mut W,
    mv: &MotionVector,
    ref_mv: &MotionVector,
    ctx: &NmvContext,
    allow_hp: bool,
) -> Result<()> {
    let row = mv.row as i32 - ref_mv.row as i32;
    let col = mv.col as i32 - ref_mv.col as i32;
    let usehp = allow_hp && use_mv_hp(ref_mv);

    for v in [row, col] {
        if v.unsigned_abs() > MV_MAX as u32 + 1 {
            return Err(Error::invalid_input(format!(
                "motion vector difference {} is too large to code",
                v
            )));
        }
        if !usehp && v & 1 != 0 {
            return Err(Error::invalid_input(format!(
                "motion vector difference {} needs 1/8-pel precision",
                v
            )));
        }
    }

    let joint = MvJoint::from_components(row, col);
    w.write_tree(&MV_JOINT_TREE, &ctx.joints, joint.index() as u8);

    if joint.has_vertical() {
        write_component(w, &ctx.comps[0], row, usehp);
    }
    if joint.has_horizontal() {
        write_component(w, &ctx.comps[1], col, usehp);
    }

    Ok(())
}

// =============================================================================
// Probability updates
// =============================================================================

/// Every forward-updatable probability, in bitstream order
fn prob_slots(ctx: &mut NmvContext, allow_hp: bool) -> Vec<&mut u8> {
    let mut head = Vec::new();
    let mut frac = Vec::new();
    let mut hp = Vec::new();

    head.extend(ctx.joints.iter_mut());
    for comp in ctx.comps.iter_mut() {
        head.push(&mut comp.sign);
        head.extend(comp.classes.iter_mut());
        head.extend(comp.class0.iter_mut());
        head.extend(comp.bits.iter_mut());

        frac.extend(comp.class0_fp.iter_mut().flatten());
        frac.extend(comp.fp.iter_mut());

        if allow_hp {
            hp.push(&mut comp.class0_hp);
            hp.push(&mut comp.hp);
        }
    }

    head.extend(frac);
    head.extend(hp);
    head
}

/// Apply the header's motion vector probability updates to `ctx`
///
/// Returns the number of probabilities replaced.
pub fn read_mv_probs<R: SymbolReader>(r: &mut R, ctx: &mut NmvContext, allow_hp: bool) -> usize {
    let mut updated = 0;
    for p in prob_slots(ctx, allow_hp) {
        if r.read_bool(MV_UPDATE_PROB) {
            *p = ((r.read_literal(7) << 1) | 1) as u8;
            updated += 1;
        }
    }
    debug!("Read {} MV probability updates", updated);
    updated
}

/// Write the updates that move `current` toward `target`
///
/// Updated probabilities can only be odd, so each target value is rounded
/// up to odd first. Every probability whose rounded target differs from its
/// current value is updated, and `current` is modified to match what a
/// decoder will hold. Returns the number of probabilities updated.
pub fn write_mv_probs<W: SymbolWriter>(
    w: &mut W,
    current: &mut NmvContext,
    target: &NmvContext,
    allow_hp: bool,
) -> usize {
    let mut target = *target;
    let mut updated = 0;

    for (cur, want) in prob_slots(current, allow_hp)
        .into_iter()
        .zip(prob_slots(&mut target, allow_hp))
    {
        let want = *want | 1;
        if *cur != want {
            w.write_bool(true, MV_UPDATE_PROB);
            w.write_literal((want >> 1) as u32, 7);
            *cur = want;
            updated += 1;
        } else {
            w.write_bool(false, MV_UPDATE_PROB);
        }
    }

    debug!("Wrote {} MV probability updates", updated);
    updated
}
