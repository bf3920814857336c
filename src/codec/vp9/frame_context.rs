//! Frame contexts and the per-stream motion vector model session
//!
//! VP9 keeps `FRAME_CONTEXTS` saved probability sets. Each frame header picks
//! one of them as the starting point for the frame; after the frame is coded
//! the adapted probabilities may be written back to the same slot.
//!
//! [`MvSession`] owns that state for one stream:
//! - the saved slots ([`FrameContexts`])
//! - the active context the current frame codes with
//! - the current frame's symbol counts
//! - optional intra block copy and global motion components, chosen through
//!   [`MvModelConfig`] when the session is created

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::global_motion::{
    read_global_motion_type, write_global_motion_type, GlobalMotionContext, GlobalMotionType,
};
use super::mv_coding::{read_mv, read_mv_probs, write_mv, write_mv_probs};
use super::mv_entropy::{adapt_mv_probs, NmvContext, NmvContextCounts};
use super::symbol::{SymbolReader, SymbolWriter};
use super::tables::{MotionVector, FRAME_CONTEXTS};
use crate::error::{Error, Result};

// =============================================================================
// Configuration
// =============================================================================

/// Optional model components
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MvModelConfig {
    /// Code global motion types and allow global motion prediction
    pub global_motion: bool,
    /// Code intra block copy displacement vectors
    pub intra_block_copy: bool,
}

/// Index of a saved frame context, always below `FRAME_CONTEXTS`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FrameContextIdx(u8);

impl FrameContextIdx {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for FrameContextIdx {
    type Error = Error;

    fn try_from(idx: u8) -> Result<Self> {
        if (idx as usize) < FRAME_CONTEXTS {
            Ok(FrameContextIdx(idx))
        } else {
            Err(Error::config(format!(
                "frame context index {} out of range (max {})",
                idx,
                FRAME_CONTEXTS - 1
            )))
        }
    }
}

// =============================================================================
// Saved contexts
// =============================================================================

/// Saved motion vector contexts, one per frame context slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameContexts {
    slots: [NmvContext; FRAME_CONTEXTS],
}

impl FrameContexts {
    /// All slots at their defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, idx: FrameContextIdx) -> &NmvContext {
        &self.slots[idx.index()]
    }

    pub fn set(&mut self, idx: FrameContextIdx, ctx: NmvContext) {
        self.slots[idx.index()] = ctx;
    }

    /// Reset every slot to the default context
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.init_defaults();
        }
    }

    /// Save the slots to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidInput(format!("Failed to serialize frame contexts: {}", e)))?;

        std::fs::write(path, json)?;

        Ok(())
    }

    /// Load slots from a JSON file
    ///
    /// Fails with `InvalidInput` if the file does not parse or any slot holds
    /// a probability of 0.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;

        let contexts: FrameContexts = serde_json::from_str(&json).map_err(|e| {
            Error::InvalidInput(format!("Failed to deserialize frame contexts: {}", e))
        })?;

        for slot in contexts.slots.iter() {
            slot.validate()?;
        }

        Ok(contexts)
    }
}

// =============================================================================
// Optional components
// =============================================================================

/// Displacement vector context for intra block copy
///
/// Block copy vectors always point at whole pixels, so they are coded
/// without high precision and never feed adaptation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntraBlockCopyContext {
    pub ndvc: NmvContext,
}

// =============================================================================
// Session
// =============================================================================

/// Motion vector model state for one coded stream
#[derive(Debug, Clone)]
pub struct MvSession {
    config: MvModelConfig,
    frame_contexts: FrameContexts,
    frame_context_idx: FrameContextIdx,
    nmvc: NmvContext,
    counts: NmvContextCounts,
    intra_block_copy: Option<IntraBlockCopyContext>,
    global_motion: Option<GlobalMotionContext>,
}

impl MvSession {
    /// Create a session with every context at its defaults
    pub fn new(config: MvModelConfig) -> Self {
        MvSession {
            config,
            frame_contexts: FrameContexts::new(),
            frame_context_idx: FrameContextIdx::default(),
            nmvc: NmvContext::default(),
            counts: NmvContextCounts::default(),
            intra_block_copy: config
                .intra_block_copy
                .then(IntraBlockCopyContext::default),
            global_motion: config.global_motion.then(GlobalMotionContext::default),
        }
    }

    pub fn config(&self) -> &MvModelConfig {
        &self.config
    }

    /// Reset the active context, including optional components, to defaults
    pub fn init_defaults(&mut self) {
        self.nmvc.init_defaults();
        if let Some(ibc) = self.intra_block_copy.as_mut() {
            ibc.ndvc.init_defaults();
        }
        if let Some(gm) = self.global_motion.as_mut() {
            *gm = GlobalMotionContext::default();
        }
    }

    /// Reset the active context and every saved slot
    ///
    /// Used on key frames and error-resilient frames.
    pub fn reset_frame_contexts(&mut self) {
        self.init_defaults();
        self.frame_contexts.reset();
        debug!("Reset all {} MV frame contexts", FRAME_CONTEXTS);
    }

    /// Start a frame coded from saved slot `idx`
    ///
    /// The active context is loaded from the slot and counts are cleared.
    pub fn begin_frame(&mut self, idx: FrameContextIdx) {
        self.frame_context_idx = idx;
        self.nmvc = *self.frame_contexts.get(idx);
        self.counts.reset();
        debug!("Begin frame with MV frame context {}", idx.index());
    }

    /// Tally a motion vector difference coded outside this session
    pub fn accumulate(&mut self, diff: &MotionVector) {
        self.counts.accumulate(diff);
    }

    /// Fold counts gathered elsewhere, such as another tile, into this frame
    pub fn merge_counts(&mut self, other: &NmvContextCounts) {
        self.counts.merge(other);
    }

    /// Decode a motion vector with the active context and tally it
    pub fn read_mv<R: SymbolReader>(
        &mut self,
        r: &mut R,
        ref_mv: &MotionVector,
        allow_hp: bool,
    ) -> Result<MotionVector> {
        read_mv(r, ref_mv, &self.nmvc, Some(&mut self.counts), allow_hp)
    }

    /// Encode a motion vector with the active context and tally it
    pub fn write_mv<W: SymbolWriter>(
        &mut self,
        w: &mut W,
        mv: &MotionVector,
        ref_mv: &MotionVector,
        allow_hp: bool,
    ) -> Result<()> {
        write_mv(w, mv, ref_mv, &self.nmvc, allow_hp)?;
        let diff = MotionVector::new(mv.row - ref_mv.row, mv.col - ref_mv.col);
        self.counts.accumulate(&diff);
        Ok(())
    }

    /// Apply header probability updates to the active context
    pub fn read_mv_probs<R: SymbolReader>(&mut self, r: &mut R, allow_hp: bool) -> usize {
        read_mv_probs(r, &mut self.nmvc, allow_hp)
    }

    /// Write header probability updates moving the active context toward
    /// `target`
    pub fn write_mv_probs<W: SymbolWriter>(
        &mut self,
        w: &mut W,
        target: &NmvContext,
        allow_hp: bool,
    ) -> usize {
        write_mv_probs(w, &mut self.nmvc, target, allow_hp)
    }

    fn ibc(&self) -> Result<&IntraBlockCopyContext> {
        self.intra_block_copy
            .as_ref()
            .ok_or_else(|| Error::invalid_state("intra block copy is not enabled"))
    }

    fn gm(&self) -> Result<&GlobalMotionContext> {
        self.global_motion
            .as_ref()
            .ok_or_else(|| Error::invalid_state("global motion is not enabled"))
    }

    /// Decode an intra block copy displacement vector
    pub fn read_dv<R: SymbolReader>(&self, r: &mut R, ref_dv: &MotionVector) -> Result<MotionVector> {
        read_mv(r, ref_dv, &self.ibc()?.ndvc, None, false)
    }

    /// Encode an intra block copy displacement vector
    pub fn write_dv<W: SymbolWriter>(
        &self,
        w: &mut W,
        dv: &MotionVector,
        ref_dv: &MotionVector,
    ) -> Result<()> {
        write_mv(w, dv, ref_dv, &self.ibc()?.ndvc, false)
    }

    /// Decode a global motion type
    pub fn read_global_motion_type<R: SymbolReader>(&self, r: &mut R) -> Result<GlobalMotionType> {
        read_global_motion_type(r, &self.gm()?.type_probs)
    }

    /// Encode a global motion type
    pub fn write_global_motion_type<W: SymbolWriter>(
        &self,
        w: &mut W,
        gm_type: GlobalMotionType,
    ) -> Result<()> {
        write_global_motion_type(w, &self.gm()?.type_probs, gm_type);
        Ok(())
    }

    /// Adapt the active context to this frame's counts
    ///
    /// The saved slot the frame started from is the prior; it is not
    /// modified.
    pub fn adapt(&mut self, allow_hp: bool) {
        let pre_fc = self.frame_contexts.get(self.frame_context_idx);
        adapt_mv_probs(pre_fc, &self.counts, allow_hp, &mut self.nmvc);
        debug!(
            "Adapted MV probabilities from {} vectors (context {}, hp {})",
            self.counts.total(),
            self.frame_context_idx.index(),
            allow_hp
        );
    }

    /// Finish the frame, saving the active context when `refresh` is set
    pub fn end_frame(&mut self, refresh: bool) {
        if refresh {
            self.frame_contexts.set(self.frame_context_idx, self.nmvc);
            debug!("Refreshed MV frame context {}", self.frame_context_idx.index());
        }
    }

    pub fn nmvc(&self) -> &NmvContext {
        &self.nmvc
    }

    pub fn ndvc(&self) -> Option<&NmvContext> {
        self.intra_block_copy.as_ref().map(|ibc| &ibc.ndvc)
    }

    pub fn global_motion(&self) -> Option<&GlobalMotionContext> {
        self.global_motion.as_ref()
    }

    pub fn counts(&self) -> &NmvContextCounts {
        &self.counts
    }

    pub fn frame_context_idx(&self) -> FrameContextIdx {
        self.frame_context_idx
    }

    pub fn frame_contexts(&self) -> &FrameContexts {
        &self.frame_contexts
    }

    /// Replace the saved slots, for example with ones loaded from disk
    pub fn set_frame_contexts(&mut self, frame_contexts: FrameContexts) {
        self.frame_contexts = frame_contexts;
    }
}

impl Default for MvSession {
    fn default() -> Self {
        Self::new(MvModelConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::vp9::mv_entropy::DEFAULT_NMV_CONTEXT;
    use crate::codec::vp9::range_coder::RangeCoder;
    use crate::codec::vp9::range_encoder::RangeEncoder;

    fn idx(i: u8) -> FrameContextIdx {
        FrameContextIdx::try_from(i).unwrap()
    }

    #[test]
    fn test_frame_context_idx_range() {
        for i in 0..FRAME_CONTEXTS as u8 {
            assert_eq!(idx(i).index(), i as usize);
        }
        assert!(matches!(
            FrameContextIdx::try_from(FRAME_CONTEXTS as u8),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_new_session_defaults() {
        let session = MvSession::default();
        assert_eq!(*session.nmvc(), DEFAULT_NMV_CONTEXT);
        assert!(session.ndvc().is_none());
        assert!(session.global_motion().is_none());
        assert_eq!(session.counts().total(), 0);

        let session = MvSession::new(MvModelConfig {
            global_motion: true,
            intra_block_copy: true,
        });
        assert_eq!(session.ndvc(), Some(&DEFAULT_NMV_CONTEXT));
        assert_eq!(session.global_motion().map(|gm| gm.type_probs), Some([240, 255]));
    }

    #[test]
    fn test_adapt_leaves_prior_slot() {
        let mut session = MvSession::default();
        session.begin_frame(idx(2));
        for i in 1..40 {
            session.accumulate(&MotionVector::new(i, -i));
        }
        session.adapt(true);

        assert_ne!(*session.nmvc(), DEFAULT_NMV_CONTEXT);
        assert_eq!(*session.frame_contexts().get(idx(2)), DEFAULT_NMV_CONTEXT);

        session.end_frame(false);
        assert_eq!(*session.frame_contexts().get(idx(2)), DEFAULT_NMV_CONTEXT);

        session.end_frame(true);
        assert_eq!(session.frame_contexts().get(idx(2)), session.nmvc());
        assert_eq!(*session.frame_contexts().get(idx(0)), DEFAULT_NMV_CONTEXT);
    }

    #[test]
    fn test_begin_frame_loads_slot_and_clears_counts() {
        let mut session = MvSession::default();
        session.begin_frame(idx(1));
        session.accumulate(&MotionVector::new(8, 8));
        session.adapt(true);
        session.end_frame(true);
        let saved = *session.nmvc();

        session.begin_frame(idx(3));
        assert_eq!(*session.nmvc(), DEFAULT_NMV_CONTEXT);
        assert_eq!(session.counts().total(), 0);

        session.begin_frame(idx(1));
        assert_eq!(*session.nmvc(), saved);
    }

    #[test]
    fn test_reset_frame_contexts() {
        let mut session = MvSession::new(MvModelConfig {
            global_motion: true,
            intra_block_copy: false,
        });
        session.begin_frame(idx(0));
        session.accumulate(&MotionVector::new(0, 2));
        session.adapt(false);
        session.end_frame(true);
        assert_ne!(*session.frame_contexts().get(idx(0)), DEFAULT_NMV_CONTEXT);

        session.reset_frame_contexts();
        assert_eq!(*session.nmvc(), DEFAULT_NMV_CONTEXT);
        assert_eq!(*session.frame_contexts(), FrameContexts::new());
    }

    #[test]
    fn test_encoder_decoder_stay_in_sync() {
        let mvs = [
            (MotionVector::new(3, -7), MotionVector::new(0, 0)),
            (MotionVector::new(120, 64), MotionVector::new(100, 60)),
            (MotionVector::new(0, 0), MotionVector::new(0, 0)),
            (MotionVector::new(-2, 0), MotionVector::new(0, 0)),
        ];

        let mut enc = MvSession::default();
        let mut dec = MvSession::default();

        for frame in 0..3u8 {
            let fc = idx(frame % 2);
            enc.begin_frame(fc);
            dec.begin_frame(fc);

            let mut w = RangeEncoder::new();
            for (mv, ref_mv) in &mvs {
                enc.write_mv(&mut w, mv, ref_mv, true).unwrap();
            }
            let data = w.finalize();

            let mut r = RangeCoder::new(&data).unwrap();
            for (mv, ref_mv) in &mvs {
                assert_eq!(dec.read_mv(&mut r, ref_mv, true).unwrap(), *mv);
            }

            assert_eq!(enc.counts(), dec.counts());
            enc.adapt(true);
            dec.adapt(true);
            enc.end_frame(true);
            dec.end_frame(true);
            assert_eq!(enc.nmvc(), dec.nmvc());
        }
    }

    #[test]
    fn test_optional_components_gated() {
        let session = MvSession::default();
        let mut w = RangeEncoder::new();
        assert!(matches!(
            session.write_dv(&mut w, &MotionVector::new(8, 8), &MotionVector::zero()),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            session.write_global_motion_type(&mut w, GlobalMotionType::Translation),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_intra_block_copy_roundtrip() {
        let session = MvSession::new(MvModelConfig {
            global_motion: true,
            intra_block_copy: true,
        });
        let dv = MotionVector::new(-64, 128);

        let mut w = RangeEncoder::new();
        session.write_dv(&mut w, &dv, &MotionVector::zero()).unwrap();
        session
            .write_global_motion_type(&mut w, GlobalMotionType::RotZoom)
            .unwrap();
        let data = w.finalize();

        let mut r = RangeCoder::new(&data).unwrap();
        assert_eq!(session.read_dv(&mut r, &MotionVector::zero()).unwrap(), dv);
        assert_eq!(
            session.read_global_motion_type(&mut r).unwrap(),
            GlobalMotionType::RotZoom
        );
        assert_eq!(session.counts().total(), 0);
    }

    #[test]
    fn test_frame_contexts_persist() {
        let mut contexts = FrameContexts::new();
        let mut ctx = NmvContext::default();
        ctx.joints = [11, 33, 55];
        ctx.comps[1].bits[9] = 201;
        contexts.set(idx(3), ctx);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contexts.json");
        contexts.save(&path).unwrap();

        let loaded = FrameContexts::load(&path).unwrap();
        assert_eq!(loaded, contexts);
        assert_eq!(loaded.get(idx(3)).joints, [11, 33, 55]);
    }

    #[test]
    fn test_frame_contexts_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ \"slots\": 3 }").unwrap();
        assert!(matches!(FrameContexts::load(&path), Err(Error::InvalidInput(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(FrameContexts::load(&missing), Err(Error::Io(_))));
    }

    #[test]
    fn test_frame_contexts_load_rejects_zero_probability() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.json");

        let mut contexts = FrameContexts::new();
        let mut ctx = DEFAULT_NMV_CONTEXT;
        ctx.joints[0] = 0;
        ctx.comps[0].bits[3] = 0;
        contexts.set(idx(2), ctx);
        contexts.save(&path).unwrap();

        assert!(matches!(FrameContexts::load(&path), Err(Error::InvalidInput(_))));
    }
}
