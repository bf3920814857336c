//! VP9 motion vector entropy model
//!
//! Motion vectors in VP9 are coded as differences from a predicted vector
//! using a tree of binary decisions, each against an 8-bit probability. The
//! probabilities adapt from frame to frame toward the observed statistics.
//!
//! ## Layout
//!
//! - `tables`, `tree`: constants, coding trees and default probabilities
//! - `mv_class`, `mv_joint`: how a vector decomposes into coded symbols
//! - `mv_entropy`: probability contexts, symbol counts and adaptation
//! - `mv_coding`: reading and writing vectors and probability updates
//! - `prob`: the generic probability merge behind adaptation
//! - `range_coder`, `range_encoder`: the boolean arithmetic coder
//! - `frame_context`: saved frame contexts and the per-stream session
//! - `global_motion`: rotation-zoom global motion prediction

pub mod frame_context;
pub mod global_motion;
pub mod mv_class;
pub mod mv_coding;
pub mod mv_entropy;
pub mod mv_joint;
pub mod prob;
pub mod range_coder;
pub mod range_encoder;
pub mod symbol;
pub mod tables;
pub mod tree;

pub use frame_context::{FrameContextIdx, FrameContexts, IntraBlockCopyContext, MvModelConfig, MvSession};
pub use global_motion::{
    global_block_center_mv, global_sub8x8_center_mv, GlobalMotionContext, GlobalMotionParams,
    GlobalMotionType,
};
pub use mv_class::{classify, ComponentSymbols, MvClass};
pub use mv_coding::{read_mv, read_mv_probs, write_mv, write_mv_probs};
pub use mv_entropy::{
    accumulate_mv, adapt_mv_probs, is_mv_valid, lower_mv_precision, use_mv_hp, NmvComponent,
    NmvComponentCounts, NmvContext, NmvContextCounts, DEFAULT_NMV_CONTEXT,
};
pub use mv_joint::MvJoint;
pub use range_coder::RangeCoder;
pub use range_encoder::RangeEncoder;
pub use symbol::{SymbolReader, SymbolWriter};
pub use tables::{BlockSize, MotionVector};
