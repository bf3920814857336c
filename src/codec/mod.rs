//! Codec building blocks

pub mod vp9;
