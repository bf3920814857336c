//! vp9mv - the VP9 motion vector entropy model in Rust
//!
//! Codes motion vector differences with VP9's tree-structured binary
//! probability model and adapts that model between frames.
//!
//! # Architecture
//!
//! - `codec::vp9`: the motion vector model, its symbol coder and the
//!   per-stream session holding saved frame contexts
//! - `error`: the crate-wide error type

pub mod codec;
pub mod error;

pub use codec::vp9::{MotionVector, MvModelConfig, MvSession, NmvContext, NmvContextCounts};
pub use error::{Error, Result};

/// vp9mv version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Configuration for the vp9mv library
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
}

/// Initialize logging for the given configuration
///
/// Fails if a global tracing subscriber is already installed.
pub fn init(config: Config) -> Result<()> {
    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .try_init()
            .map_err(|e| Error::Init(format!("Failed to initialize logging: {}", e)))?;
    }

    Ok(())
}
