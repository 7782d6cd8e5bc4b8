//! Errors reported by the comb engine.
//!
//! Steady-state processing has no failure modes of its own: every legal
//! parameter value produces defined arithmetic. What can go wrong is
//! misuse of the engine's lifecycle, and these types name those cases.

use thiserror::Error;

/// Why a configuration request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// The sample rate must be positive and finite to size the delay
    /// buffers and derive the sample period.
    #[error("invalid sample rate {0}, expected a positive finite value")]
    InvalidSampleRate(f32),
}

/// Why a block could not be processed.
///
/// `Copy` and heap-free so it can be returned from the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// `process_block()` was called before a successful `configure()`.
    #[error("the comb engine has not been configured")]
    Unconfigured,
}
