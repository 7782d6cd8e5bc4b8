//! # DSP (Digital Signal Processing) Primitives
//!
//! The building blocks of the modulated comb filter, leaf to root:
//!
//! - **`lfo`**: the phase accumulator and unipolar sine that sweep the
//!   delay time and drive the tremolo.
//!
//! - **`delay_line`**: a ring buffer per channel with fractional
//!   (linear or cubic) reads.
//!
//! - **`comb`**: the feedback / feedforward / bleed mixing network.
//!
//! - **`engine`**: the block processor that runs all of the above per
//!   sample and per channel, and keeps the write head and LFO phase
//!   between blocks.

pub mod comb;
pub mod delay_line;
pub mod engine;
pub mod lfo;
