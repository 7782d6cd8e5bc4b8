//! # LFO Phase Accumulator
//!
//! A low-frequency oscillator (LFO) is a slow periodic signal used to move
//! another parameter around. Here one sine LFO sweeps the comb's delay time
//! and, when tremolo is on, the output amplitude as well.
//!
//! The oscillator is nothing more than a phase value in `[0, 1)`: one full
//! cycle of the sine wave. Each sample the phase moves forward by
//! `frequency * sample_period` and wraps back into range.
//!
//! ## Unipolar Output
//!
//! A sine wave swings between -1 and +1, but a delay time can't go
//! negative and a tremolo gain shouldn't invert the signal. So the value
//! we hand out is shifted and scaled into `[0, 1]`:
//!
//! ```text
//! lfo = 0.5 + 0.5 * sin(2π * phase)
//! ```
//!
//! ## Frequency Zero
//!
//! When the rate knob is turned all the way down, the phase is not frozen
//! where it happens to be. While it sits above [`PARK_THRESHOLD`] it keeps
//! creeping forward at [`SETTLE_RATE_HZ`] until it wraps past 1.0 back to
//! (nearly) zero, and only then does it stop. The modulation therefore
//! settles out slowly instead of sticking at an arbitrary point of the
//! sweep.

use std::f32::consts::TAU;

/// Below this phase a zero-frequency LFO stops moving.
pub const PARK_THRESHOLD: f32 = 0.01;

/// The rate at which a zero-frequency LFO drifts back toward phase zero.
pub const SETTLE_RATE_HZ: f32 = 0.05;

/// The unipolar modulation value for `phase`, always in `[0, 1]`.
#[inline]
pub fn modulation(phase: f32) -> f32 {
    0.5 + 0.5 * (TAU * phase).sin()
}

/// Compute the phase for the next sample.
///
/// # Arguments
/// * `phase` - Current phase in `[0, 1)`.
/// * `frequency_hz` - LFO rate. Zero selects the settle-then-park rule.
/// * `sample_period` - `1 / sample_rate`, in seconds.
///
/// This is evaluated after [`modulation()`] has been taken for the
/// current sample, so sample `n` always uses the phase from before the
/// advance.
#[inline]
pub fn advance(phase: f32, frequency_hz: f32, sample_period: f32) -> f32 {
    if frequency_hz != 0.0 {
        wrap_unit(phase + frequency_hz * sample_period)
    } else if phase > PARK_THRESHOLD {
        wrap_unit(phase + SETTLE_RATE_HZ * sample_period)
    } else {
        phase
    }
}

/// Reduce a non-negative phase into `[0, 1)`.
///
/// `rem_euclid` can round up to exactly 1.0 for inputs a hair below an
/// integer, so that case is folded back to 0.
#[inline]
fn wrap_unit(phase: f32) -> f32 {
    let wrapped = phase.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
