//! # Comb Mixing Network
//!
//! The "universal" comb topology combines a feedback comb and a
//! feedforward comb around a single delay line:
//!
//! ```text
//!            ┌──────────────── × bleed ─────────────────┐
//!            │                                          ▼
//! x[n] ──►(+)──► xh[n] ──► [delay M] ──┬── × feedforward ──►(+)──► y[n]
//!          ▲                           │
//!          └────── × feedback ─────────┘
//! ```
//!
//! ```text
//! xh[n] = x[n] + fb * xh[n - M]
//! y[n]  = bl * xh[n] + ff * xh[n - M]
//! ```
//!
//! The delay line stores `xh`, the pre-output signal, never `y`. That is
//! what makes the network "universal": with the right three gains it
//! becomes a plain feedforward comb (fb = 0), a feedback comb (bl = 1,
//! ff = 0), or a pure delay (bl = 0, fb = 0, ff = 1).
//!
//! No limiting is applied. With all gains at 1 the output can exceed unit
//! magnitude; the parameter ranges keep the loop gain at or below 1.

/// The three mixing gains of the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombGains {
    pub bleed: f32,
    pub feedforward: f32,
    pub feedback: f32,
}

/// What one sample through the network produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombSample {
    /// `xh[n]`: the value to store in the delay line.
    pub pre_output: f32,
    /// `y[n]`: the output before tremolo.
    pub output: f32,
}

/// Run one sample through the network.
///
/// `delayed` is the interpolated `xh[n - M]` read from the delay line.
#[inline]
pub fn mix(input: f32, delayed: f32, gains: CombGains) -> CombSample {
    let pre_output = input + gains.feedback * delayed;
    let output = gains.bleed * pre_output + gains.feedforward * delayed;

    CombSample { pre_output, output }
}

/// Scale the output by the LFO when tremolo is on.
#[inline]
pub fn apply_tremolo(output: f32, lfo: f32, enabled: bool) -> f32 {
    if enabled {
        lfo * output
    } else {
        output
    }
}
