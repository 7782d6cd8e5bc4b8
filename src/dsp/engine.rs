//! # Block Processor
//!
//! Ties the LFO, the delay lines and the comb network together and runs
//! them over a block of audio.
//!
//! ## Shared Modulation, Per-Channel Memory
//!
//! Every channel has its own delay line, but one LFO and one write head
//! govern all of them. The processor loops channel-major: for each
//! channel it starts a *working copy* of the write position and LFO phase
//! from the values persisted at the end of the previous block, runs the
//! whole block, and throws the copy away. Since those two values depend
//! only on the sample index and the parameters, never on audio content,
//! every channel replays the exact same modulation trajectory. Only after
//! the last channel are the final values written back for the next block.
//!
//! ## Lifecycle
//!
//! ```text
//!   new() ──► Unconfigured ──configure(sr, block)──► Configured
//!                                                    │    ▲
//!                                                    └────┘
//!                                         configure() / reset()
//!                                         (full reset every time)
//! ```
//!
//! `process_block()` in the Unconfigured state returns
//! [`EngineError::Unconfigured`] without touching the audio.

use std::num::NonZeroUsize;

use nih_plug::prelude::*;

use super::comb::{self, CombGains, CombSample};
use super::delay_line::{DelayLine, Interpolation, READ_MARGIN};
use super::lfo;
use crate::error::{ConfigError, EngineError};

/// The longest delay the buffers must hold, as the fraction 11/20 of a
/// second. Keeping it a ratio of whole numbers means whole sample rates
/// size the buffer without floating-point round-up.
const MAX_DELAY_NUMERATOR: f64 = 11.0;
const MAX_DELAY_DENOMINATOR: f64 = 20.0;

/// Delay buffer length for `sample_rate`: `ceil(0.55 * sample_rate) + 3`.
///
/// The extra samples are the read margin, so a full 0.55 s of delay (the
/// largest `min_delay + sweep_width` the parameters allow, plus headroom)
/// still reads behind the write head.
pub fn delay_buffer_len(sample_rate: f32) -> usize {
    let max_delay_samples =
        (f64::from(sample_rate) * MAX_DELAY_NUMERATOR / MAX_DELAY_DENOMINATOR).ceil();
    max_delay_samples as usize + READ_MARGIN
}

/// Read access to the current parameter values.
///
/// The engine calls these once per sample, per channel, and never holds on
/// to the source past one `process_block()` call. Each value is read on
/// its own; no consistent snapshot across parameters is assumed.
pub trait ParameterSource {
    /// Minimum delay time, in seconds.
    fn min_delay(&self) -> f32;
    /// How far the LFO sweeps the delay above the minimum, in seconds.
    fn sweep_width(&self) -> f32;
    /// LFO rate in Hz.
    fn lfo_frequency(&self) -> f32;
    fn bleed(&self) -> f32;
    fn feedforward(&self) -> f32;
    fn feedback(&self) -> f32;
    /// Whether the output is amplitude modulated by the LFO.
    fn tremolo(&self) -> bool;

    fn interpolation(&self) -> Interpolation {
        Interpolation::Linear
    }
}

/// A plain copy of every parameter value.
///
/// Useful when a caller wants one consistent set of values for a whole
/// block, and in tests. The defaults match the plugin's parameter
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    pub min_delay: f32,
    pub sweep_width: f32,
    pub lfo_frequency: f32,
    pub bleed: f32,
    pub feedforward: f32,
    pub feedback: f32,
    pub tremolo: bool,
    pub interpolation: Interpolation,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            min_delay: 0.0,
            sweep_width: 0.002,
            lfo_frequency: 0.5,
            bleed: 0.7,
            feedforward: 0.7,
            feedback: 0.7,
            tremolo: false,
            interpolation: Interpolation::Linear,
        }
    }
}

impl ParameterSnapshot {
    /// Copy the current values out of any parameter source.
    pub fn capture(source: &impl ParameterSource) -> Self {
        Self {
            min_delay: source.min_delay(),
            sweep_width: source.sweep_width(),
            lfo_frequency: source.lfo_frequency(),
            bleed: source.bleed(),
            feedforward: source.feedforward(),
            feedback: source.feedback(),
            tremolo: source.tremolo(),
            interpolation: source.interpolation(),
        }
    }
}

impl ParameterSource for ParameterSnapshot {
    fn min_delay(&self) -> f32 {
        self.min_delay
    }

    fn sweep_width(&self) -> f32 {
        self.sweep_width
    }

    fn lfo_frequency(&self) -> f32 {
        self.lfo_frequency
    }

    fn bleed(&self) -> f32 {
        self.bleed
    }

    fn feedforward(&self) -> f32 {
        self.feedforward
    }

    fn feedback(&self) -> f32 {
        self.feedback
    }

    fn tremolo(&self) -> bool {
        self.tremolo
    }

    fn interpolation(&self) -> Interpolation {
        self.interpolation
    }
}

/// Everything that exists only once the sample rate is known.
struct Configured {
    sample_rate: f32,
    /// `1 / sample_rate`, the LFO phase step per Hz.
    sample_period: f32,
    max_block_size: usize,
    buffer_len: usize,
    /// One per delay channel. Never empty.
    delay_lines: Vec<DelayLine>,
    /// Shared write head, always in `[0, buffer_len)`.
    write_pos: usize,
    /// Shared LFO phase, always in `[0, 1)`.
    lfo_phase: f32,
}

impl Configured {
    fn reset(&mut self) {
        for delay_line in &mut self.delay_lines {
            delay_line.clear();
        }
        self.write_pos = 0;
        self.lfo_phase = 0.0;
    }
}

enum EngineState {
    Unconfigured,
    Configured(Configured),
}

/// The modulated comb filter engine.
pub struct CombEngine {
    /// How many delay lines to allocate. Audio channels past this count
    /// share the last delay line.
    num_delay_channels: NonZeroUsize,
    state: EngineState,
}

impl CombEngine {
    /// Create an unconfigured engine that will keep `num_delay_channels`
    /// independent delay lines.
    pub fn new(num_delay_channels: NonZeroUsize) -> Self {
        Self {
            num_delay_channels,
            state: EngineState::Unconfigured,
        }
    }

    /// Size and clear the delay lines for `sample_rate`, and reset the write
    /// head and LFO phase to zero.
    ///
    /// Calling this again with the same arguments is the same as calling it
    /// once: the buffers are cleared, not accumulated. On error the engine
    /// is left unconfigured.
    ///
    /// Allocates when the buffer length changes, so it must not run on the
    /// audio thread while a block is being processed.
    pub fn configure(
        &mut self,
        sample_rate: f32,
        max_block_size: usize,
    ) -> Result<(), ConfigError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            self.state = EngineState::Unconfigured;
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }

        let buffer_len = delay_buffer_len(sample_rate);

        // Same geometry: reuse the existing allocation.
        if let EngineState::Configured(configured) = &mut self.state {
            if configured.buffer_len == buffer_len
                && configured.delay_lines.len() == self.num_delay_channels.get()
            {
                configured.reset();
                configured.sample_rate = sample_rate;
                configured.sample_period = 1.0 / sample_rate;
                configured.max_block_size = max_block_size;
                return Ok(());
            }
        }

        // `delay_buffer_len()` always adds the read margin, so this is
        // never zero.
        let len = NonZeroUsize::new(buffer_len).unwrap_or(NonZeroUsize::MIN);
        let delay_lines = (0..self.num_delay_channels.get())
            .map(|_| DelayLine::new(len))
            .collect();

        self.state = EngineState::Configured(Configured {
            sample_rate,
            sample_period: 1.0 / sample_rate,
            max_block_size,
            buffer_len,
            delay_lines,
            write_pos: 0,
            lfo_phase: 0.0,
        });

        Ok(())
    }

    /// Clear all delay lines and rewind the write head and LFO. Equivalent
    /// to re-running `configure()` with the current arguments. Does nothing
    /// when unconfigured.
    pub fn reset(&mut self) {
        if let EngineState::Configured(configured) = &mut self.state {
            configured.reset();
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.state, EngineState::Configured(_))
    }

    pub fn num_delay_channels(&self) -> usize {
        self.num_delay_channels.get()
    }

    /// Length of each delay line, once configured.
    pub fn buffer_len(&self) -> Option<usize> {
        self.configured().map(|c| c.buffer_len)
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.configured().map(|c| c.sample_rate)
    }

    /// The persisted write head, once configured.
    pub fn write_pos(&self) -> Option<usize> {
        self.configured().map(|c| c.write_pos)
    }

    /// The persisted LFO phase, once configured.
    pub fn lfo_phase(&self) -> Option<f32> {
        self.configured().map(|c| c.lfo_phase)
    }

    /// How many samples of output the engine can still produce after the
    /// input goes silent, at the current parameter values.
    ///
    /// The feedback loop decays by a factor of `feedback` every pass
    /// through the longest delay in use. `None` means it never decays
    /// (feedback of 1 or more). An unconfigured engine has no tail.
    pub fn tail_samples(&self, params: &impl ParameterSource) -> Option<u32> {
        let Some(configured) = self.configured() else {
            return Some(0);
        };

        let max_delay_seconds = params.min_delay() + params.sweep_width();
        let delay_samples = max_delay_seconds * configured.sample_rate + READ_MARGIN as f32;
        let feedback = params.feedback();

        if feedback >= 1.0 {
            None
        } else if feedback > 0.001 {
            // Passes until the loop is down 60 dB: feedback^n = 0.001.
            let repeats = -3.0 / feedback.log10();
            Some((repeats * delay_samples).ceil() as u32)
        } else {
            Some(delay_samples.ceil() as u32)
        }
    }

    /// Run one block in place.
    ///
    /// `channels` holds one sample slice per audio channel. All slices are
    /// expected to have the same length; the shortest one sets the block
    /// length. Channel `c` uses delay line `min(c, num_delay_channels - 1)`.
    ///
    /// Never allocates, locks or blocks.
    pub fn process_block(
        &mut self,
        channels: &mut [&mut [f32]],
        params: &impl ParameterSource,
    ) -> Result<(), EngineError> {
        let EngineState::Configured(configured) = &mut self.state else {
            return Err(EngineError::Unconfigured);
        };

        let num_samples = channels.iter().map(|c| c.len()).min().unwrap_or(0);
        nih_debug_assert!(
            channels.iter().all(|c| c.len() == num_samples),
            "all channels in a block must have the same length"
        );
        nih_debug_assert!(
            num_samples <= configured.max_block_size,
            "block of {} samples exceeds the configured maximum of {}",
            num_samples,
            configured.max_block_size
        );

        let last_delay_line = configured.delay_lines.len() - 1;
        let mut persisted = (configured.write_pos, configured.lfo_phase);

        for (channel_idx, channel) in channels.iter_mut().enumerate() {
            let delay_line = &mut configured.delay_lines[channel_idx.min(last_delay_line)];

            persisted = process_channel(
                &mut channel[..num_samples],
                delay_line,
                configured.write_pos,
                configured.lfo_phase,
                configured.sample_rate,
                configured.sample_period,
                params,
            );
        }

        (configured.write_pos, configured.lfo_phase) = persisted;

        Ok(())
    }

    fn configured(&self) -> Option<&Configured> {
        match &self.state {
            EngineState::Configured(configured) => Some(configured),
            EngineState::Unconfigured => None,
        }
    }
}

/// Run one channel's samples through its delay line, starting from the
/// given write head and LFO phase. Returns where the write head and phase
/// ended up.
#[inline]
fn process_channel(
    samples: &mut [f32],
    delay_line: &mut DelayLine,
    mut write_pos: usize,
    mut phase: f32,
    sample_rate: f32,
    sample_period: f32,
    params: &impl ParameterSource,
) -> (usize, f32) {
    let buffer_len = delay_line.len();

    for sample in samples.iter_mut() {
        let input = *sample;
        let lfo = lfo::modulation(phase);

        // M[n]: the delay time for this sample, swept by the LFO.
        let delay_seconds = params.min_delay() + params.sweep_width() * lfo;
        let read_pos = delay_line.read_position(write_pos, delay_seconds * sample_rate);
        let delayed = delay_line.read(read_pos, params.interpolation());

        let gains = CombGains {
            bleed: params.bleed(),
            feedforward: params.feedforward(),
            feedback: params.feedback(),
        };
        let CombSample { pre_output, output } = comb::mix(input, delayed, gains);

        delay_line.write(write_pos, pre_output);
        *sample = comb::apply_tremolo(output, lfo, params.tremolo());

        write_pos = (write_pos + 1) % buffer_len;
        phase = lfo::advance(phase, params.lfo_frequency(), sample_period);
    }

    (write_pos, phase)
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
