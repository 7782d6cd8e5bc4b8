//! # Universal Comb Filter — An AU/VST3/CLAP Modulated Comb Plugin
//!
//! A modulated comb filter built with [nih-plug](https://github.com/robbert-vdh/nih-plug):
//! one delay line per channel whose delay time is swept by a sine LFO,
//! wrapped in a feedback / feedforward / bleed mixing network, with an
//! optional tremolo driven by the same LFO. Depending on the gains it
//! behaves as a flanger, a chorus-like vibrato, a feedback comb, or a
//! plain modulated delay.
//!
//! ## Signal Flow
//!
//! ```text
//!                          ┌───────────────── × bleed ─────────────────┐
//!                          │                                           ▼
//! Input ──►(+)──► xh ──────┴──► [Delay Line] ──┬──── × feedforward ──►(+)──► × LFO? ──► Output
//!           ▲                   (read M[n]     │                               (tremolo)
//!           │                    behind the    │
//!           │                    write head)   │
//!           └──────────── × feedback ──────────┘
//!
//!        M[n] = min_delay + sweep_width × LFO[n]
//! ```
//!
//! The per-sample DSP lives in [`dsp`]; this file only connects it to the
//! host.

pub mod dsp;
pub mod error;
mod params;

use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;

use dsp::engine::CombEngine;
use nih_plug::prelude::*;
use params::CombParams;

/// The number of delay lines when the host hasn't told us the channel
/// count yet: one per channel of the default stereo layout.
const DEFAULT_DELAY_CHANNELS: NonZeroUsize = match NonZeroUsize::new(2) {
    Some(n) => n,
    None => unreachable!(),
};

/// The main plugin struct.
///
/// Parameters are shared with the host through an `Arc` and may be read
/// from any thread. The engine, with its delay lines, write head and LFO
/// phase, is owned by the audio thread and only touched in
/// `initialize()`, `reset()` and `process()`.
struct UniversalComb {
    params: Arc<CombParams>,
    engine: CombEngine,
}

impl Default for UniversalComb {
    fn default() -> Self {
        Self {
            params: Arc::new(CombParams::default()),
            // Stays unconfigured until the host calls initialize() with
            // the real sample rate and channel count.
            engine: CombEngine::new(DEFAULT_DELAY_CHANNELS),
        }
    }
}

impl Plugin for UniversalComb {
    const NAME: &'static str = "Universal Comb Filter";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first since that's what most tracks are, mono as the fallback.
    // Input and output channel counts always match.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are read fresh every sample, so sample-accurate automation
    // lets an automation point take effect on the exact sample it lands on.
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Size the delay lines for the host's sample rate and channel count.
    ///
    /// Returning `false` tells the host this configuration can't be used;
    /// that only happens for a sample rate the engine can't work with.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let num_channels = audio_io_layout
            .main_input_channels
            .and_then(|c| NonZeroUsize::new(c.get() as usize))
            .unwrap_or(DEFAULT_DELAY_CHANNELS);

        if self.engine.num_delay_channels() != num_channels.get() {
            self.engine = CombEngine::new(num_channels);
        }

        let max_block_size = buffer_config.max_buffer_size as usize;
        match self
            .engine
            .configure(buffer_config.sample_rate, max_block_size)
        {
            Ok(()) => {
                nih_log!(
                    "Configured comb filter: {} Hz, {} channels, {} samples per delay line, blocks up to {} samples",
                    buffer_config.sample_rate,
                    num_channels,
                    self.engine.buffer_len().unwrap_or(0),
                    max_block_size
                );
                true
            }
            Err(err) => {
                nih_error!("Could not configure the comb filter: {err}");
                false
            }
        }
    }

    /// Called when playback stops or the plugin is bypassed. Clears the
    /// delay lines and rewinds the write head and LFO, exactly like a
    /// fresh configuration.
    fn reset(&mut self) {
        self.engine.reset();
    }

    /// Run the comb filter over one block, in place.
    ///
    /// nih-plug hands us the block as one slice per channel, which is the
    /// channel-major layout the engine wants: each channel is run across
    /// the whole block before moving on to the next, and they all share
    /// one LFO trajectory.
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let params = self.params.as_ref();

        if let Err(err) = self.engine.process_block(buffer.as_slice(), params) {
            nih_debug_assert_failure!("{}", err);
            return ProcessStatus::Error("the comb filter was not initialized");
        }

        // Keep the host calling process() while the feedback loop is still
        // ringing out after the input goes silent.
        match self.engine.tail_samples(params) {
            Some(tail) => ProcessStatus::Tail(tail),
            None => ProcessStatus::KeepAlive,
        }
    }
}

impl ClapPlugin for UniversalComb {
    const CLAP_ID: &'static str = "com.loveless-audio.universal-comb-filter";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A modulated comb filter with feedback, feedforward, bleed and tremolo");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Filter,
        ClapFeature::Flanger,
        ClapFeature::Tremolo,
    ];
}

impl Vst3Plugin for UniversalComb {
    // Sixteen ASCII bytes, unique to this plugin.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssUnivComb001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] = &[
        Vst3SubCategory::Fx,
        Vst3SubCategory::Filter,
        Vst3SubCategory::Modulation,
    ];
}

nih_export_clap!(UniversalComb);
nih_export_vst3!(UniversalComb);

// AUv2 entry point for Logic Pro, wrapping the CLAP export.
clap_wrapper::export_auv2!();
