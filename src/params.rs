//! # Plugin Parameters
//!
//! The knobs the host sees. IDs (`#[id = "..."]`) are what presets and
//! automation lanes are keyed on, so they must never change once
//! published.
//!
//! ## No Smoothing
//!
//! None of these parameters carry a smoother. The comb engine reads every
//! value fresh, once per sample, and the delay time is already swept
//! continuously by the LFO and read with interpolation. The engine only
//! sees them through [`ParameterSource`], which reads each parameter's
//! current plain value.
//!
//! ## Units
//!
//! Delay times are stored in seconds, which is what the engine wants, but
//! shown and typed in milliseconds, which is what people think in.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::delay_line::Interpolation;
use crate::dsp::engine::ParameterSource;

/// All user-facing parameters of the comb filter.
#[derive(Params)]
pub struct CombParams {
    /// **Minimum Delay** — the shortest delay the LFO sweeps from.
    ///
    /// Short settings (under ~15 ms) give flanging and comb colouration;
    /// longer ones turn into discrete echoes.
    ///
    /// Range: 0 to 0.5 s. Default: 0 s.
    #[id = "delay"]
    pub delay: FloatParam,

    /// **Sweep Width** — how far above the minimum the LFO pushes the
    /// delay at the top of its cycle.
    ///
    /// Range: 0 to 0.05 s. Default: 0.002 s.
    #[id = "sweepwidth"]
    pub sweep_width: FloatParam,

    /// **LFO Frequency** — how fast the sweep (and tremolo) cycles.
    ///
    /// At 0 Hz the LFO drifts back to the start of its cycle and stays
    /// there. Range: 0 to 250 Hz. Default: 0.5 Hz.
    #[id = "lfofreq"]
    pub lfo_freq: FloatParam,

    /// **Bleed** — how much of the pre-output signal (input plus feedback)
    /// goes straight to the output.
    #[id = "bleed"]
    pub bleed: FloatParam,

    /// **Feedforward** — how much of the delayed signal goes to the
    /// output without re-entering the delay line.
    #[id = "feedforward"]
    pub feedforward: FloatParam,

    /// **Feedback** — how much of the delayed signal is added back into
    /// the delay line's input.
    #[id = "feedback"]
    pub feedback: FloatParam,

    /// **Tremolo** — when on, the output is amplitude modulated by the same
    /// LFO that sweeps the delay.
    #[id = "tremolo"]
    pub tremolo: BoolParam,

    /// **Interpolation** — how the delay line is read between samples.
    #[id = "interp"]
    pub interpolation: EnumParam<Interpolation>,
}

impl Default for CombParams {
    fn default() -> Self {
        Self {
            delay: FloatParam::new(
                "Minimum Delay",
                0.0,
                FloatRange::Linear { min: 0.0, max: 0.5 },
            )
            .with_unit(" ms")
            // 1 ms steps
            .with_step_size(0.001)
            .with_value_to_string(v2s_seconds_as_ms(0))
            .with_string_to_value(s2v_ms_as_seconds()),

            sweep_width: FloatParam::new(
                "Sweep Width",
                0.002,
                FloatRange::Linear {
                    min: 0.0,
                    max: 0.05,
                },
            )
            .with_unit(" ms")
            // 0.01 ms steps
            .with_step_size(0.000_01)
            .with_value_to_string(v2s_seconds_as_ms(2))
            .with_string_to_value(s2v_ms_as_seconds()),

            lfo_freq: FloatParam::new(
                "LFO Frequency",
                0.5,
                FloatRange::Skewed {
                    min: 0.0,
                    max: 250.0,
                    // Most musical rates live under 10 Hz.
                    factor: FloatRange::skew_factor(-2.0),
                },
            )
            .with_unit(" Hz")
            .with_step_size(0.01),

            bleed: gain_param("Bleed", 0.7),
            feedforward: gain_param("Feedforward", 0.7),
            feedback: gain_param("Feedback", 0.7),

            tremolo: BoolParam::new("Tremolo", false),

            interpolation: EnumParam::new("Interpolation", Interpolation::Linear),
        }
    }
}

/// A 0..1 mix gain, shown as a percentage.
fn gain_param(name: &str, default: f32) -> FloatParam {
    FloatParam::new(name, default, FloatRange::Linear { min: 0.0, max: 1.0 })
        .with_unit("%")
        .with_step_size(0.01)
        .with_value_to_string(formatters::v2s_f32_percentage(0))
        .with_string_to_value(formatters::s2v_f32_percentage())
}

/// Display a value stored in seconds as milliseconds.
fn v2s_seconds_as_ms(digits: usize) -> Arc<dyn Fn(f32) -> String + Send + Sync> {
    Arc::new(move |seconds| format!("{:.digits$}", seconds * 1000.0))
}

/// Parse milliseconds typed by the user back into seconds. Accepts a
/// trailing "ms".
fn s2v_ms_as_seconds() -> Arc<dyn Fn(&str) -> Option<f32> + Send + Sync> {
    Arc::new(|string| {
        let trimmed = string.trim();
        let number = trimmed.strip_suffix("ms").unwrap_or(trimmed);
        number.trim().parse::<f32>().ok().map(|ms| ms / 1000.0)
    })
}

impl ParameterSource for CombParams {
    fn min_delay(&self) -> f32 {
        self.delay.value()
    }

    fn sweep_width(&self) -> f32 {
        self.sweep_width.value()
    }

    fn lfo_frequency(&self) -> f32 {
        self.lfo_freq.value()
    }

    fn bleed(&self) -> f32 {
        self.bleed.value()
    }

    fn feedforward(&self) -> f32 {
        self.feedforward.value()
    }

    fn feedback(&self) -> f32 {
        self.feedback.value()
    }

    fn tremolo(&self) -> bool {
        self.tremolo.value()
    }

    fn interpolation(&self) -> Interpolation {
        self.interpolation.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::engine::ParameterSnapshot;

    /// The host-facing defaults are the engine's defaults.
    #[test]
    fn test_defaults_match_snapshot() {
        let captured = ParameterSnapshot::capture(&CombParams::default());
        let expected = ParameterSnapshot::default();

        let pairs = [
            (captured.min_delay, expected.min_delay),
            (captured.sweep_width, expected.sweep_width),
            (captured.lfo_frequency, expected.lfo_frequency),
            (captured.bleed, expected.bleed),
            (captured.feedforward, expected.feedforward),
            (captured.feedback, expected.feedback),
        ];
        for (actual, wanted) in pairs {
            assert!((actual - wanted).abs() < 1e-6, "Expected {wanted}, got {actual}");
        }
        assert_eq!(captured.tremolo, expected.tremolo);
        assert_eq!(captured.interpolation, expected.interpolation);
    }

    /// Every range tops out where the delay buffer sizing expects it to.
    #[test]
    fn test_ranges() {
        let params = CombParams::default();

        let ranges = [
            (&params.delay, 0.5),
            (&params.sweep_width, 0.05),
            (&params.lfo_freq, 250.0),
            (&params.bleed, 1.0),
            (&params.feedforward, 1.0),
            (&params.feedback, 1.0),
        ];
        for (param, max) in ranges {
            assert!(param.preview_plain(0.0).abs() < 1e-6, "{} min", param.name());
            assert!(
                (param.preview_plain(1.0) - max).abs() < 1e-6,
                "{} max",
                param.name()
            );
        }

        // The longest possible delay fits in the 0.55 s buffer.
        let longest = params.delay.preview_plain(1.0) + params.sweep_width.preview_plain(1.0);
        assert!(longest <= 0.55, "got {longest}");
    }

    #[test]
    fn test_ms_formatting() {
        let to_string = v2s_seconds_as_ms(2);
        assert_eq!(to_string(0.0125), "12.50");

        let to_value = s2v_ms_as_seconds();
        let parsed = to_value(" 12.5 ms").unwrap();
        assert!((parsed - 0.0125).abs() < 1e-6, "got {parsed}");
        assert!(to_value("fast").is_none());
    }
}
