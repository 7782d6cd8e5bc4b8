//! # Delay Line (Ring Buffer) with Fractional Reads
//!
//! A delay line stores past audio samples and lets you read them back a
//! given time later. The comb filter keeps one per channel.
//!
//! ## Who Owns the Write Head?
//!
//! A stand-alone ring buffer usually carries its own write position. Here
//! it doesn't: every channel advances through the same number of samples
//! per block, and the LFO sweeps every channel identically, so one write
//! position is shared by all channels and lives in the engine. The delay
//! line is just the "tape" and the index math; the engine tells it where
//! the write head is.
//!
//! ## Read Position
//!
//! For a delay of `D` samples and a write head at `w`, the read position
//! on a ring of length `N` is
//!
//! ```text
//! read_pos = (w - D + N - READ_MARGIN) mod N
//! ```
//!
//! Adding `N` before taking the modulo keeps the value non-negative for
//! every delay the buffer can hold. [`READ_MARGIN`] holds the read head a
//! few samples further back so that at the longest delay it can never
//! collide with, or overtake, the write head. The effective delay is
//! therefore `D + READ_MARGIN` samples.
//!
//! ## Interpolation
//!
//! The delay time is swept continuously by the LFO, so `read_pos` is
//! almost never a whole number. Reading the nearest slot would make the
//! delay jump in whole-sample steps ("zipper noise"). Instead two (linear)
//! or four (cubic) neighbouring slots are blended:
//!
//! ```text
//! linear = buffer[prev] * (1 - frac) + buffer[next] * frac
//! ```

use std::num::NonZeroUsize;

use nih_plug::prelude::Enum;

/// How many samples the read head is held back behind the requested delay.
pub const READ_MARGIN: usize = 3;

/// The fractional-read scheme used when the read head falls between two
/// stored samples.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Two-point blend. Cheap and the reference behaviour.
    #[id = "linear"]
    Linear,
    /// Four-point Catmull-Rom spline through the two samples on either side
    /// of the read head. Smoother at high sweep rates.
    #[id = "cubic"]
    Cubic,
}

impl Default for Interpolation {
    fn default() -> Self {
        Self::Linear
    }
}

/// One channel's ring of past "pre-output" samples.
///
/// Allocated once per configuration; reads and writes never allocate.
pub struct DelayLine {
    /// The circular buffer. All values start at 0.0 (silence).
    buffer: Vec<f32>,
}

impl DelayLine {
    /// Create a silent delay line holding `len` samples.
    pub fn new(len: NonZeroUsize) -> Self {
        Self {
            buffer: vec![0.0; len.get()],
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Continuous read position for a delay of `delay_samples`, given the
    /// shared write position.
    ///
    /// The result is in `[0, len)`. Delays longer than the buffer wrap
    /// around instead of indexing out of bounds; that is acoustically wrong
    /// but memory safe, and configuration keeps the parameter range inside
    /// the buffer.
    #[inline]
    pub fn read_position(&self, write_pos: usize, delay_samples: f32) -> f32 {
        let len = self.buffer.len() as f32;
        (write_pos as f32 - delay_samples + len - READ_MARGIN as f32).rem_euclid(len)
    }

    /// Read the buffer at a fractional position.
    #[inline]
    pub fn read(&self, read_pos: f32, interpolation: Interpolation) -> f32 {
        match interpolation {
            Interpolation::Linear => self.read_linear(read_pos),
            Interpolation::Cubic => self.read_cubic(read_pos),
        }
    }

    /// Two-point linear interpolation between `floor(read_pos)` and the
    /// slot after it.
    #[inline]
    pub fn read_linear(&self, read_pos: f32) -> f32 {
        let len = self.buffer.len();
        let (prev, frac) = self.split(read_pos);
        let next = (prev + 1) % len;

        (1.0 - frac) * self.buffer[prev] + frac * self.buffer[next]
    }

    /// Four-point Catmull-Rom interpolation over the slots at
    /// `prev - 1`, `prev`, `prev + 1` and `prev + 2`.
    ///
    /// Passes exactly through the stored samples at whole positions, like
    /// the linear read.
    #[inline]
    pub fn read_cubic(&self, read_pos: f32) -> f32 {
        let len = self.buffer.len();
        let (prev, t) = self.split(read_pos);
        let prev_prev = (prev + len - 1) % len;
        let next = (prev + 1) % len;
        let next_next = (prev + 2) % len;

        let p0 = self.buffer[prev_prev];
        let p1 = self.buffer[prev];
        let p2 = self.buffer[next];
        let p3 = self.buffer[next_next];

        let t2 = t * t;
        let t3 = t2 * t;
        0.5 * ((2.0 * p1)
            + (-p0 + p2) * t
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
            + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
    }

    /// Store `sample` at `write_pos` (reduced modulo the buffer length).
    #[inline]
    pub fn write(&mut self, write_pos: usize, sample: f32) {
        let len = self.buffer.len();
        self.buffer[write_pos % len] = sample;
    }

    /// Silence the whole buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }

    /// Split a read position into its slot index and fractional part.
    ///
    /// The index is reduced modulo the length once more because a
    /// position a hair below `len` can round up to `len` in `f32`.
    #[inline]
    fn split(&self, read_pos: f32) -> (usize, f32) {
        let floor = read_pos.floor();
        let frac = read_pos - floor;
        ((floor as usize) % self.buffer.len(), frac)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
