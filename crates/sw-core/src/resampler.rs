//! Resampler state, ratio control and block dispatch.

use crate::mode::Mode;
use crate::phase::{Phase, RING_SIZE, UNITY_DELTA};
use crate::sinc_table::{sinc_table, SincTable};
use crate::source::{SampleSource, SliceCursor};

/// Output samples produced per call to [`Resampler::process16`].
pub const BLOCK_SIZE: usize = 16;

/// `UNITY_DELTA` as a float, for converting ratios to phase increments.
const UNITY_DELTA_F32: f32 = UNITY_DELTA as f32;

/// Convert a transposition in semitones to a rate ratio.
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    libm::exp2f(semitones / 12.0)
}

/// Real-time mono pitch shifter.
///
/// `ratio` is the number of input samples consumed per output sample:
/// above 1 raises the pitch, below 1 lowers it.
#[derive(Clone, Debug)]
pub struct Resampler {
    pub(crate) ratio: f32,
    /// `1 / ratio`, applied to every input sample by the down engine.
    pub(crate) downscale: f32,
    pub(crate) phase: Phase,
    /// Phase increment per output sample (up engine).
    pub(crate) delta_up: u32,
    /// Phase increment per input sample (down engine).
    pub(crate) delta_down: u32,
    pub(crate) mode: Mode,
    /// Recent input samples, oldest at `phase.ring_index()`.
    pub(crate) input: [f32; RING_SIZE],
    /// Output sums still collecting contributions.
    pub(crate) accum: [f32; RING_SIZE],
    pub(crate) table: &'static SincTable,
}

impl Resampler {
    /// Identity ratio, interpolating mode, silent history.
    pub fn new() -> Self {
        let mut resampler = Self {
            ratio: 1.0,
            downscale: 1.0,
            phase: Phase::default(),
            delta_up: UNITY_DELTA,
            delta_down: UNITY_DELTA,
            mode: Mode::Up,
            input: [0.0; RING_SIZE],
            accum: [0.0; RING_SIZE],
            table: sinc_table(),
        };
        resampler.set_ratio(1.0);
        resampler
    }

    // --- Ratio control ---

    /// Shift pitch by `semitones` (12 per octave).
    pub fn transpose(&mut self, semitones: f32) {
        self.set_ratio(semitones_to_ratio(semitones));
    }

    /// Set the input/output rate ratio, effective from the next block.
    ///
    /// `ratio` must be positive; it is not validated. Crossing 1.0 from a
    /// steady mode schedules a crossfade block.
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio;
        self.downscale = 1.0 / ratio;
        self.delta_up = (UNITY_DELTA_F32 * ratio) as u32;
        // At least one, so the down engine always moves.
        self.delta_down = ((UNITY_DELTA_F32 / ratio) as u32).max(1);

        if self.delta_down > UNITY_DELTA && self.mode == Mode::Down {
            self.mode = Mode::DownToUp;
        }
        if self.delta_up > UNITY_DELTA && self.mode == Mode::Up {
            self.mode = Mode::UpToDown;
        }
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn delta_up(&self) -> u32 {
        self.delta_up
    }

    pub fn delta_down(&self) -> u32 {
        self.delta_down
    }

    // --- Processing ---

    /// Produce one block of output, pulling as much input as the ratio needs.
    ///
    /// Returns the number of samples taken from `src`. On average this is
    /// `BLOCK_SIZE * ratio`; the exact count depends on the phase.
    pub fn process16<S>(&mut self, src: &mut S, dst: &mut [f32; BLOCK_SIZE]) -> usize
    where
        S: SampleSource + Clone,
    {
        match self.mode {
            Mode::Up => self.up16(src, dst),
            Mode::Down => self.down16(src, dst),
            Mode::UpToDown => self.up_to_down16(src, dst),
            Mode::DownToUp => self.down_to_up16(src, dst),
        }
    }

    /// [`process16`](Self::process16) over a plain slice. Input past the
    /// end of `src` reads as silence.
    pub fn process16_slice(&mut self, src: &[f32], dst: &mut [f32; BLOCK_SIZE]) -> usize {
        let mut cursor = SliceCursor::new(src);
        self.process16(&mut cursor, dst)
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::new()
    }
}
