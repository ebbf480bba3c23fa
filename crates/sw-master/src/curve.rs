//! Pitch curves: what ratio the resampler runs at, block by block.

use sw_core::Resampler;

/// A pitch setting applied before a block is rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Control {
    /// Input samples consumed per output sample.
    Ratio(f32),
    /// Transposition in semitones, `ratio = 2^(s/12)`.
    Semitones(f32),
}

impl Control {
    pub fn apply(self, resampler: &mut Resampler) {
        match self {
            Control::Ratio(ratio) => resampler.set_ratio(ratio),
            Control::Semitones(semitones) => resampler.transpose(semitones),
        }
    }
}

/// Source of pitch changes for a render.
///
/// Called once per 16-sample block, in order, with the index of the first
/// output sample of that block. `None` leaves the resampler as it is.
pub trait PitchCurve {
    fn ratio_at(&mut self, position: usize) -> Option<Control>;
}

impl<C: PitchCurve + ?Sized> PitchCurve for &mut C {
    fn ratio_at(&mut self, position: usize) -> Option<Control> {
        (**self).ratio_at(position)
    }
}

impl<C: PitchCurve + ?Sized> PitchCurve for Box<C> {
    fn ratio_at(&mut self, position: usize) -> Option<Control> {
        (**self).ratio_at(position)
    }
}

/// Holds one setting for the whole render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedPitch(pub Control);

impl FixedPitch {
    pub fn semitones(semitones: f32) -> Self {
        Self(Control::Semitones(semitones))
    }

    pub fn ratio(ratio: f32) -> Self {
        Self(Control::Ratio(ratio))
    }
}

impl PitchCurve for FixedPitch {
    fn ratio_at(&mut self, position: usize) -> Option<Control> {
        (position == 0).then_some(self.0)
    }
}

/// Semitones above the base for each melody step.
pub const MELODY: [i32; 17] = [0, 0, 0, 0, 4, 7, 11, 9, 7, 4, 0, 2, 5, 9, 12, 11, 11];

const SWEEP_START: f32 = -24.0;
/// Semitones per output sample during the sweep (3 * 2^-15).
const SWEEP_SLOPE: f32 = 3.0 / 32768.0;
/// Semitones dropped per block once the melody is over (2^-9).
const DESCENT: f32 = 1.0 / 512.0;
/// Held above the descending base after the melody.
const TAIL_INTERVAL: f32 = 11.0;

/// The demonstration program.
///
/// The first half of `length` sweeps upward from -24 semitones. The second
/// half plays [`MELODY`] on top of wherever the sweep ended, one step per
/// `length / 256` samples, then slides the base down while holding a
/// major seventh.
#[derive(Clone, Debug)]
pub struct DemoCurve {
    length: usize,
    base: f32,
}

impl DemoCurve {
    pub fn new(length: usize) -> Self {
        Self { length, base: SWEEP_START }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    fn step_len(&self) -> usize {
        (self.length >> 8).max(1)
    }
}

impl PitchCurve for DemoCurve {
    fn ratio_at(&mut self, position: usize) -> Option<Control> {
        let half = self.length / 2;
        if position < half {
            self.base = position as f32 * SWEEP_SLOPE + SWEEP_START;
            return Some(Control::Semitones(self.base));
        }

        let step = (position - half) / self.step_len();
        match MELODY.get(step) {
            Some(&interval) => Some(Control::Semitones(self.base + interval as f32)),
            None => {
                self.base -= DESCENT;
                Some(Control::Semitones(self.base + TAIL_INTERVAL))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sw_core::{semitones_to_ratio, BLOCK_SIZE};

    fn semitones(c: Option<Control>) -> f32 {
        match c {
            Some(Control::Semitones(s)) => s,
            other => panic!("expected semitones, got {:?}", other),
        }
    }

    /// Run the curve over every block and collect the settings.
    fn trace(curve: &mut DemoCurve) -> Vec<f32> {
        (0..curve.length())
            .step_by(BLOCK_SIZE)
            .map(|i| semitones(curve.ratio_at(i)))
            .collect()
    }

    #[test]
    fn control_applies_to_resampler() {
        let mut r = Resampler::new();
        Control::Ratio(1.5).apply(&mut r);
        assert_eq!(r.ratio(), 1.5);
        Control::Semitones(-12.0).apply(&mut r);
        assert_relative_eq!(r.ratio(), 0.5);
    }

    #[test]
    fn fixed_pitch_sets_once() {
        let mut fixed = FixedPitch::semitones(7.0);
        assert_eq!(fixed.ratio_at(0), Some(Control::Semitones(7.0)));
        assert_eq!(fixed.ratio_at(16), None);
        assert_eq!(fixed.ratio_at(4096), None);
        assert_eq!(FixedPitch::ratio(0.75).ratio_at(0), Some(Control::Ratio(0.75)));
    }

    #[test]
    fn sweep_starts_two_octaves_down() {
        let mut demo = DemoCurve::new(0x200000);
        assert_eq!(semitones(demo.ratio_at(0)), -24.0);
        assert_relative_eq!(semitones_to_ratio(-24.0), 0.25);
    }

    #[test]
    fn sweep_is_linear_in_position() {
        let mut demo = DemoCurve::new(0x200000);
        assert_relative_eq!(semitones(demo.ratio_at(32768)), -21.0);
        assert_relative_eq!(semitones(demo.ratio_at(0x80000)), 24.0);
    }

    #[test]
    fn sweep_end_reaches_six_octaves() {
        let mut demo = DemoCurve::new(0x200000);
        let last = 0x100000 - BLOCK_SIZE;
        let end = semitones(demo.ratio_at(last));
        assert_relative_eq!(end, last as f32 * 3.0 / 32768.0 - 24.0);
        assert!(end > 71.99 && end < 72.0);
    }

    #[test]
    fn melody_rides_on_sweep_end() {
        // 4096 samples: each melody step is exactly one block.
        let mut demo = DemoCurve::new(4096);
        let settings = trace(&mut demo);
        let half_blocks = 2048 / BLOCK_SIZE;
        let end = settings[half_blocks - 1];

        for (step, &interval) in MELODY.iter().enumerate() {
            assert_eq!(settings[half_blocks + step], end + interval as f32, "step {}", step);
        }
    }

    #[test]
    fn melody_steps_last_length_over_256() {
        let mut demo = DemoCurve::new(0x10000);
        let settings = trace(&mut demo);
        let half_blocks = 0x8000 / BLOCK_SIZE;
        let blocks_per_step = (0x10000 >> 8) / BLOCK_SIZE;
        let end = settings[half_blocks - 1];

        // Step 6 (+11) spans blocks_per_step blocks and then drops to step 7 (+9).
        let step6 = half_blocks + 6 * blocks_per_step;
        for b in step6..step6 + blocks_per_step {
            assert_eq!(settings[b], end + 11.0);
        }
        assert_eq!(settings[step6 + blocks_per_step], end + 9.0);
    }

    #[test]
    fn tail_descends_under_held_seventh() {
        let mut demo = DemoCurve::new(4096);
        let settings = trace(&mut demo);
        let half_blocks = 2048 / BLOCK_SIZE;
        let end = settings[half_blocks - 1];
        let tail = &settings[half_blocks + MELODY.len()..];

        assert!(!tail.is_empty());
        for (n, &s) in tail.iter().enumerate() {
            let expected = end - (n + 1) as f32 / 512.0 + 11.0;
            assert_relative_eq!(s, expected, epsilon = 1e-4);
        }
        assert!(tail.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn boxed_curve_forwards() {
        let mut curve: Box<dyn PitchCurve> = Box::new(FixedPitch::ratio(2.0));
        assert_eq!(curve.ratio_at(0), Some(Control::Ratio(2.0)));
    }
}
