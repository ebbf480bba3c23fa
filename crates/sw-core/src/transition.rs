//! Crossfade blocks between the two engines.
//!
//! The old engine renders the block as usual; the new engine then renders
//! the same input from a fresh state, and the second half of the block fades
//! from one to the other. Input position going forward is the new engine's.

use crate::mode::Mode;
use crate::phase::RING_SIZE;
use crate::resampler::{Resampler, BLOCK_SIZE};
use crate::source::SampleSource;

const HALF_BLOCK: usize = BLOCK_SIZE / 2;
const FADE_STEP: f32 = 1.0 / (HALF_BLOCK as f32 + 1.0);

impl Resampler {
    pub(crate) fn up_to_down16<S>(&mut self, src: &mut S, dst: &mut [f32; BLOCK_SIZE]) -> usize
    where
        S: SampleSource + Clone,
    {
        let next_phase = self.phase.inverted();
        self.up16(&mut src.clone(), dst);

        self.mode = Mode::Down;
        self.phase = next_phase;
        self.accum = [0.0; RING_SIZE];

        let mut incoming = [0.0; BLOCK_SIZE];
        let consumed = self.down16(src, &mut incoming);
        crossfade(dst, &incoming);
        consumed
    }

    pub(crate) fn down_to_up16<S>(&mut self, src: &mut S, dst: &mut [f32; BLOCK_SIZE]) -> usize
    where
        S: SampleSource + Clone,
    {
        let next_phase = self.phase.inverted();
        self.down16(&mut src.clone(), dst);

        self.mode = Mode::Up;
        self.phase = next_phase;
        self.input = [0.0; RING_SIZE];

        let mut incoming = [0.0; BLOCK_SIZE];
        let consumed = self.up16(src, &mut incoming);
        crossfade(dst, &incoming);
        consumed
    }
}

/// Keep the first half of `outgoing`, then fade linearly toward `incoming`
/// with weights 1/9 ..= 8/9.
pub(crate) fn crossfade(outgoing: &mut [f32; BLOCK_SIZE], incoming: &[f32; BLOCK_SIZE]) {
    let mut weight = FADE_STEP;
    for (old, &new) in outgoing[HALF_BLOCK..].iter_mut().zip(&incoming[HALF_BLOCK..]) {
        *old += (new - *old) * weight;
        weight += FADE_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;
    use crate::source::SliceCursor;

    fn ramp(start: f32) -> [f32; BLOCK_SIZE] {
        core::array::from_fn(|i| start + i as f32)
    }

    #[test]
    fn first_half_is_untouched() {
        let mut out = ramp(0.0);
        crossfade(&mut out, &[100.0; BLOCK_SIZE]);
        assert_eq!(&out[..HALF_BLOCK], &ramp(0.0)[..HALF_BLOCK]);
    }

    #[test]
    fn faded_half_lies_between_the_engines() {
        let old = ramp(-8.0);
        let new = ramp(3.0).map(|v| -v);
        let mut out = old;
        crossfade(&mut out, &new);
        for i in HALF_BLOCK..BLOCK_SIZE {
            let lo = old[i].min(new[i]);
            let hi = old[i].max(new[i]);
            assert!(out[i] > lo && out[i] < hi, "sample {}: {} not in ({}, {})", i, out[i], lo, hi);
        }
    }

    #[test]
    fn weights_step_by_ninths() {
        let mut out = [0.0; BLOCK_SIZE];
        crossfade(&mut out, &[1.0; BLOCK_SIZE]);
        for (n, &w) in out[HALF_BLOCK..].iter().enumerate() {
            let expected = (n + 1) as f32 / 9.0;
            assert!((w - expected).abs() < 1e-6, "weight {}: {}", n, w);
        }
        assert!(out[BLOCK_SIZE - 1] < 1.0);
    }

    #[test]
    fn transition_inverts_entry_phase() {
        let mut r = Resampler::new();
        r.set_ratio(0.8);
        let input = [0.0f32; 256];
        let mut block = [0.0; BLOCK_SIZE];
        r.process16_slice(&input, &mut block);

        let entry = r.phase();
        r.set_ratio(1.25);
        let mut cursor = SliceCursor::new(&input);
        let consumed = r.process16(&mut cursor, &mut block);

        // The down engine restarts from the complement and runs its own block.
        let mut expected = entry.inverted();
        for _ in 0..consumed {
            expected.advance(r.delta_down());
        }
        assert_eq!(r.phase(), expected);
        assert_eq!(r.mode(), Mode::Down);
    }

    #[test]
    fn transition_returns_new_engine_consumption() {
        let input: [f32; 256] = core::array::from_fn(|i| libm::sinf(i as f32 * 0.1));

        let mut switching = Resampler::new();
        switching.set_ratio(2.0);
        let mut block = [0.0; BLOCK_SIZE];
        let consumed = switching.process16_slice(&input, &mut block);

        // Old engine from the initial state.
        let mut up = Resampler::new();
        up.set_ratio(2.0);
        let mut expected_block = [0.0; BLOCK_SIZE];
        up.up16(&mut SliceCursor::new(&input), &mut expected_block);

        // New engine from the complemented phase with empty accumulators.
        let mut down = Resampler::new();
        down.mode = Mode::Down;
        down.set_ratio(2.0);
        down.phase = Phase::default().inverted();
        let mut incoming = [0.0; BLOCK_SIZE];
        let expected = down.down16(&mut SliceCursor::new(&input), &mut incoming);

        crossfade(&mut expected_block, &incoming);
        assert_eq!(consumed, expected);
        assert_eq!(block, expected_block);
    }

    #[test]
    fn down_to_three_octaves_lower_returns() {
        let mut r = Resampler::new();
        r.set_ratio(2.0);
        let input: [f32; 256] = core::array::from_fn(|i| libm::sinf(i as f32 * 0.3));
        let mut cursor = SliceCursor::new(&input);
        let mut block = [0.0; BLOCK_SIZE];
        r.process16(&mut cursor, &mut block);
        assert_eq!(r.mode(), Mode::Down);

        // delta_down becomes exactly one ring lap for the outgoing engine.
        r.transpose(-36.0);
        assert_eq!(r.mode(), Mode::DownToUp);
        let consumed = r.process16(&mut cursor, &mut block);
        assert_eq!(r.mode(), Mode::Up);
        assert!(consumed <= 3, "consumed {}", consumed);
        assert!(block.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn down_to_up_clears_input_history() {
        let mut r = Resampler::new();
        r.set_ratio(1.5);
        let input = [1.0f32; 512];
        let mut cursor = SliceCursor::new(&input);
        let mut block = [0.0; BLOCK_SIZE];
        r.process16(&mut cursor, &mut block);
        r.process16(&mut cursor, &mut block);

        // A quarter ratio refills only half the ring from the silent source.
        r.set_ratio(0.25);
        let mut silent = SliceCursor::new(&[]);
        r.process16(&mut silent, &mut block);
        assert_eq!(r.mode(), Mode::Up);
        assert!(r.input.iter().all(|&s| s == 0.0));
    }
}
