//! Accumulating engine, used while `ratio >= 1`.
//!
//! Each input sample is spread over the eight pending output slots through
//! the kernel, so the anti-aliasing filter runs at the input rate. A slot is
//! emitted once the phase moves past it.

use crate::phase::{RING_SIZE, UNITY_DELTA};
use crate::resampler::{Resampler, BLOCK_SIZE};
use crate::source::SampleSource;

const RING_MASK: usize = RING_SIZE - 1;

impl Resampler {
    /// Produce one block with the accumulating engine. Returns input consumed.
    pub(crate) fn down16<S: SampleSource>(&mut self, src: &mut S, dst: &mut [f32; BLOCK_SIZE]) -> usize {
        let mut consumed = 0;
        let mut written = 0;
        let mut ix = self.phase.ring_index();
        // An increment of a whole slot or more crosses a slot boundary on
        // every input, even when it laps the ring back onto the same index.
        let crosses_every_input = self.delta_down >= UNITY_DELTA;

        while written < BLOCK_SIZE {
            let row = self.phase.table_index();
            let fraction = self.phase.fraction();
            let sinc_a = self.table.row(row);
            let sinc_b = self.table.row(row + 1);

            let x = src.next_sample() * self.downscale;
            consumed += 1;
            let xb = x * fraction;
            let xa = x - xb;

            for k in 0..RING_SIZE {
                let slot = &mut self.accum[(ix + k) & RING_MASK];
                *slot += xa * sinc_a[k];
                *slot += xb * sinc_b[k];
            }

            self.phase.advance(self.delta_down);
            let next = self.phase.ring_index();
            if next != ix || crosses_every_input {
                dst[written] = self.accum[ix];
                self.accum[ix] = 0.0;
                written += 1;
                ix = next;
            }
        }
        consumed
    }
}

#[cfg(test)]
mod tests {
    use crate::resampler::{Resampler, BLOCK_SIZE};
    use crate::source::{LoopCursor, SliceCursor};

    #[test]
    fn ratio_two_consumes_two_inputs_per_output() {
        let mut r = Resampler::new();
        r.set_ratio(2.0);
        let input = [0.0f32; 128];
        let mut cursor = SliceCursor::new(&input);
        let mut block = [0.0; BLOCK_SIZE];
        assert_eq!(r.down16(&mut cursor, &mut block), 32);
        assert_eq!(r.down16(&mut cursor, &mut block), 32);
    }

    #[test]
    fn dc_passes_at_unity_gain() {
        let mut r = Resampler::new();
        r.set_ratio(2.7);
        let input = [0.25f32; 64];
        let mut cursor = LoopCursor::new(&input);
        let mut block = [0.0; BLOCK_SIZE];
        for _ in 0..4 {
            r.down16(&mut cursor, &mut block);
        }
        for s in block {
            assert!((s - 0.25).abs() < 1e-3, "{}", s);
        }
    }

    #[test]
    fn emitted_slots_are_cleared() {
        let mut r = Resampler::new();
        r.set_ratio(1.0);
        let input = [1.0f32; 16];
        let mut cursor = SliceCursor::new(&input);
        let mut block = [0.0; BLOCK_SIZE];
        r.down16(&mut cursor, &mut block);

        // One slot was just emitted and zeroed; it only gets the next input.
        let last = r.phase.ring_index();
        assert_eq!(r.accum[(last + 7) & 7], 0.0);
    }

    #[test]
    fn whole_lap_increment_still_emits() {
        // Ratio 1/8 advances exactly one ring lap per input.
        let mut r = Resampler::new();
        r.set_ratio(0.125);
        assert_eq!(r.delta_down(), 8 * crate::phase::UNITY_DELTA);
        let input = [0.5f32; 64];
        let mut cursor = SliceCursor::new(&input);
        let mut block = [0.0; BLOCK_SIZE];
        assert_eq!(r.down16(&mut cursor, &mut block), BLOCK_SIZE);
    }

    #[test]
    fn saturated_increment_reads_one_input_per_output() {
        let mut r = Resampler::new();
        r.set_ratio(1.0e-3);
        assert_eq!(r.delta_down(), u32::MAX);
        let input = [0.5f32; 64];
        let mut cursor = SliceCursor::new(&input);
        let mut block = [0.0; BLOCK_SIZE];
        assert_eq!(r.down16(&mut cursor, &mut block), BLOCK_SIZE);
        assert!(block.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn first_outputs_ramp_in_from_silence() {
        let mut r = Resampler::new();
        r.set_ratio(1.0);
        let input = [1.0f32; 64];
        let mut cursor = SliceCursor::new(&input);
        let mut block = [0.0; BLOCK_SIZE];
        r.down16(&mut cursor, &mut block);
        assert!(block[0].abs() < 0.1);
        assert!((block[15] - 1.0).abs() < 1e-4);
    }
}
