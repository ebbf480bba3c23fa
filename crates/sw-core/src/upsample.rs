//! Interpolating engine, used while `ratio <= 1`.
//!
//! Keeps the last eight input samples in a ring and evaluates the
//! windowed-sinc kernel at the current phase for every output sample.

use crate::phase::RING_SIZE;
use crate::resampler::{Resampler, BLOCK_SIZE};
use crate::source::SampleSource;

const RING_MASK: usize = RING_SIZE - 1;

impl Resampler {
    /// Produce one block with the interpolating engine. Returns input consumed.
    pub(crate) fn up16<S: SampleSource>(&mut self, src: &mut S, dst: &mut [f32; BLOCK_SIZE]) -> usize {
        let mut consumed = 0;
        let mut ix = self.phase.ring_index();

        for out in dst.iter_mut() {
            self.phase.advance(self.delta_up);
            let target = self.phase.ring_index();

            // More than one step when ratio > 1 (tolerated for slight upward shifts).
            while ix != target {
                self.input[ix] = src.next_sample();
                consumed += 1;
                ix = (ix + 1) & RING_MASK;
            }

            let row = self.phase.table_index();
            let fraction = self.phase.fraction();
            let sinc_a = self.table.row(row);
            let sinc_b = self.table.row(row + 1);

            let mut acc_a = 0.0f32;
            let mut acc_b = 0.0f32;
            for k in 0..RING_SIZE {
                let x = self.input[(ix + k) & RING_MASK];
                acc_a += x * sinc_a[k];
                acc_b += x * sinc_b[k];
            }
            *out = acc_a + (acc_b - acc_a) * fraction;
        }
        consumed
    }
}
