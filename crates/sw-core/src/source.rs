//! Input cursors for the resampler.
//!
//! The engines pull a ratio-dependent number of samples per block, so input
//! is read through a cursor that owns its position. Sources are `Clone`
//! because a crossfade block reads the same input twice, once per engine.

/// A stream of mono input samples.
pub trait SampleSource {
    /// Read the next sample and advance.
    fn next_sample(&mut self) -> f32;
}

/// Cursor over a slice. Reads past the end yield silence.
#[derive(Clone, Copy, Debug)]
pub struct SliceCursor<'a> {
    samples: &'a [f32],
    position: usize,
}

impl<'a> SliceCursor<'a> {
    pub fn new(samples: &'a [f32]) -> Self {
        Self { samples, position: 0 }
    }

    /// Samples read so far, including any read past the end.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Samples left before the cursor runs into silence.
    pub fn remaining(&self) -> usize {
        self.samples.len().saturating_sub(self.position)
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.samples.len()
    }
}

impl SampleSource for SliceCursor<'_> {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        let s = self.samples.get(self.position).copied().unwrap_or(0.0);
        self.position += 1;
        s
    }
}

/// Cursor that wraps back to the start of its slice.
#[derive(Clone, Copy, Debug)]
pub struct LoopCursor<'a> {
    samples: &'a [f32],
    position: usize,
    laps: u64,
}

impl<'a> LoopCursor<'a> {
    pub fn new(samples: &'a [f32]) -> Self {
        Self { samples, position: 0, laps: 0 }
    }

    /// Start at `position`, taken modulo the slice length.
    pub fn starting_at(samples: &'a [f32], position: usize) -> Self {
        let position = if samples.is_empty() { 0 } else { position % samples.len() };
        Self { samples, position, laps: 0 }
    }

    /// Index of the next sample to be read.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of times the cursor has wrapped.
    pub fn laps(&self) -> u64 {
        self.laps
    }
}

impl SampleSource for LoopCursor<'_> {
    #[inline]
    fn next_sample(&mut self) -> f32 {
        let Some(&s) = self.samples.get(self.position) else {
            return 0.0;
        };
        self.position += 1;
        if self.position == self.samples.len() {
            self.position = 0;
            self.laps += 1;
        }
        s
    }
}
