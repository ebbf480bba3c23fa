//! Fixed-point phase accumulator.
//!
//! One `u32` carries three fields, read through the accessors below:
//!
//! | bits  | field                                        |
//! |-------|----------------------------------------------|
//! | 0-16  | sub-sample fraction, 1/2^17 resolution       |
//! | 17-24 | sinc table row (the engines also read row+1) |
//! | 25-27 | ring buffer slot                             |
//! | 28-31 | carry, ignored                               |
//!
//! All arithmetic wraps modulo 2^32.

/// Number of slots in the input ring and the output accumulator ring.
pub const RING_SIZE: usize = 8;

/// Phase increment that advances exactly one ring slot (ratio 1.0).
pub const UNITY_DELTA: u32 = 1 << RING_SHIFT;

const RING_SHIFT: u32 = 25;
const TABLE_SHIFT: u32 = 17;
const RING_MASK: u32 = (RING_SIZE as u32) - 1;
const TABLE_MASK: u32 = 0xFF;
const FRACTION_MASK: u32 = (1 << TABLE_SHIFT) - 1;
const FRACTION_SCALE: f32 = 1.0 / (1u32 << TABLE_SHIFT) as f32;

/// Position of the resampler within the ring buffers and the sinc table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Phase(u32);

impl Phase {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The packed 32-bit value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Ring buffer slot, in `0..RING_SIZE`.
    pub const fn ring_index(self) -> usize {
        ((self.0 >> RING_SHIFT) & RING_MASK) as usize
    }

    /// Sinc table row, in `0..=255`.
    pub const fn table_index(self) -> usize {
        ((self.0 >> TABLE_SHIFT) & TABLE_MASK) as usize
    }

    /// Interpolation weight between `table_index` and the next row, in `[0, 1)`.
    pub fn fraction(self) -> f32 {
        (self.0 & FRACTION_MASK) as f32 * FRACTION_SCALE
    }

    /// Add `delta`, wrapping at 2^32. Carries past bit 27 are lost.
    pub fn advance(&mut self, delta: u32) {
        self.0 = self.0.wrapping_add(delta);
    }

    /// Bitwise complement, `(2^32 - 1) - phase`.
    ///
    /// The two engines measure phase from opposite ends; a crossfade block
    /// starts the new engine from the mirrored position.
    pub const fn inverted(self) -> Self {
        Self(!self.0)
    }
}
