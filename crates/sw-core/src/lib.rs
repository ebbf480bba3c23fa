//! Two-mode windowed-sinc resampler for shiftwave.
//!
//! Converts a mono stream at one rate into a stream at another rate, with
//! the ratio adjustable between blocks. Ratios at or below 1 run through an
//! interpolating engine, ratios at or above 1 through an accumulating
//! (anti-aliasing) engine, and crossing 1.0 blends the two over one block.
//!
//! Processing never allocates, locks or blocks, so a [`Resampler`] can run
//! directly inside an audio callback.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod downsample;
mod mode;
mod phase;
mod resampler;
mod sinc_table;
mod source;
mod transition;
mod upsample;

pub use mode::Mode;
pub use phase::{Phase, RING_SIZE, UNITY_DELTA};
pub use resampler::{semitones_to_ratio, Resampler, BLOCK_SIZE};
pub use sinc_table::{sinc_table, SincTable, TABLE_ROWS, TAPS};
pub use source::{LoopCursor, SampleSource, SliceCursor};
