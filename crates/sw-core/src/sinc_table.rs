//! Windowed-sinc interpolation kernel.
//!
//! 257 rows of 8 taps, one row per 1/256 of a sample period plus the closing
//! boundary row. The kernel depends only on the constants below, so a single
//! instance is shared by every resampler in the process.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
use core::f64::consts::PI;

/// Taps per table row.
pub const TAPS: usize = 8;

/// Rows in the table: 256 phases plus the boundary row at phase 1.0.
pub const TABLE_ROWS: usize = 257;

/// Sinc frequency relative to the sample rate; below 1 pulls the cutoff
/// under Nyquist.
const DILATION: f64 = 0.83;

/// Four-term cosine window, tuned so every row of the windowed kernel sums
/// to the same value.
const WINDOW: [f64; 4] = [
    0.344109006115,
    -0.508650393885,
    0.193119398005,
    -0.028578010236,
];

/// Precomputed interpolation kernel, `rows[i][k]` for phase `1 - i/256`.
#[derive(Clone, Debug)]
pub struct SincTable {
    rows: [[f32; TAPS]; TABLE_ROWS],
}

impl SincTable {
    /// Compute the kernel, normalized to unity DC gain.
    pub fn build() -> Self {
        let mut raw = [[0.0f64; TAPS]; TABLE_ROWS];
        for (i, row) in raw.iter_mut().enumerate() {
            let fraction = 1.0 - i as f64 / 256.0;
            for (k, tap) in row.iter_mut().enumerate() {
                *tap = windowed_sinc(fraction, k);
            }
        }

        // Rows share one DC gain; scale it out so both engines pass DC unchanged.
        let gain: f64 = raw[0].iter().sum();
        let mut rows = [[0.0f32; TAPS]; TABLE_ROWS];
        for (dst, src) in rows.iter_mut().zip(raw.iter()) {
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = (s / gain) as f32;
            }
        }
        Self { rows }
    }

    /// One row of taps. `index` must be in `0..TABLE_ROWS`.
    #[inline]
    pub fn row(&self, index: usize) -> &[f32; TAPS] {
        &self.rows[index]
    }

    pub fn rows(&self) -> &[[f32; TAPS]; TABLE_ROWS] {
        &self.rows
    }
}

fn windowed_sinc(fraction: f64, tap: usize) -> f64 {
    let offset = fraction - (TAPS as f64) * 0.5 + tap as f64;
    let arg = offset * PI * DILATION;
    let sinc = if arg == 0.0 { 1.0 } else { libm::sin(arg) / arg };

    let warg = (fraction + 0.5 + tap as f64) * (2.0 * PI / (TAPS as f64 + 1.0));
    let window = WINDOW[0]
        + WINDOW[1] * libm::cos(warg)
        + WINDOW[2] * libm::cos(warg * 2.0)
        + WINDOW[3] * libm::cos(warg * 3.0);

    sinc * window
}

#[cfg(feature = "std")]
static SHARED: once_cell::sync::Lazy<SincTable> = once_cell::sync::Lazy::new(SincTable::build);

#[cfg(not(feature = "std"))]
static SHARED: once_cell::race::OnceBox<SincTable> = once_cell::race::OnceBox::new();

/// The process-wide kernel, built on first call.
#[cfg(feature = "std")]
pub fn sinc_table() -> &'static SincTable {
    once_cell::sync::Lazy::force(&SHARED)
}

/// The process-wide kernel, built on first call.
///
/// Racing first callers may each build a table; only one is kept.
#[cfg(not(feature = "std"))]
pub fn sinc_table() -> &'static SincTable {
    SHARED.get_or_init(|| Box::new(SincTable::build()))
}
