//! Engine selection state.

/// Which engine the next block runs.
///
/// `UpToDown` and `DownToUp` last exactly one block: that block crossfades
/// from the old engine to the new one and lands in the opposite steady mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Interpolating engine, for ratios up to 1.
    #[default]
    Up,
    /// Accumulating engine, for ratios from 1.
    Down,
    /// Crossfade from `Up` to `Down` on the next block.
    UpToDown,
    /// Crossfade from `Down` to `Up` on the next block.
    DownToUp,
}

impl Mode {
    /// True for the one-block crossfade states.
    pub fn is_transition(self) -> bool {
        matches!(self, Mode::UpToDown | Mode::DownToUp)
    }
}
