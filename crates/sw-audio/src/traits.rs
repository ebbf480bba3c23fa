//! Audio output trait and error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("device init error: {0}")]
    DeviceInit(String),
    #[error("stream create error: {0}")]
    StreamCreate(String),
    #[error("playback error: {0}")]
    Playback(String),
}

/// Sink for mono output samples.
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;

    /// Queue samples without blocking. Returns how many were accepted.
    fn write(&mut self, samples: &[f32]) -> usize;

    fn start(&mut self) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;
}
