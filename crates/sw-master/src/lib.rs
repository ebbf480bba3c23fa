//! Headless controller for shiftwave.
//!
//! Owns a looped mono source and drives a [`Resampler`] through a
//! [`PitchCurve`], either offline into a buffer or WAV, or in real time on
//! the default audio device.

mod curve;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use sw_audio::{AudioOutput, CpalOutput};
use sw_core::{LoopCursor, Resampler, BLOCK_SIZE};
use tracing::{debug, info, warn};

pub use curve::{Control, DemoCurve, FixedPitch, PitchCurve, MELODY};
pub use sw_formats::{samples_to_wav, write_wav, FormatError, WavData};

/// Counters gathered during an offline render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub blocks: usize,
    /// Blocks rendered as a crossfade between engines.
    pub transitions: usize,
    /// Input samples read, including wraps of the loop.
    pub consumed: usize,
}

/// Looped source plus playback state.
pub struct Controller {
    source: Arc<[f32]>,
    source_rate: u32,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    position: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Controller {
    pub fn new(source: Vec<f32>, source_rate: u32) -> Self {
        Self {
            source: source.into(),
            source_rate,
            playback: None,
        }
    }

    /// Decode a WAV file and use its first channel as the source.
    pub fn from_wav_bytes(data: &[u8]) -> Result<Self, FormatError> {
        let wav = sw_formats::load_wav(data)?;
        info!(
            samples = wav.samples.len(),
            rate = wav.sample_rate,
            channels = wav.channels,
            bits = wav.bits_per_sample,
            "loaded source"
        );
        Ok(Self::new(wav.samples, wav.sample_rate))
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    pub fn source_rate(&self) -> u32 {
        self.source_rate
    }

    // --- Offline rendering ---

    pub fn render<C: PitchCurve>(&self, curve: C, num_samples: usize) -> Vec<f32> {
        self.render_with_stats(curve, num_samples).0
    }

    /// Render exactly `num_samples` outputs, looping the source as needed.
    pub fn render_with_stats<C: PitchCurve>(
        &self,
        mut curve: C,
        num_samples: usize,
    ) -> (Vec<f32>, RenderStats) {
        let mut resampler = Resampler::new();
        let mut cursor = LoopCursor::new(&self.source);
        let mut stats = RenderStats::default();
        let mut out = Vec::with_capacity(num_samples);
        let mut block = [0.0; BLOCK_SIZE];

        info!(num_samples, source = self.source.len(), "rendering");
        while out.len() < num_samples {
            if let Some(control) = curve.ratio_at(out.len()) {
                control.apply(&mut resampler);
            }
            if resampler.mode().is_transition() {
                debug!(position = out.len(), mode = ?resampler.mode(), ratio = resampler.ratio(), "crossfade");
                stats.transitions += 1;
            }

            stats.consumed += resampler.process16(&mut cursor, &mut block);
            stats.blocks += 1;

            let take = (num_samples - out.len()).min(BLOCK_SIZE);
            out.extend_from_slice(&block[..take]);
        }
        info!(
            blocks = stats.blocks,
            transitions = stats.transitions,
            consumed = stats.consumed,
            laps = cursor.laps(),
            "render complete"
        );
        (out, stats)
    }

    /// Render and encode as a mono float WAV. Fails only when the length
    /// or rate overflows the header fields.
    pub fn render_to_wav<C: PitchCurve>(
        &self,
        curve: C,
        num_samples: usize,
        sample_rate: u32,
    ) -> std::io::Result<Vec<u8>> {
        samples_to_wav(&self.render(curve, num_samples), sample_rate)
    }

    // --- Real-time playback ---

    /// Start streaming `num_samples` outputs to the default device on a
    /// background thread. Any previous playback is stopped first.
    pub fn play<C>(&mut self, curve: C, num_samples: usize)
    where
        C: PitchCurve + Send + 'static,
    {
        self.stop();

        let source = self.source.clone();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let position = Arc::new(AtomicU64::new(0));
        let finished = Arc::new(AtomicBool::new(false));

        let stop = stop_signal.clone();
        let pos = position.clone();
        let done = finished.clone();

        info!(num_samples, "starting playback");
        let thread = std::thread::spawn(move || {
            audio_thread(source, curve, num_samples, stop, pos, done);
        });

        self.playback = Some(PlaybackHandle {
            stop_signal,
            position,
            finished,
            thread: Some(thread),
        });
    }

    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                if handle.join().is_err() {
                    warn!("playback thread panicked");
                }
            }
            info!("playback stopped");
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    pub fn is_finished(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| p.finished.load(Ordering::Relaxed))
    }

    /// Output samples queued so far, or `None` when nothing is playing.
    pub fn position(&self) -> Option<u64> {
        let pb = self.playback.as_ref()?;
        if pb.finished.load(Ordering::Relaxed) {
            return None;
        }
        Some(pb.position.load(Ordering::Relaxed))
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn audio_thread<C: PitchCurve>(
    source: Arc<[f32]>,
    mut curve: C,
    num_samples: usize,
    stop_signal: Arc<AtomicBool>,
    position: Arc<AtomicU64>,
    finished: Arc<AtomicBool>,
) {
    let (mut output, consumer) = match CpalOutput::new() {
        Ok(pair) => pair,
        Err(err) => {
            warn!(%err, "no audio output");
            finished.store(true, Ordering::Relaxed);
            return;
        }
    };
    if let Err(err) = output.build_stream(consumer).and_then(|()| output.start()) {
        warn!(%err, "could not start audio stream");
        finished.store(true, Ordering::Relaxed);
        return;
    }

    let sample_rate = output.sample_rate();
    let mut resampler = Resampler::new();
    let mut cursor = LoopCursor::new(&source);
    let mut block = [0.0; BLOCK_SIZE];
    let mut written = 0;

    while written < num_samples && !stop_signal.load(Ordering::Relaxed) {
        if let Some(control) = curve.ratio_at(written) {
            control.apply(&mut resampler);
        }
        render_block(&mut resampler, &mut cursor, &mut block);

        let take = (num_samples - written).min(BLOCK_SIZE);
        for &sample in &block[..take] {
            output.write_spin(sample);
        }
        written += take;
        position.store(written as u64, Ordering::Relaxed);
    }

    // Let the device drain before the stream is dropped.
    for _ in 0..sample_rate / 10 {
        output.write_spin(0.0);
    }
    if let Err(err) = output.stop() {
        warn!(%err, "could not stop audio stream");
    }
    finished.store(true, Ordering::Relaxed);
}

#[cfg(feature = "alloc_check")]
fn render_block(resampler: &mut Resampler, cursor: &mut LoopCursor<'_>, block: &mut [f32; BLOCK_SIZE]) {
    assert_no_alloc::assert_no_alloc(|| {
        resampler.process16(cursor, block);
    });
}

#[cfg(not(feature = "alloc_check"))]
fn render_block(resampler: &mut Resampler, cursor: &mut LoopCursor<'_>, block: &mut [f32; BLOCK_SIZE]) {
    resampler.process16(cursor, block);
}
