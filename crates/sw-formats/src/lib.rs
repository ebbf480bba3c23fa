//! File formats for shiftwave.
//!
//! Decodes WAV files of any common sample encoding into flat mono `f32`
//! buffers, and writes mono `f32` buffers back out.

mod wav_format;

pub use wav_format::{load_wav, load_wav_file, samples_to_wav, write_wav, WavData};

/// Error type for format parsing.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid file header or magic bytes
    #[error("not a RIFF/WAVE file")]
    InvalidHeader,
    /// Unexpected end of file
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// A required chunk never appeared
    #[error("missing '{0}' chunk")]
    MissingChunk(&'static str),
    /// Sample encoding we cannot decode
    #[error("unsupported encoding: format tag {format_tag:#06x}, {bits_per_sample} bits")]
    UnsupportedFormat { format_tag: u16, bits_per_sample: u16 },
    /// A chunk body did not match its declared layout
    #[error("malformed chunk: {0}")]
    Parse(#[from] binrw::Error),
}

impl FormatError {
    /// Negative status code for command-line drivers.
    pub fn code(&self) -> i32 {
        match self {
            FormatError::Io(_) => -1,
            FormatError::InvalidHeader | FormatError::UnexpectedEof | FormatError::Parse(_) => -2,
            FormatError::MissingChunk(_) => -3,
            FormatError::UnsupportedFormat { .. } => -4,
        }
    }
}
