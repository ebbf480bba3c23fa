//! WAV encoding and decoding.

use crate::FormatError;
use binrw::{BinRead, BinReaderExt};
use std::io::{Cursor, Write};
use std::path::Path;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

// --- Writing ---

/// Header length of the files written here.
const HEADER_LEN: usize = 44;

/// Write `samples` as a mono 32-bit float WAV stream.
///
/// Fails with `InvalidInput` when the sample count or rate does not fit the
/// 32-bit size fields of the header.
pub fn write_wav(w: &mut impl Write, samples: &[f32], sample_rate: u32) -> std::io::Result<()> {
    w.write_all(&float_mono_header(samples.len(), sample_rate)?)?;
    for s in samples {
        w.write_all(&s.to_le_bytes())?;
    }
    Ok(())
}

pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(HEADER_LEN + samples.len() * 4);
    write_wav(&mut buf, samples, sample_rate)?;
    Ok(buf)
}

/// RIFF header, 16-byte `fmt ` chunk and `data` chunk header.
fn float_mono_header(num_samples: usize, sample_rate: u32) -> std::io::Result<[u8; HEADER_LEN]> {
    const BLOCK_ALIGN: u16 = 4;
    let too_large = |what: &str| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{what} too large for a WAV header"))
    };

    let data_size = u32::try_from(num_samples)
        .ok()
        .and_then(|n| n.checked_mul(BLOCK_ALIGN as u32))
        .filter(|size| size.checked_add(36).is_some())
        .ok_or_else(|| too_large("sample count"))?;
    let byte_rate = sample_rate
        .checked_mul(BLOCK_ALIGN as u32)
        .ok_or_else(|| too_large("sample rate"))?;

    let mut header = [0u8; HEADER_LEN];
    let fields: [(usize, &[u8]); 13] = [
        (0, b"RIFF"),
        (4, &(36 + data_size).to_le_bytes()),
        (8, b"WAVE"),
        (12, b"fmt "),
        (16, &16u32.to_le_bytes()),
        (20, &FORMAT_IEEE_FLOAT.to_le_bytes()),
        (22, &1u16.to_le_bytes()),
        (24, &sample_rate.to_le_bytes()),
        (28, &byte_rate.to_le_bytes()),
        (32, &BLOCK_ALIGN.to_le_bytes()),
        (34, &32u16.to_le_bytes()),
        (36, b"data"),
        (40, &data_size.to_le_bytes()),
    ];
    for (offset, bytes) in fields {
        header[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
    Ok(header)
}

// --- Reading ---

/// Decoded first channel of a WAV file.
#[derive(Clone, Debug, PartialEq)]
pub struct WavData {
    /// First-channel samples, normalized to roughly [-1, 1]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Channels in the file (only the first is decoded)
    pub channels: u16,
    pub bits_per_sample: u16,
}

/// Read and decode a WAV file from disk.
pub fn load_wav_file(path: impl AsRef<Path>) -> Result<WavData, FormatError> {
    let data = std::fs::read(path)?;
    load_wav(&data)
}

/// Decode the first channel of a WAV file held in memory.
pub fn load_wav(data: &[u8]) -> Result<WavData, FormatError> {
    let header = parse_header(data)?;
    let end = (header.data_offset + header.data_size).min(data.len());
    let samples = decode_first_channel(&data[header.data_offset..end], &header)?;

    Ok(WavData {
        samples,
        sample_rate: header.fmt.sample_rate,
        channels: header.fmt.channels,
        bits_per_sample: header.fmt.bits_per_sample,
    })
}

#[derive(BinRead, Debug)]
struct RiffHeader {
    id: [u8; 4],
    _size: u32,
    form: [u8; 4],
}

#[derive(BinRead, Debug)]
struct ChunkHeader {
    id: [u8; 4],
    size: u32,
}

#[derive(BinRead, Debug, Clone, Copy)]
struct FmtChunk {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    _byte_rate: u32,
    _block_align: u16,
    bits_per_sample: u16,
}

/// Trailer of a WAVE_FORMAT_EXTENSIBLE `fmt ` chunk.
#[derive(BinRead, Debug)]
struct FmtExtension {
    _cb_size: u16,
    _valid_bits: u16,
    _channel_mask: u32,
    sub_format: [u8; 16],
}

struct WavHeader {
    fmt: FmtChunk,
    /// `format_tag` with the extensible wrapper resolved
    encoding: u16,
    data_offset: usize,
    data_size: usize,
}

fn parse_header(data: &[u8]) -> Result<WavHeader, FormatError> {
    if data.len() < 12 {
        return Err(FormatError::UnexpectedEof);
    }
    let riff: RiffHeader = Cursor::new(data).read_le()?;
    if &riff.id != b"RIFF" || &riff.form != b"WAVE" {
        return Err(FormatError::InvalidHeader);
    }

    let mut pos = 12;
    let mut fmt: Option<(FmtChunk, u16)> = None;
    let mut data_chunk: Option<(usize, usize)> = None;

    while pos + 8 <= data.len() && (fmt.is_none() || data_chunk.is_none()) {
        let chunk: ChunkHeader = Cursor::new(&data[pos..]).read_le()?;
        let body = pos + 8;
        let size = chunk.size as usize;

        if &chunk.id == b"fmt " {
            fmt = Some(parse_fmt(&data[body..(body + size).min(data.len())])?);
        } else if &chunk.id == b"data" {
            data_chunk = Some((body, size));
        }

        pos = body + size;
        if pos % 2 != 0 {
            pos += 1;
        }
    }

    let (fmt, encoding) = fmt.ok_or(FormatError::MissingChunk("fmt "))?;
    let (data_offset, data_size) = data_chunk.ok_or(FormatError::MissingChunk("data"))?;

    if fmt.channels == 0 {
        return Err(FormatError::InvalidHeader);
    }
    Ok(WavHeader { fmt, encoding, data_offset, data_size })
}

fn parse_fmt(body: &[u8]) -> Result<(FmtChunk, u16), FormatError> {
    if body.len() < 16 {
        return Err(FormatError::UnexpectedEof);
    }
    let mut cursor = Cursor::new(body);
    let fmt: FmtChunk = cursor.read_le()?;

    let encoding = if fmt.format_tag == FORMAT_EXTENSIBLE {
        let ext: FmtExtension = cursor.read_le()?;
        u16::from_le_bytes([ext.sub_format[0], ext.sub_format[1]])
    } else {
        fmt.format_tag
    };
    Ok((fmt, encoding))
}

fn decode_first_channel(raw: &[u8], header: &WavHeader) -> Result<Vec<f32>, FormatError> {
    let bits = header.fmt.bits_per_sample;
    let width = bits as usize / 8;
    let stride = width * header.fmt.channels as usize;
    let frames = raw.chunks_exact(stride.max(1));

    let samples = match (header.encoding, bits) {
        (FORMAT_PCM, 8) => frames.map(|f| (f[0] as i16 - 128) as f32 / 128.0).collect(),
        (FORMAT_PCM, 16) => frames
            .map(|f| i16::from_le_bytes([f[0], f[1]]) as f32 / 32768.0)
            .collect(),
        (FORMAT_PCM, 24) => frames
            .map(|f| i32::from_le_bytes([0, f[0], f[1], f[2]]) as f32 / 2147483648.0)
            .collect(),
        (FORMAT_PCM, 32) => frames
            .map(|f| i32::from_le_bytes([f[0], f[1], f[2], f[3]]) as f32 / 2147483648.0)
            .collect(),
        (FORMAT_IEEE_FLOAT, 32) => frames
            .map(|f| f32::from_le_bytes([f[0], f[1], f[2], f[3]]))
            .collect(),
        (FORMAT_IEEE_FLOAT, 64) => frames
            .map(|f| f64::from_le_bytes([f[0], f[1], f[2], f[3], f[4], f[5], f[6], f[7]]) as f32)
            .collect(),
        _ => {
            return Err(FormatError::UnsupportedFormat {
                format_tag: header.encoding,
                bits_per_sample: bits,
            })
        }
    };
    Ok(samples)
}
