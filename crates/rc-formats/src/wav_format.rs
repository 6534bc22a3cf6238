//! WAV encoding and decoding for PCM audio.
//!
//! Rendered output is written as 16-bit mono. Assets may be 8- or 16-bit,
//! mono or stereo; stereo is folded to mono on load.

use std::io::Cursor;
use std::path::Path;

use binrw::{BinRead, BinReaderExt, BinResult, BinWrite, BinWriterExt};
use rc_engine::Frame;
use rc_ir::{Sample, SampleData};

use crate::FormatError;

const PCM: u16 = 1;

#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
struct ChunkHeader {
    id: [u8; 4],
    size: u32,
}

#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
struct FmtChunk {
    format: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

// --- Writing ---

/// Encode frames as a 16-bit mono WAV.
pub fn frames_to_wav(frames: &[Frame], sample_rate: u32) -> Vec<u8> {
    let data_size = frames.len() as u32 * 2;
    let mut out = Cursor::new(Vec::with_capacity(44 + data_size as usize));
    // Writes into a Vec can't fail.
    let _ = write_riff(&mut out, frames, sample_rate, data_size);
    out.into_inner()
}

fn write_riff(out: &mut Cursor<Vec<u8>>, frames: &[Frame], sample_rate: u32, data_size: u32) -> BinResult<()> {
    let fmt = FmtChunk {
        format: PCM,
        channels: 1,
        sample_rate,
        byte_rate: sample_rate * 2,
        block_align: 2,
        bits_per_sample: 16,
    };
    out.write_le(&ChunkHeader { id: *b"RIFF", size: 36 + data_size })?;
    out.write_le(b"WAVE")?;
    out.write_le(&ChunkHeader { id: *b"fmt ", size: 16 })?;
    out.write_le(&fmt)?;
    out.write_le(&ChunkHeader { id: *b"data", size: data_size })?;
    for frame in frames {
        out.write_le(&frame.left)?;
    }
    Ok(())
}

pub fn write_wav(path: &Path, frames: &[Frame], sample_rate: u32) -> Result<(), FormatError> {
    std::fs::write(path, frames_to_wav(frames, sample_rate))?;
    Ok(())
}

// --- Reading ---

/// Decode a WAV file from raw bytes.
pub fn load_wav(data: &[u8], name: &str) -> Result<Sample, FormatError> {
    let mut cur = Cursor::new(data);
    let riff: ChunkHeader = cur.read_le()?;
    let form: [u8; 4] = cur.read_le()?;
    if riff.id != *b"RIFF" || form != *b"WAVE" {
        return Err(FormatError::InvalidHeader);
    }

    let mut fmt: Option<FmtChunk> = None;
    let mut pcm: Option<&[u8]> = None;
    while cur.position() as usize + 8 <= data.len() {
        let chunk: ChunkHeader = cur.read_le()?;
        let body = cur.position() as usize;
        let size = chunk.size as usize;
        match &chunk.id {
            b"fmt " if size >= 16 => fmt = Some(cur.read_le()?),
            b"data" => pcm = Some(&data[body..(body + size).min(data.len())]),
            _ => {}
        }
        // Chunks are word-aligned.
        cur.set_position((body + size + (size & 1)) as u64);
    }

    let fmt = fmt.ok_or(FormatError::InvalidHeader)?;
    let pcm = pcm.ok_or(FormatError::InvalidHeader)?;
    if fmt.format != PCM || !(1..=2).contains(&fmt.channels) {
        return Err(FormatError::UnsupportedVersion);
    }

    let data = match (fmt.bits_per_sample, fmt.channels) {
        (8, 1) => SampleData::Mono8(pcm.iter().map(|&b| u8_to_i8(b)).collect()),
        (8, _) => SampleData::Mono8(
            pcm.chunks_exact(2)
                .map(|c| ((u8_to_i8(c[0]) as i16 + u8_to_i8(c[1]) as i16) / 2) as i8)
                .collect(),
        ),
        (16, 1) => SampleData::Mono16(pcm.chunks_exact(2).map(|c| i16::from_le_bytes([c[0], c[1]])).collect()),
        (16, _) => SampleData::Mono16(
            pcm.chunks_exact(4)
                .map(|c| {
                    let l = i16::from_le_bytes([c[0], c[1]]) as i32;
                    let r = i16::from_le_bytes([c[2], c[3]]) as i32;
                    ((l + r) / 2) as i16
                })
                .collect(),
        ),
        _ => return Err(FormatError::UnsupportedVersion),
    };

    Ok(Sample::new(name, data, fmt.sample_rate))
}

/// WAV 8-bit is unsigned with 128 as zero.
fn u8_to_i8(b: u8) -> i8 {
    (b as i16 - 128) as i8
}
