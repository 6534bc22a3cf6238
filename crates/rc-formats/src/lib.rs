//! File formats for the rhythm composer.
//!
//! Preset snapshots as JSON, WAV decoding for sample-variant assets and
//! WAV encoding for offline renders.

mod sample_dir;
mod snapshot_json;
mod wav_format;

use std::fmt;

use rc_ir::SnapshotError;

pub use sample_dir::{load_sample_dir, variant_file_name};
pub use snapshot_json::{from_json, load_snapshot, save_snapshot, to_json};
pub use wav_format::{frames_to_wav, load_wav, write_wav};

/// Error type for format parsing.
#[derive(Debug)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    InvalidHeader,
    /// Unexpected end of file
    UnexpectedEof,
    /// Unsupported encoding (compressed WAV, 24-bit, more than two channels)
    UnsupportedVersion,
    /// Malformed JSON
    Json(String),
    /// Well-formed JSON that doesn't describe a valid preset
    Structure(SnapshotError),
    /// I/O error
    Io(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::InvalidHeader => write!(f, "invalid file header"),
            FormatError::UnexpectedEof => write!(f, "unexpected end of file"),
            FormatError::UnsupportedVersion => write!(f, "unsupported encoding"),
            FormatError::Json(msg) => write!(f, "malformed preset: {}", msg),
            FormatError::Structure(e) => write!(f, "invalid preset: {}", e),
            FormatError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Structure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(e: serde_json::Error) -> Self {
        FormatError::Json(e.to_string())
    }
}

impl From<SnapshotError> for FormatError {
    fn from(e: SnapshotError) -> Self {
        FormatError::Structure(e)
    }
}

impl From<binrw::Error> for FormatError {
    fn from(e: binrw::Error) -> Self {
        if e.is_eof() {
            FormatError::UnexpectedEof
        } else {
            FormatError::InvalidHeader
        }
    }
}
