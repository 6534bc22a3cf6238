use std::fmt;

use rc_audio::AudioError;
use rc_formats::FormatError;
use rc_ir::SnapshotError;

/// Anything the controller can fail at.
#[derive(Debug)]
pub enum ControllerError {
    Audio(AudioError),
    Format(FormatError),
    /// Bad configuration file or value
    Config(String),
    Io(String),
    /// The audio thread went away
    AudioThread,
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::Audio(e) => write!(f, "audio: {}", e),
            ControllerError::Format(e) => write!(f, "{}", e),
            ControllerError::Config(msg) => write!(f, "config: {}", msg),
            ControllerError::Io(msg) => write!(f, "I/O error: {}", msg),
            ControllerError::AudioThread => write!(f, "audio thread exited unexpectedly"),
        }
    }
}

impl std::error::Error for ControllerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControllerError::Audio(e) => Some(e),
            ControllerError::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AudioError> for ControllerError {
    fn from(e: AudioError) -> Self {
        ControllerError::Audio(e)
    }
}

impl From<FormatError> for ControllerError {
    fn from(e: FormatError) -> Self {
        ControllerError::Format(e)
    }
}

impl From<SnapshotError> for ControllerError {
    fn from(e: SnapshotError) -> Self {
        ControllerError::Format(FormatError::Structure(e))
    }
}
