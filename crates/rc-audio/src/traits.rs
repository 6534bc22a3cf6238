//! Audio output trait and error types.

use std::fmt;

/// Failures opening or driving the output device.
#[derive(Debug)]
pub enum AudioError {
    NoDevice,
    /// The device reported no usable output configuration
    DeviceConfig(String),
    BuildStream(String),
    /// Play or pause was refused
    StreamControl(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NoDevice => write!(f, "no output device"),
            AudioError::DeviceConfig(msg) => write!(f, "output config: {}", msg),
            AudioError::BuildStream(msg) => write!(f, "building stream: {}", msg),
            AudioError::StreamControl(msg) => write!(f, "stream control: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(e: cpal::DefaultStreamConfigError) -> Self {
        AudioError::DeviceConfig(e.to_string())
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(e: cpal::BuildStreamError) -> Self {
        AudioError::BuildStream(e.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(e: cpal::PlayStreamError) -> Self {
        AudioError::StreamControl(e.to_string())
    }
}

impl From<cpal::PauseStreamError> for AudioError {
    fn from(e: cpal::PauseStreamError) -> Self {
        AudioError::StreamControl(e.to_string())
    }
}

/// Trait for audio output backends.
pub trait AudioOutput {
    /// Device sample rate.
    fn sample_rate(&self) -> u32;

    /// Start playback.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Stop playback. Queued frames are kept.
    fn stop(&mut self) -> Result<(), AudioError>;
}
