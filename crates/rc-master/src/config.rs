//! Engine configuration, loaded from TOML.
//!
//! Every field is optional in the file:
//!
//! ```toml
//! sample_rate = 48000
//! timer_interval_ms = 20
//! horizon_ms = 80
//! max_voices = 64
//! sample_dir = "samples"
//!
//! [variants]
//! bd_tune = [0.2, 0.45, 0.7]
//! ```

use std::path::{Path, PathBuf};

use rc_engine::{Lookahead, VariantTable, DEFAULT_MAX_VOICES};
use serde::{Deserialize, Serialize};

use crate::ControllerError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rate for offline renders and the rate requested from the device
    pub sample_rate: u32,
    /// Host timer period driving the look-ahead loop
    pub timer_interval_ms: u64,
    /// How far ahead of the audio clock steps are committed
    pub horizon_ms: u64,
    pub max_voices: usize,
    /// Directory of `<stem>_<n>.wav` variant assets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_dir: Option<PathBuf>,
    pub variants: VariantTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            timer_interval_ms: 20,
            horizon_ms: 80,
            max_voices: DEFAULT_MAX_VOICES,
            sample_dir: None,
            variants: VariantTable::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ControllerError> {
        let text = std::fs::read_to_string(path).map_err(|e| ControllerError::Io(e.to_string()))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ControllerError> {
        let config: Self = toml::from_str(text).map_err(|e| ControllerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ControllerError> {
        toml::to_string_pretty(self).map_err(|e| ControllerError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<(), ControllerError> {
        if !(8_000..=192_000).contains(&self.sample_rate) {
            return Err(ControllerError::Config(format!("sample_rate {} out of range", self.sample_rate)));
        }
        if self.timer_interval_ms == 0 || self.horizon_ms <= self.timer_interval_ms {
            return Err(ControllerError::Config(format!(
                "horizon_ms ({}) must exceed timer_interval_ms ({})",
                self.horizon_ms, self.timer_interval_ms
            )));
        }
        if self.max_voices == 0 {
            return Err(ControllerError::Config("max_voices must be at least 1".into()));
        }
        Ok(())
    }

    pub fn lookahead(&self) -> Lookahead {
        Lookahead {
            horizon_s: self.horizon_ms as f64 / 1000.0,
            interval_s: self.timer_interval_ms as f64 / 1000.0,
        }
    }
}
