//! Sample-variant assets from a directory.
//!
//! Variant `n` of a voice lives in `<stem>_<n>.wav` (e.g. `bd_7.wav`).
//! Files that are missing or fail to decode leave the slot as it was,
//! normally the factory rendering.

use std::path::Path;

use rc_engine::{VariantTable, VoicePool};
use rc_ir::Instrument;

use crate::wav_format::load_wav;

pub fn variant_file_name(instrument: Instrument, variant: usize) -> String {
    format!("{}_{}.wav", instrument.stem(), variant)
}

/// Load every variant file found in `dir`. Returns the number loaded.
pub fn load_sample_dir(dir: &Path, pool: &mut VoicePool, table: &VariantTable) -> usize {
    let mut loaded = 0;
    for instrument in Instrument::VOICES {
        for variant in 0..table.variant_count(instrument) {
            let name = variant_file_name(instrument, variant);
            let path = dir.join(&name);
            let bytes = match std::fs::read(&path) {
                Ok(b) => b,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "sample unreadable");
                    continue;
                }
            };
            match load_wav(&bytes, name.trim_end_matches(".wav")) {
                Ok(sample) if !sample.is_empty() => {
                    pool.insert_variant(instrument, variant, sample);
                    loaded += 1;
                }
                Ok(_) => tracing::warn!(path = %path.display(), "sample is empty"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "sample decode failed"),
            }
        }
    }
    tracing::info!(dir = %dir.display(), loaded, "sample directory scanned");
    loaded
}
