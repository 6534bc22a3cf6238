//! Preset snapshots as JSON.

use std::path::Path;

use rc_ir::Snapshot;

use crate::FormatError;

pub fn to_json(snapshot: &Snapshot) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parse and validate a snapshot. A snapshot returned from here is
/// guaranteed to restore.
pub fn from_json(text: &str) -> Result<Snapshot, FormatError> {
    let snapshot: Snapshot = serde_json::from_str(text)?;
    snapshot.restore()?;
    Ok(snapshot)
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), FormatError> {
    std::fs::write(path, to_json(snapshot)?)?;
    tracing::info!(path = %path.display(), patterns = snapshot.patterns.len(), "preset saved");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, FormatError> {
    let text = std::fs::read_to_string(path)?;
    from_json(&text).inspect_err(|e| tracing::warn!(path = %path.display(), error = %e, "preset rejected"))
}
