//! JSON snapshot files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use custody_registry::prelude::RegistrySnapshot;

/// Read a snapshot file.
///
/// # Errors
///
/// If the file cannot be read or is not a snapshot.
pub fn read_snapshot(path: &Path) -> Result<RegistrySnapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing snapshot {}", path.display()))
}

/// Write a snapshot file, replacing any existing one.
///
/// # Errors
///
/// If the file cannot be written.
pub fn write_snapshot(path: &Path, snapshot: &RegistrySnapshot) -> Result<()> {
    let text = serde_json::to_string_pretty(snapshot).context("serializing snapshot")?;
    fs::write(path, text).with_context(|| format!("writing snapshot {}", path.display()))
}
