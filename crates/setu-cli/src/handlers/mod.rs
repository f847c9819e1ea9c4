//! Command handlers
//!
//! Each handler takes an open store plus parsed arguments and returns the
//! JSON document the binary prints.

pub mod anchor;
pub mod evidence;
pub mod records;
pub mod verify;

use anyhow::{Context, Result};
use std::path::Path;

/// Read a file and return its name alongside the bytes
pub(crate) async fn read_named(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no usable file name", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok((name, bytes))
}
