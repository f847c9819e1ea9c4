//! Ingest and retrieve

use anyhow::{Context, Result};
use serde_json::{json, Value};
use setu_core::{CaseId, OfficerId, RecordId};
use setu_store::{EvidenceStore, EvidenceUpload};
use std::path::{Path, PathBuf};
use tracing::info;

use super::read_named;
use crate::media::guess_media_type;

/// Submit `paths` as one submission
pub async fn ingest(
    store: &EvidenceStore,
    case_id: CaseId,
    officer_id: OfficerId,
    paths: &[PathBuf],
) -> Result<Value> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        let (name, bytes) = read_named(path).await?;
        uploads.push(EvidenceUpload::new(name, guess_media_type(path), bytes));
    }

    let report = store.ingest(uploads, case_id, officer_id).await?;
    Ok(serde_json::to_value(&report)?)
}

/// Write the golden copy of `id` to `output` (default: its original name in the current directory)
pub async fn retrieve(store: &EvidenceStore, id: RecordId, output: Option<&Path>) -> Result<Value> {
    let evidence = store.retrieve(id).await?;
    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(&evidence.file_name, id));
    tokio::fs::write(&target, &evidence.bytes)
        .await
        .with_context(|| format!("writing {}", target.display()))?;
    info!(record_id = %id, path = %target.display(), "Wrote evidence");

    Ok(json!({
        "record_id": evidence.record_id,
        "file_name": evidence.file_name,
        "media_type": evidence.media_type,
        "size_bytes": evidence.bytes.len(),
        "served_by": evidence.served_by,
        "written_to": target,
        "failed_attempts": evidence.failed_attempts,
    }))
}

/// Last component of the stored name, so `../x` lands in the current directory as `x`
fn default_output(file_name: &str, id: RecordId) -> PathBuf {
    Path::new(file_name)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(id.to_string()))
}
