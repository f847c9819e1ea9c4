//! Verify candidate files

use anyhow::Result;
use serde_json::Value;
use setu_core::{CaseId, RecordId};
use setu_store::{EvidenceStore, VerificationCandidate};
use std::path::PathBuf;

use super::read_named;

/// Check each file against the catalog, by record id or by case and file name
pub async fn verify(
    store: &EvidenceStore,
    case_id: Option<&CaseId>,
    record_id: Option<RecordId>,
    paths: &[PathBuf],
) -> Result<Value> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        let (name, bytes) = read_named(path).await?;
        candidates.push(VerificationCandidate::new(name, bytes));
    }
    let outcomes = store
        .verifier()
        .verify_batch(candidates, case_id, record_id)
        .await;
    Ok(serde_json::to_value(&outcomes)?)
}
