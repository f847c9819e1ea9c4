//! Ledger reference confirmation

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use setu_core::RecordId;
use setu_store::EvidenceStore;
use std::path::Path;

/// One entry of a batch file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchEntry {
    db_id: RecordId,
    tx_hash: String,
}

/// Confirm one record
pub async fn confirm(store: &EvidenceStore, id: RecordId, reference: &str) -> Result<Value> {
    let record = store.confirm_anchor(id, reference).await?;
    Ok(serde_json::to_value(&record)?)
}

/// Confirm every `{"dbId", "txHash"}` entry in a JSON array file
pub async fn confirm_batch(store: &EvidenceStore, path: &Path) -> Result<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let entries: Vec<BatchEntry> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    let batch = entries.into_iter().map(|e| (e.db_id, e.tx_hash)).collect();
    let outcomes: Vec<Value> = store
        .confirm_anchors(batch)
        .await
        .into_iter()
        .map(|o| match o.result {
            Ok(record) => json!({
                "record_id": o.record_id,
                "confirmed": true,
                "ledger_reference": record.ledger_reference,
            }),
            Err(e) => json!({
                "record_id": o.record_id,
                "confirmed": false,
                "error": e.to_string(),
            }),
        })
        .collect();
    Ok(Value::Array(outcomes))
}
