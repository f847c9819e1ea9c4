//! Catalog inspection

use anyhow::Result;
use serde_json::Value;
use setu_core::{CaseId, RecordId};
use setu_store::EvidenceStore;

/// One record
pub async fn show(store: &EvidenceStore, id: RecordId) -> Result<Value> {
    Ok(serde_json::to_value(store.record(id).await?)?)
}

/// Records, newest first
pub async fn list(store: &EvidenceStore, case_id: Option<&CaseId>) -> Result<Value> {
    Ok(serde_json::to_value(store.list(case_id).await?)?)
}

/// Per-tier replica health
pub async fn audit(store: &EvidenceStore, id: RecordId) -> Result<Value> {
    let audit = store.audit(id).await?;
    let mut value = serde_json::to_value(&audit)?;
    if let Value::Object(map) = &mut value {
        map.insert("durably_stored".into(), audit.is_durably_stored().into());
        map.insert("fully_replicated".into(), audit.is_fully_replicated().into());
        map.insert("fully_intact".into(), audit.is_fully_intact().into());
    }
    Ok(value)
}
