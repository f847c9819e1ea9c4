//! In-process catalog

use async_trait::async_trait;
use setu_core::{
    CaseId, CatalogEffects, EvidenceRecord, RecordId, RecordUpdate, Result, SetuError,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{matches_case, most_recent, sort_newest_first};

/// Catalog held in memory; cloning shares the same records
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    records: Arc<RwLock<HashMap<RecordId, EvidenceRecord>>>,
}

impl MemoryCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the catalog is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogEffects for MemoryCatalog {
    async fn create_record(&self, record: EvidenceRecord) -> Result<RecordId> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(SetuError::conflict(format!(
                "record {} already exists",
                record.id
            )));
        }
        let id = record.id;
        records.insert(id, record);
        Ok(id)
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<EvidenceRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_by_case_and_name(
        &self,
        case_id: &CaseId,
        file_name: &str,
    ) -> Result<Option<EvidenceRecord>> {
        let records = self.records.read().await;
        Ok(most_recent(
            records
                .values()
                .filter(|r| &r.case_id == case_id && r.file_name == file_name),
        )
        .cloned())
    }

    async fn update_record(&self, id: RecordId, update: RecordUpdate) -> Result<EvidenceRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| SetuError::not_found(format!("record {id}")))?;
        if !update.admits(record) {
            return Err(SetuError::conflict(format!(
                "record {id} no longer satisfies the update precondition"
            )));
        }
        update.apply(record);
        Ok(record.clone())
    }

    async fn delete_record(&self, id: RecordId) -> Result<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }

    async fn list_records(&self, case_id: Option<&CaseId>) -> Result<Vec<EvidenceRecord>> {
        let mut out: Vec<_> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| matches_case(r, case_id))
            .cloned()
            .collect();
        sort_newest_first(&mut out);
        Ok(out)
    }
}
