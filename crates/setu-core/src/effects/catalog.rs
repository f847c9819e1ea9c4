//! Key-value catalog of evidence records

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{CaseId, EvidenceRecord, RecordId, RecordUpdate};

/// Record catalog
///
/// Implementations must apply each [`RecordUpdate`] as one atomic
/// read-modify-write on a single record. A failed precondition is reported as
/// [`SetuError::Conflict`](crate::SetuError::Conflict) and leaves the record
/// unchanged; an unknown id is [`SetuError::NotFound`](crate::SetuError::NotFound).
#[async_trait]
pub trait CatalogEffects: Send + Sync {
    /// Insert a new record
    async fn create_record(&self, record: EvidenceRecord) -> Result<RecordId>;

    /// Fetch a record by id
    async fn get_record(&self, id: RecordId) -> Result<Option<EvidenceRecord>>;

    /// Most recent record (by `created_at`) for a case and file name
    async fn find_by_case_and_name(
        &self,
        case_id: &CaseId,
        file_name: &str,
    ) -> Result<Option<EvidenceRecord>>;

    /// Apply `update` atomically and return the stored result
    async fn update_record(&self, id: RecordId, update: RecordUpdate) -> Result<EvidenceRecord>;

    /// Remove a record; administrative use only
    async fn delete_record(&self, id: RecordId) -> Result<bool>;

    /// Records, newest first, optionally restricted to one case
    async fn list_records(&self, case_id: Option<&CaseId>) -> Result<Vec<EvidenceRecord>>;
}
