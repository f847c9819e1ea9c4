//! Record catalog handlers

mod filesystem;
mod memory;

pub use filesystem::FilesystemCatalog;
pub use memory::MemoryCatalog;

use setu_core::{CaseId, EvidenceRecord};
use std::borrow::Borrow;
use std::cmp::Ordering;

/// Newest first; equal timestamps order by id
pub(crate) fn newest_first(a: &EvidenceRecord, b: &EvidenceRecord) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

pub(crate) fn sort_newest_first(records: &mut [EvidenceRecord]) {
    records.sort_by(newest_first);
}

/// The record a listing would put first
pub(crate) fn most_recent<I>(records: I) -> Option<I::Item>
where
    I: IntoIterator,
    I::Item: Borrow<EvidenceRecord>,
{
    records
        .into_iter()
        .min_by(|a, b| newest_first(a.borrow(), b.borrow()))
}

pub(crate) fn matches_case(record: &EvidenceRecord, case_id: Option<&CaseId>) -> bool {
    case_id.map_or(true, |c| &record.case_id == c)
}
