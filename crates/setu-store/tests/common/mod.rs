#![allow(dead_code)]

use setu_store::{EvidenceStore, EvidenceUpload, StoreOptions, TierChain};
use setu_testkit::TestHarness;
use std::time::Duration;

pub fn options() -> StoreOptions {
    StoreOptions {
        remote_tier_timeout: Duration::from_millis(200),
        ..StoreOptions::default()
    }
}

pub fn store_with(harness: &TestHarness, options: StoreOptions) -> EvidenceStore {
    EvidenceStore::new(
        TierChain::new(harness.tiers()).unwrap(),
        harness.catalog(),
        harness.clock.clone(),
        options,
    )
}

pub fn store(harness: &TestHarness) -> EvidenceStore {
    store_with(harness, options())
}

pub fn report_pdf() -> EvidenceUpload {
    EvidenceUpload::new(
        "report.pdf",
        "application/pdf",
        b"%PDF-1.7 incident report".to_vec(),
    )
}
