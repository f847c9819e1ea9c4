//! End to end with a real sealed vault and the filesystem catalog

use proptest::prelude::*;
use setu_core::{EvidenceTier, TierKind};
use setu_effects::FilesystemCatalog;
use setu_store::{EvidenceStore, EvidenceUpload, StoreOptions, TierChain};
use setu_testkit::{
    strategies::{arb_evidence_bytes, arb_file_name},
    test_case_id, test_officer_id, FixedClock, MemoryTier, TempVault,
};
use std::sync::Arc;

struct Rig {
    vault: TempVault,
    content: MemoryTier,
    durable: MemoryTier,
    store: EvidenceStore,
}

fn rig() -> Rig {
    let vault = TempVault::new();
    let content = MemoryTier::new(TierKind::ContentNetwork);
    let durable = MemoryTier::new(TierKind::DurableObject);
    let catalog = FilesystemCatalog::open(vault.dir.path().join("catalog")).unwrap();
    let tiers: Vec<Arc<dyn EvidenceTier>> = vec![
        Arc::new(content.clone()),
        Arc::new(durable.clone()),
        vault.tier.clone(),
    ];
    let store = EvidenceStore::new(
        TierChain::new(tiers).unwrap(),
        Arc::new(catalog),
        Arc::new(FixedClock::default()),
        StoreOptions::default(),
    );
    Rig {
        vault,
        content,
        durable,
        store,
    }
}

#[tokio::test]
async fn vault_serves_when_remote_tiers_are_gone() {
    let rig = rig();
    let upload = EvidenceUpload::new("crime scene.png", "image/png", b"\x89PNG pixels".to_vec());

    let report = rig
        .store
        .ingest(vec![upload.clone()], test_case_id(), test_officer_id())
        .await
        .unwrap();
    let record = &report.succeeded[0].record;

    let vault_path = record.tier_locations.get(TierKind::LocalVault).unwrap();
    assert!(vault_path.ends_with("NYA-2026-001_1767225600000_crime_scene.png.enc"));
    let on_disk = std::fs::read_to_string(vault_path).unwrap();
    assert!(on_disk.is_ascii());
    assert!(!on_disk.contains("PNG"));

    rig.content.fail_reads();
    rig.durable.fail_reads();
    let retrieved = rig.store.retrieve(record.id).await.unwrap();
    assert_eq!(retrieved.served_by, TierKind::LocalVault);
    assert_eq!(retrieved.bytes, upload.bytes);
}

#[tokio::test]
async fn same_name_twice_at_one_instant_keeps_both_copies() {
    let rig = rig();
    let first = EvidenceUpload::new("memo.txt", "text/plain", b"one".to_vec());
    let second = EvidenceUpload::new("memo.txt", "text/plain", b"two".to_vec());

    let report = rig
        .store
        .ingest(vec![first, second], test_case_id(), test_officer_id())
        .await
        .unwrap();
    assert_eq!(report.succeeded.len(), 2);

    rig.content.fail_reads();
    rig.durable.fail_reads();
    let mut served = Vec::new();
    for ingested in &report.succeeded {
        served.push(rig.store.retrieve(ingested.record.id).await.unwrap().bytes);
    }
    served.sort();
    assert_eq!(served, vec![b"one".to_vec(), b"two".to_vec()]);
    assert_eq!(std::fs::read_dir(rig.vault.tier.root()).unwrap().count(), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn any_file_survives_the_vault(name in arb_file_name(), bytes in arb_evidence_bytes()) {
        prop_assume!(!name.trim().is_empty());
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let rig = rig();
            let upload =
                EvidenceUpload::new(name.clone(), "application/octet-stream", bytes.clone());
            let report = rig
                .store
                .ingest(vec![upload], test_case_id(), test_officer_id())
                .await
                .unwrap();
            let record = &report.succeeded[0].record;
            prop_assert_eq!(&record.file_name, &name);

            rig.content.fail_reads();
            rig.durable.fail_reads();
            let retrieved = rig.store.retrieve(record.id).await.unwrap();
            prop_assert_eq!(retrieved.served_by, TierKind::LocalVault);
            prop_assert_eq!(retrieved.bytes, bytes);
            Ok(())
        })?;
    }
}
