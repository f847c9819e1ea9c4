//! Filesystem catalog behaviour across reopen and concurrent updates

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use setu_core::{
    fingerprint, CaseId, CatalogEffects, EvidenceRecord, LedgerReference, OfficerId, RecordId,
    RecordUpdate, SetuError, TierKind, TierLocations, UpdatePrecondition,
};
use setu_effects::{FilesystemCatalog, MemoryCatalog};
use std::sync::Arc;

fn record(case: &str, name: &str, offset_secs: i64) -> EvidenceRecord {
    let mut locations = TierLocations::default();
    locations.set(TierKind::LocalVault, format!("/vault/{name}.enc"));
    EvidenceRecord {
        id: RecordId::new(),
        case_id: CaseId::new(case).unwrap(),
        officer_id: OfficerId::new("OFF-1").unwrap(),
        file_name: name.to_string(),
        media_type: "image/png".to_string(),
        size_bytes: 6,
        fingerprint: fingerprint(name.as_bytes()),
        tier_locations: locations,
        ledger_reference: LedgerReference::Pending,
        created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(offset_secs),
    }
}

async fn exercise(catalog: Arc<dyn CatalogEffects>) {
    let older = record("C-1", "photo.png", 0);
    let newer = record("C-1", "photo.png", 10);
    let other = record("C-2", "memo.txt", 5);
    for r in [&older, &newer, &other] {
        catalog.create_record(r.clone()).await.unwrap();
    }

    assert_matches!(
        catalog.create_record(older.clone()).await,
        Err(SetuError::Conflict { .. })
    );

    let found = catalog
        .find_by_case_and_name(&CaseId::new("C-1").unwrap(), "photo.png")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, newer.id);

    let all = catalog.list_records(None).await.unwrap();
    assert_eq!(
        all.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![newer.id, other.id, older.id]
    );
    let c2 = catalog
        .list_records(Some(&CaseId::new("C-2").unwrap()))
        .await
        .unwrap();
    assert_eq!(c2, vec![other.clone()]);

    let confirmed = catalog
        .update_record(
            older.id,
            RecordUpdate::ledger(LedgerReference::Confirmed("0xabc".into()))
                .when(UpdatePrecondition::LedgerPending),
        )
        .await
        .unwrap();
    assert_eq!(confirmed.ledger_reference.confirmed(), Some("0xabc"));
    assert_eq!(confirmed.fingerprint, older.fingerprint);

    assert_matches!(
        catalog
            .update_record(
                older.id,
                RecordUpdate::ledger(LedgerReference::Confirmed("0xdef".into()))
                    .when(UpdatePrecondition::LedgerPending),
            )
            .await,
        Err(SetuError::Conflict { .. })
    );
    assert_matches!(
        catalog
            .update_record(RecordId::new(), RecordUpdate::default())
            .await,
        Err(SetuError::NotFound { .. })
    );

    assert!(catalog.delete_record(other.id).await.unwrap());
    assert!(!catalog.delete_record(other.id).await.unwrap());
    assert_eq!(catalog.get_record(other.id).await.unwrap(), None);
}

/// Same case, name and timestamp: lookup and listing agree on the lowest id
async fn exercise_equal_timestamps(catalog: Arc<dyn CatalogEffects>) {
    let twins: Vec<_> = (0..4).map(|_| record("C-1", "scene.jpg", 0)).collect();
    for r in &twins {
        catalog.create_record(r.clone()).await.unwrap();
    }
    let lowest = twins.iter().map(|r| r.id).min().unwrap();

    let found = catalog
        .find_by_case_and_name(&CaseId::new("C-1").unwrap(), "scene.jpg")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, lowest);
    assert_eq!(catalog.list_records(None).await.unwrap()[0].id, lowest);
}

#[tokio::test]
async fn memory_catalog_contract() {
    exercise(Arc::new(MemoryCatalog::new())).await;
    for _ in 0..20 {
        exercise_equal_timestamps(Arc::new(MemoryCatalog::new())).await;
    }
}

#[tokio::test]
async fn filesystem_catalog_contract() {
    let dir = tempfile::tempdir().unwrap();
    exercise(Arc::new(FilesystemCatalog::open(dir.path()).unwrap())).await;
    for _ in 0..5 {
        let dir = tempfile::tempdir().unwrap();
        exercise_equal_timestamps(Arc::new(FilesystemCatalog::open(dir.path()).unwrap())).await;
    }
}

#[tokio::test]
async fn filesystem_catalog_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let r = record("C-1", "photo.png", 0);
    {
        let catalog = FilesystemCatalog::open(dir.path()).unwrap();
        catalog.create_record(r.clone()).await.unwrap();
    }
    let reopened = FilesystemCatalog::open(dir.path()).unwrap();
    assert_eq!(reopened.get_record(r.id).await.unwrap(), Some(r));
}

#[tokio::test]
async fn filesystem_catalog_skips_corrupt_documents() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = FilesystemCatalog::open(dir.path()).unwrap();
    let r = record("C-1", "photo.png", 0);
    catalog.create_record(r.clone()).await.unwrap();
    std::fs::write(dir.path().join("garbage.json"), b"{ not json").unwrap();

    assert_eq!(catalog.list_records(None).await.unwrap(), vec![r]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_concurrent_confirmation_wins() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = Arc::new(FilesystemCatalog::open(dir.path()).unwrap());
    let r = record("C-1", "photo.png", 0);
    let id = catalog.create_record(r).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let catalog = catalog.clone();
        handles.push(tokio::spawn(async move {
            catalog
                .update_record(
                    id,
                    RecordUpdate::ledger(LedgerReference::Confirmed(format!("0x{i}")))
                        .when(UpdatePrecondition::LedgerPending),
                )
                .await
        }));
    }
    let mut wins = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            wins += 1;
        }
    }
    assert_eq!(wins, 1);
}
