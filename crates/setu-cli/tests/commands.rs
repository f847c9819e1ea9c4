//! End-to-end runs of the CLI handlers against a vault-only configuration

use serde_json::{json, Value};
use setu_cli::config::{open_store, write_starter_config};
use setu_cli::handlers::{anchor, evidence, records, verify};
use setu_core::{CaseId, OfficerId, RecordId};
use setu_store::EvidenceStore;
use std::path::Path;
use tempfile::TempDir;

fn vault_only_store(dir: &Path) -> EvidenceStore {
    let mut config = write_starter_config(&dir.join("config.toml")).unwrap();
    config.content_network.enabled = false;
    config.durable_object.enabled = false;
    config.local_vault.root = dir.join("vault");
    config.catalog.root = dir.join("catalog");
    open_store(&config).unwrap()
}

fn case() -> CaseId {
    CaseId::new("NYA-2026-001").unwrap()
}

async fn ingest_one(store: &EvidenceStore, dir: &TempDir, name: &str, bytes: &[u8]) -> RecordId {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    let officer = OfficerId::new("OFF-4471").unwrap();

    let report = evidence::ingest(store, case(), officer, &[path]).await.unwrap();
    assert_eq!(report["failed"], json!([]));
    let id = report["succeeded"][0]["record"]["id"].as_str().unwrap();
    id.parse().unwrap()
}

#[tokio::test]
async fn test_ingest_retrieve_and_verify() {
    let dir = TempDir::new().unwrap();
    let store = vault_only_store(dir.path());
    let id = ingest_one(&store, &dir, "statement.pdf", b"%PDF-1.7 witness statement").await;

    let out = dir.path().join("restored.pdf");
    let retrieved = evidence::retrieve(&store, id, Some(&out)).await.unwrap();
    assert_eq!(retrieved["served_by"], "local-vault");
    assert_eq!(retrieved["media_type"], "application/pdf");
    assert_eq!(
        std::fs::read(&out).unwrap(),
        b"%PDF-1.7 witness statement".to_vec()
    );

    let candidate = dir.path().join("statement.pdf");
    let outcomes = verify::verify(&store, Some(&case()), None, &[candidate.clone()])
        .await
        .unwrap();
    assert_eq!(outcomes[0]["result"]["Ok"]["verdict"], "authentic");

    std::fs::write(&candidate, b"%PDF-1.7 altered statement").unwrap();
    let outcomes = verify::verify(&store, None, Some(id), &[candidate])
        .await
        .unwrap();
    assert_eq!(outcomes[0]["result"]["Ok"]["verdict"], "tampered");
}

#[tokio::test]
async fn test_confirm_list_and_audit() {
    let dir = TempDir::new().unwrap();
    let store = vault_only_store(dir.path());
    let first = ingest_one(&store, &dir, "scene.png", b"\x89PNG scene").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = ingest_one(&store, &dir, "audio.wav", b"RIFF interview").await;

    let record = anchor::confirm(&store, first, "0xfeed").await.unwrap();
    assert_eq!(record["ledger_reference"], "0xfeed");

    let batch = dir.path().join("batch.json");
    let unknown = RecordId::new();
    std::fs::write(
        &batch,
        json!([
            { "dbId": second, "txHash": "0xbeef" },
            { "dbId": unknown, "txHash": "0xdead" },
        ])
        .to_string(),
    )
    .unwrap();
    let outcomes = anchor::confirm_batch(&store, &batch).await.unwrap();
    assert_eq!(outcomes[0]["confirmed"], true);
    assert_eq!(outcomes[1]["confirmed"], false);

    let listed = records::list(&store, Some(&case())).await.unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["file_name"], "audio.wav");
    assert_eq!(listed[0]["ledger_reference"], "0xbeef");

    let audit = records::audit(&store, first).await.unwrap();
    assert_eq!(audit["durably_stored"], true);
    assert_eq!(audit["fully_replicated"], false);
    let states: Vec<&Value> = audit["tiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| &t["health"]["state"])
        .collect();
    assert_eq!(states, ["not_replicated", "not_replicated", "intact"]);

    let shown = records::show(&store, first).await.unwrap();
    assert_eq!(shown["file_name"], "scene.png");
    assert!(records::show(&store, unknown).await.is_err());
}

#[tokio::test]
async fn test_retrieve_unknown_record_fails() {
    let dir = TempDir::new().unwrap();
    let store = vault_only_store(dir.path());
    let err = evidence::retrieve(&store, RecordId::new(), Some(&dir.path().join("x")))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}
