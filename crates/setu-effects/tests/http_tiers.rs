//! HTTP tiers against in-process fake services

use assert_matches::assert_matches;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{TimeZone, Utc};
use setu_core::{
    config::{ContentNetworkConfig, DurableObjectConfig},
    CaseId, EvidenceTier, OfficerId, StoreRequest, TierError, TierKind, TierOperation,
};
use setu_effects::{BucketObjectTier, PinningGatewayTier};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn ids() -> (CaseId, OfficerId) {
    (
        CaseId::new("NYA-2026-001").unwrap(),
        OfficerId::new("OFF-7").unwrap(),
    )
}

#[derive(Clone, Default)]
struct Pinning {
    uploads: Arc<Mutex<Vec<(HeaderMap, String)>>>,
    content: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    delay: Option<Duration>,
    fail: bool,
}

async fn pin(State(state): State<Pinning>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
    if state.fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, "pinning backend down").into_response();
    }
    if headers.get("pinata_api_key").map(|v| v.as_bytes()) != Some(b"key".as_slice()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let body = String::from_utf8_lossy(&body).into_owned();
    state.uploads.lock().unwrap().push((headers, body));
    Json(serde_json::json!({
        "IpfsHash": "bafkreifakecid",
        "PinSize": 6,
        "Timestamp": "2026-01-01T00:00:00Z"
    }))
    .into_response()
}

async fn gateway(State(state): State<Pinning>, Path(cid): Path<String>) -> Response {
    match state.content.lock().unwrap().get(&cid) {
        Some(bytes) => bytes.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn pinning_tier(state: Pinning, timeout_ms: u64) -> PinningGatewayTier {
    let app = Router::new()
        .route("/pinning/pinFileToIPFS", post(pin))
        .route("/ipfs/:cid", get(gateway))
        .with_state(state);
    let base = serve(app).await;
    PinningGatewayTier::from_config(&ContentNetworkConfig {
        api_url: base.clone(),
        gateway_url: base,
        api_key: Some("key".into()),
        api_secret: Some("secret".into()),
        timeout_ms,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn pinning_upload_sends_credentials_and_metadata() {
    let state = Pinning::default();
    let tier = pinning_tier(state.clone(), 5_000).await;
    let (case_id, officer_id) = ids();

    let cid = tier
        .store(StoreRequest {
            case_id: &case_id,
            officer_id: &officer_id,
            file_name: "photo.png",
            media_type: "image/png",
            ingested_at: Utc::now(),
            bytes: b"pixels",
        })
        .await
        .unwrap();
    assert_eq!(cid, "bafkreifakecid");

    let uploads = state.uploads.lock().unwrap();
    let (headers, body) = &uploads[0];
    assert_eq!(headers["pinata_secret_api_key"], "secret");
    assert!(body.contains("pixels"));
    assert!(body.contains("filename=\"photo.png\""));
    assert!(body.contains(r#""caseId":"NYA-2026-001""#));
    assert!(body.contains(r#""officerId":"OFF-7""#));
    assert!(body.contains(r#""cidVersion":1"#));
}

#[tokio::test]
async fn gateway_serves_pinned_bytes_and_reports_missing() {
    let state = Pinning::default();
    state
        .content
        .lock()
        .unwrap()
        .insert("bafkreiknown".into(), b"evidence".to_vec());
    let tier = pinning_tier(state, 5_000).await;

    assert_eq!(tier.fetch("bafkreiknown").await.unwrap(), b"evidence");
    assert_matches!(
        tier.fetch("bafkreimissing").await,
        Err(TierError::NotFound {
            tier: TierKind::ContentNetwork,
            ..
        })
    );
}

#[tokio::test]
async fn pinning_failure_is_a_write_error() {
    let tier = pinning_tier(
        Pinning {
            fail: true,
            ..Default::default()
        },
        5_000,
    )
    .await;
    let (case_id, officer_id) = ids();
    let err = tier
        .store(StoreRequest {
            case_id: &case_id,
            officer_id: &officer_id,
            file_name: "a.txt",
            media_type: "text/plain",
            ingested_at: Utc::now(),
            bytes: b"a",
        })
        .await
        .unwrap_err();
    assert!(err.is_write());
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn slow_pinning_service_times_out() {
    let tier = pinning_tier(
        Pinning {
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        },
        50,
    )
    .await;
    let (case_id, officer_id) = ids();
    let err = tier
        .store(StoreRequest {
            case_id: &case_id,
            officer_id: &officer_id,
            file_name: "a.txt",
            media_type: "text/plain",
            ingested_at: Utc::now(),
            bytes: b"a",
        })
        .await
        .unwrap_err();
    assert_matches!(
        err,
        TierError::Timeout {
            operation: TierOperation::Write,
            elapsed_ms: 50,
            ..
        }
    );
}

#[derive(Clone, Default)]
struct Objects {
    stored: Arc<Mutex<HashMap<String, (HeaderMap, Vec<u8>)>>>,
    /// Behave like a store without conditional writes
    ignore_if_none_match: bool,
}

async fn put_object(
    State(state): State<Objects>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if headers.get("authorization").map(|v| v.as_bytes()) != Some(b"Bearer token".as_slice()) {
        return StatusCode::FORBIDDEN;
    }
    let create_only = !state.ignore_if_none_match
        && headers.get("if-none-match").map(|v| v.as_bytes()) == Some(b"*".as_slice());
    let mut stored = state.stored.lock().unwrap();
    let path = format!("{bucket}/{key}");
    if create_only && stored.contains_key(&path) {
        return StatusCode::PRECONDITION_FAILED;
    }
    stored.insert(path, (headers, body.to_vec()));
    StatusCode::OK
}

async fn get_object(
    State(state): State<Objects>,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    match state.stored.lock().unwrap().get(&format!("{bucket}/{key}")) {
        Some((_, bytes)) => bytes.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn object_tier(state: Objects) -> BucketObjectTier {
    let app = Router::new()
        .route("/:bucket/*key", get(get_object).put(put_object))
        .with_state(state);
    let base = serve(app).await;
    BucketObjectTier::from_config(&DurableObjectConfig {
        endpoint: Some(base),
        bucket: Some("evidence".into()),
        access_token: Some("token".into()),
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn object_store_roundtrip_with_provenance_headers() {
    let state = Objects::default();
    let tier = object_tier(state.clone()).await;
    let (case_id, officer_id) = ids();

    let key = tier
        .store(StoreRequest {
            case_id: &case_id,
            officer_id: &officer_id,
            file_name: "witness statement.pdf",
            media_type: "application/pdf",
            ingested_at: Utc::now(),
            bytes: b"%PDF-1.7",
        })
        .await
        .unwrap();

    assert!(key.starts_with("NYA-2026-001/"));
    assert!(key.ends_with("_witness_statement.pdf"));
    {
        let stored = state.stored.lock().unwrap();
        let (headers, _) = &stored[&format!("evidence/{key}")];
        assert_eq!(headers["x-amz-meta-case-id"], "NYA-2026-001");
        assert_eq!(headers["x-amz-meta-officer-id"], "OFF-7");
        assert_eq!(headers["content-type"], "application/pdf");
    }

    assert_eq!(tier.fetch(&key).await.unwrap(), b"%PDF-1.7");
    assert_matches!(
        tier.fetch("NYA-2026-001/0_missing.pdf").await,
        Err(TierError::NotFound { .. })
    );
    assert_matches!(tier.fetch("../etc/passwd").await, Err(TierError::Read { .. }));
}

#[tokio::test]
async fn unreachable_object_store_is_a_read_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let tier = BucketObjectTier::from_config(&DurableObjectConfig {
        endpoint: Some(format!("http://{addr}")),
        bucket: Some("evidence".into()),
        timeout_ms: 1_000,
        ..Default::default()
    })
    .unwrap();
    assert_matches!(
        tier.fetch("C/1_a").await,
        Err(TierError::Read {
            tier: TierKind::DurableObject,
            ..
        })
    );
}

fn request_at<'a>(
    ids: &'a (CaseId, OfficerId),
    file_name: &'a str,
    bytes: &'a [u8],
    at: chrono::DateTime<Utc>,
) -> StoreRequest<'a> {
    StoreRequest {
        case_id: &ids.0,
        officer_id: &ids.1,
        file_name,
        media_type: "image/jpeg",
        ingested_at: at,
        bytes,
    }
}

#[tokio::test]
async fn colliding_object_keys_never_replace_stored_objects() {
    let ids = (CaseId::new("C-1").unwrap(), OfficerId::new("OFF-7").unwrap());
    let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

    for ignore_if_none_match in [false, true] {
        let state = Objects {
            ignore_if_none_match,
            ..Default::default()
        };
        let tier = object_tier(state.clone()).await;

        // Both names sanitize to `_____.jpg`
        let k1 = tier
            .store(request_at(&ids, "ফটোট.jpg", b"first", at))
            .await
            .unwrap();
        let k2 = tier
            .store(request_at(&ids, "ফটোক.jpg", b"second", at))
            .await
            .unwrap();

        assert_eq!(k1, "C-1/1700000000000_____.jpg");
        assert_eq!(k2, "C-1/1700000000000_____.jpg-1");
        assert_eq!(tier.fetch(&k1).await.unwrap(), b"first");
        assert_eq!(tier.fetch(&k2).await.unwrap(), b"second");
        assert_eq!(state.stored.lock().unwrap().len(), 2);
    }
}

#[tokio::test]
async fn concurrent_same_name_stores_get_distinct_keys() {
    let state = Objects::default();
    let tier = Arc::new(object_tier(state.clone()).await);
    let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

    let handles: Vec<_> = (0..6u8)
        .map(|i| {
            let tier = Arc::clone(&tier);
            tokio::spawn(async move {
                let ids = ids();
                let bytes = vec![i; 16];
                let key = tier
                    .store(request_at(&ids, "scene.jpg", &bytes, at))
                    .await
                    .unwrap();
                (key, bytes)
            })
        })
        .collect();

    let mut keys = std::collections::HashSet::new();
    for handle in handles {
        let (key, bytes) = handle.await.unwrap();
        assert_eq!(tier.fetch(&key).await.unwrap(), bytes);
        assert!(keys.insert(key));
    }
    assert_eq!(state.stored.lock().unwrap().len(), 6);
}
