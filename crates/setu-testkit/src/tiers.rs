//! In-memory tier with fault injection

use async_lock::RwLock;
use async_trait::async_trait;
use setu_core::{fingerprint, EvidenceTier, StoreRequest, TierError, TierKind};
use setu_effects::naming::{numbered_key, object_key, vault_file_name};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Faults applied to subsequent calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierFaults {
    /// Every `store` fails
    pub fail_writes: bool,
    /// Every `fetch` fails
    pub fail_reads: bool,
    /// Sleep before answering `store`
    pub write_delay: Option<Duration>,
    /// Sleep before answering `fetch`
    pub read_delay: Option<Duration>,
    /// `fetch` returns bytes with one bit flipped
    pub corrupt_reads: bool,
}

/// Tier double that keeps objects in a map
///
/// Locators mimic the real adapters: a CID-like string derived from content
/// for the content network, an object key for the durable tier, a file name
/// for the vault. Clones share state, so a test can keep a handle to a tier
/// it has handed to the store.
#[derive(Debug, Clone)]
pub struct MemoryTier {
    kind: TierKind,
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    faults: Arc<Mutex<TierFaults>>,
    store_calls: Arc<AtomicUsize>,
    fetch_calls: Arc<AtomicUsize>,
}

impl MemoryTier {
    /// Healthy, empty tier
    pub fn new(kind: TierKind) -> Self {
        Self {
            kind,
            objects: Arc::new(RwLock::new(HashMap::new())),
            faults: Arc::new(Mutex::new(TierFaults::default())),
            store_calls: Arc::new(AtomicUsize::new(0)),
            fetch_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the active faults
    pub fn set_faults(&self, faults: TierFaults) {
        *self.faults.lock().unwrap() = faults;
    }

    /// Make every write fail
    pub fn fail_writes(&self) {
        self.faults.lock().unwrap().fail_writes = true;
    }

    /// Make every read fail
    pub fn fail_reads(&self) {
        self.faults.lock().unwrap().fail_reads = true;
    }

    /// Make reads return altered bytes
    pub fn corrupt_reads(&self) {
        self.faults.lock().unwrap().corrupt_reads = true;
    }

    /// Delay every write
    pub fn delay_writes(&self, delay: Duration) {
        self.faults.lock().unwrap().write_delay = Some(delay);
    }

    /// Delay every read
    pub fn delay_reads(&self, delay: Duration) {
        self.faults.lock().unwrap().read_delay = Some(delay);
    }

    /// Clear all faults
    pub fn heal(&self) {
        self.set_faults(TierFaults::default());
    }

    /// Number of `store` calls so far
    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls so far
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Stored bytes behind a locator
    pub async fn contents(&self, locator: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(locator).cloned()
    }

    /// Overwrite the bytes behind a locator
    pub async fn tamper(&self, locator: &str, bytes: Vec<u8>) {
        self.objects.write().await.insert(locator.to_string(), bytes);
    }

    /// Drop an object, as if the backend lost it
    pub async fn forget(&self, locator: &str) -> bool {
        self.objects.write().await.remove(locator).is_some()
    }

    fn base_locator(&self, request: &StoreRequest<'_>) -> String {
        match self.kind {
            TierKind::ContentNetwork => {
                format!("bafk{}", &fingerprint(request.bytes).to_hex()[..32])
            }
            TierKind::DurableObject => {
                object_key(request.case_id, request.ingested_at, request.file_name)
            }
            TierKind::LocalVault => {
                vault_file_name(request.case_id, request.ingested_at, request.file_name)
            }
        }
    }
}

#[async_trait]
impl EvidenceTier for MemoryTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    async fn store(&self, request: StoreRequest<'_>) -> Result<String, TierError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        let faults = self.faults.lock().unwrap().clone();
        if let Some(delay) = faults.write_delay {
            tokio::time::sleep(delay).await;
        }
        if faults.fail_writes {
            return Err(TierError::write(self.kind, "injected write failure"));
        }

        let base = self.base_locator(&request);
        let mut objects = self.objects.write().await;
        // Content addresses dedupe; the other tiers never replace an object
        let locator = match self.kind {
            TierKind::ContentNetwork => base,
            _ => (0..)
                .map(|n| numbered_key(&base, n))
                .find(|key| !objects.contains_key(key))
                .unwrap(),
        };
        objects.insert(locator.clone(), request.bytes.to_vec());
        Ok(locator)
    }

    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, TierError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let faults = self.faults.lock().unwrap().clone();
        if let Some(delay) = faults.read_delay {
            tokio::time::sleep(delay).await;
        }
        if faults.fail_reads {
            return Err(TierError::read(self.kind, "injected read failure"));
        }

        let mut bytes = self
            .objects
            .read()
            .await
            .get(locator)
            .cloned()
            .ok_or_else(|| TierError::not_found(self.kind, locator))?;
        if faults.corrupt_reads {
            match bytes.first_mut() {
                Some(first) => *first ^= 0x01,
                None => bytes.push(0),
            }
        }
        Ok(bytes)
    }
}
