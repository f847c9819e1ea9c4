//! Evidence Store Orchestrator
//!
//! Ingestion writes each file to every tier and catalogs whatever succeeded.
//! Retrieval walks the [`TierChain`] in priority order and returns the first
//! copy that comes back (and, by default, hashes to the recorded
//! fingerprint). The catalog record is the only shared mutable state; the
//! store never mutates it except to attach a ledger reference.

use futures::future::join_all;
use setu_core::{
    fingerprint, AnchorPolicy, CaseId, CatalogEffects, EvidenceRecord, LedgerReference,
    OfficerId, PhysicalTimeEffects, RecordId, RecordUpdate, SetuConfig, SetuError, StoreRequest,
    TierError, TierKind, TierLocations, TierOperation, UpdatePrecondition,
};
use setu_effects::{tiers_from_config, FilesystemCatalog, SystemClock};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::audit::{ReplicationAudit, TierAudit, TierHealth};
use crate::chain::TierChain;
use crate::error::EvidenceError;
use crate::ingest::{EvidenceUpload, IngestFailure, IngestReport, IngestedEvidence};
use crate::verification::VerificationEngine;

/// Tunables for an [`EvidenceStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Bound on each content-network and durable-object call
    pub remote_tier_timeout: Duration,
    /// Largest accepted submission
    pub max_files_per_submission: usize,
    /// Files ingested at the same time
    pub max_concurrent_files: usize,
    /// Treat a copy that hashes differently as a failed attempt
    pub verify_on_retrieve: bool,
    /// What a second anchor confirmation does
    pub anchor_policy: AnchorPolicy,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from(&SetuConfig::default())
    }
}

impl From<&SetuConfig> for StoreOptions {
    fn from(config: &SetuConfig) -> Self {
        Self {
            remote_tier_timeout: Duration::from_millis(config.ingest.remote_tier_timeout_ms),
            max_files_per_submission: config.ingest.max_files_per_submission,
            max_concurrent_files: config.ingest.max_concurrent_files,
            verify_on_retrieve: config.retrieval.verify_on_retrieve,
            anchor_policy: config.anchor.policy,
        }
    }
}

/// Bytes served by [`EvidenceStore::retrieve`]
#[derive(Clone, PartialEq, Eq)]
pub struct RetrievedEvidence {
    /// Record the bytes belong to
    pub record_id: RecordId,
    /// Original file name
    pub file_name: String,
    /// Original content type
    pub media_type: String,
    /// The golden copy
    pub bytes: Vec<u8>,
    /// Tier that served it
    pub served_by: TierKind,
    /// Higher-priority tiers that failed first
    pub failed_attempts: Vec<TierError>,
}

impl std::fmt::Debug for RetrievedEvidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievedEvidence")
            .field("record_id", &self.record_id)
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .field("served_by", &self.served_by)
            .field("failed_attempts", &self.failed_attempts)
            .finish()
    }
}

/// Per-item outcome of [`EvidenceStore::confirm_anchors`]
#[derive(Debug, Clone)]
pub struct AnchorOutcome {
    /// Targeted record
    pub record_id: RecordId,
    /// Updated record or the reason it was not updated
    pub result: Result<EvidenceRecord, EvidenceError>,
}

struct StoreInner {
    chain: TierChain,
    catalog: Arc<dyn CatalogEffects>,
    clock: Arc<dyn PhysicalTimeEffects>,
    options: StoreOptions,
    file_permits: Arc<Semaphore>,
}

/// Redundant multi-tier evidence store
///
/// Cheap to clone; clones share tiers, catalog and the ingestion permit pool.
#[derive(Clone)]
pub struct EvidenceStore {
    inner: Arc<StoreInner>,
}

impl EvidenceStore {
    /// Assemble a store from its collaborators
    pub fn new(
        chain: TierChain,
        catalog: Arc<dyn CatalogEffects>,
        clock: Arc<dyn PhysicalTimeEffects>,
        options: StoreOptions,
    ) -> Self {
        let permits = options.max_concurrent_files.max(1);
        Self {
            inner: Arc::new(StoreInner {
                chain,
                catalog,
                clock,
                options,
                file_permits: Arc::new(Semaphore::new(permits)),
            }),
        }
    }

    /// Store backed by the tiers, filesystem catalog and system clock in `config`
    pub fn from_config(config: &SetuConfig) -> Result<Self, EvidenceError> {
        config.validate()?;
        let chain = TierChain::new(tiers_from_config(config)?)?;
        let catalog = Arc::new(FilesystemCatalog::open(&config.catalog.root)?);
        Ok(Self::new(
            chain,
            catalog,
            Arc::new(SystemClock),
            StoreOptions::from(config),
        ))
    }

    /// Configured tiers
    pub fn chain(&self) -> &TierChain {
        &self.inner.chain
    }

    /// Active options
    pub fn options(&self) -> &StoreOptions {
        &self.inner.options
    }

    /// Verification engine over this store's catalog
    pub fn verifier(&self) -> VerificationEngine {
        VerificationEngine::new(self.inner.catalog.clone())
    }

    /// Ingest a submission
    ///
    /// Each file runs as its own task: one file's total failure does not
    /// affect the others, and dropping the returned future does not undo tier
    /// writes already made. Fails as a whole only when the submission is
    /// empty or above `max_files_per_submission`.
    pub async fn ingest(
        &self,
        files: Vec<EvidenceUpload>,
        case_id: CaseId,
        officer_id: OfficerId,
    ) -> Result<IngestReport, EvidenceError> {
        let max = self.inner.options.max_files_per_submission;
        if files.is_empty() {
            return Err(EvidenceError::invalid("submission contains no files"));
        }
        if files.len() > max {
            return Err(EvidenceError::invalid(format!(
                "submission holds {} files, limit is {max}",
                files.len()
            )));
        }

        info!(
            case_id = %case_id,
            officer_id = %officer_id,
            files = files.len(),
            "Ingesting submission"
        );

        let mut names = Vec::with_capacity(files.len());
        let mut tasks = Vec::with_capacity(files.len());
        for upload in files {
            names.push(upload.file_name.clone());
            let store = self.clone();
            let case_id = case_id.clone();
            let officer_id = officer_id.clone();
            tasks.push(tokio::spawn(async move {
                let _permit = store
                    .inner
                    .file_permits
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| EvidenceError::internal(format!("ingest permits closed: {e}")))?;
                store.ingest_one(upload, &case_id, &officer_id).await
            }));
        }

        let mut report = IngestReport::default();
        for (file_name, joined) in names.into_iter().zip(join_all(tasks).await) {
            let outcome = joined.unwrap_or_else(|e| {
                Err(EvidenceError::internal(format!("ingest task failed: {e}")))
            });
            match outcome {
                Ok(ingested) => report.succeeded.push(ingested),
                Err(error) => report.failed.push(IngestFailure { file_name, error }),
            }
        }

        info!(
            case_id = %case_id,
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Submission ingested"
        );
        Ok(report)
    }

    /// Ingest a single file: fingerprint once, write every tier, catalog the result
    pub async fn ingest_one(
        &self,
        upload: EvidenceUpload,
        case_id: &CaseId,
        officer_id: &OfficerId,
    ) -> Result<IngestedEvidence, EvidenceError> {
        if upload.file_name.trim().is_empty() {
            return Err(EvidenceError::invalid("file name is empty"));
        }

        let digest = fingerprint(&upload.bytes);
        let ingested_at = self.inner.clock.now();
        let request = StoreRequest {
            case_id,
            officer_id,
            file_name: &upload.file_name,
            media_type: &upload.media_type,
            ingested_at,
            bytes: &upload.bytes,
        };

        let mut locations = TierLocations::default();
        let mut failures = Vec::new();
        for tier in self.inner.chain.iter() {
            let kind = tier.kind();
            match self
                .bounded(kind, TierOperation::Write, tier.store(request))
                .await
            {
                Ok(locator) => {
                    info!(
                        case_id = %case_id,
                        file_name = %upload.file_name,
                        tier = %kind,
                        locator = %locator,
                        "Tier stored evidence"
                    );
                    locations.set(kind, locator);
                }
                Err(e) => {
                    warn!(
                        case_id = %case_id,
                        file_name = %upload.file_name,
                        tier = %kind,
                        error = %e,
                        "Tier write failed"
                    );
                    failures.push(e);
                }
            }
        }

        if locations.is_empty() {
            error!(
                case_id = %case_id,
                file_name = %upload.file_name,
                "Every tier rejected the file"
            );
            return Err(EvidenceError::IngestFailed {
                file_name: upload.file_name,
                failures,
            });
        }

        let record = EvidenceRecord {
            id: RecordId::new(),
            case_id: case_id.clone(),
            officer_id: officer_id.clone(),
            file_name: upload.file_name,
            media_type: upload.media_type,
            size_bytes: upload.bytes.len() as u64,
            fingerprint: digest,
            tier_locations: locations,
            ledger_reference: LedgerReference::Pending,
            created_at: ingested_at,
        };
        self.inner.catalog.create_record(record.clone()).await?;
        info!(
            record_id = %record.id,
            case_id = %case_id,
            file_name = %record.file_name,
            replicas = record.tier_locations.count(),
            "Evidence record created"
        );

        Ok(IngestedEvidence {
            record,
            tier_failures: failures,
        })
    }

    /// Serve the golden copy, trying tiers in priority order
    pub async fn retrieve(&self, id: RecordId) -> Result<RetrievedEvidence, EvidenceError> {
        let record = self.record(id).await?;
        let mut attempts = Vec::new();

        for tier in self.inner.chain.iter() {
            let kind = tier.kind();
            let Some(locator) = record.tier_locations.get(kind) else {
                debug!(record_id = %id, tier = %kind, "No copy on tier, skipping");
                continue;
            };

            let bytes = match self
                .bounded(kind, TierOperation::Read, tier.fetch(locator))
                .await
            {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(
                        record_id = %id,
                        tier = %kind,
                        error = %e,
                        "Tier read failed, falling back"
                    );
                    attempts.push(e);
                    continue;
                }
            };

            if self.inner.options.verify_on_retrieve {
                let actual = fingerprint(&bytes);
                if actual != record.fingerprint {
                    warn!(
                        record_id = %id,
                        tier = %kind,
                        actual = %actual,
                        "Tier returned altered bytes, falling back"
                    );
                    attempts.push(TierError::IntegrityMismatch {
                        tier: kind,
                        expected: record.fingerprint.to_hex(),
                        actual: actual.to_hex(),
                    });
                    continue;
                }
            }

            info!(
                record_id = %id,
                tier = %kind,
                fallbacks = attempts.len(),
                "Evidence retrieved"
            );
            return Ok(RetrievedEvidence {
                record_id: id,
                file_name: record.file_name,
                media_type: record.media_type,
                bytes,
                served_by: kind,
                failed_attempts: attempts,
            });
        }

        error!(
            record_id = %id,
            attempts = attempts.len(),
            "Evidence unavailable on every tier"
        );
        Err(EvidenceError::EvidenceUnavailable { id, attempts })
    }

    /// Attach the anchoring reference to a record
    pub async fn confirm_anchor(
        &self,
        id: RecordId,
        reference: impl Into<String>,
    ) -> Result<EvidenceRecord, EvidenceError> {
        let reference = reference.into().trim().to_string();
        if reference.is_empty() || reference == LedgerReference::PENDING_SENTINEL {
            return Err(EvidenceError::invalid(
                "ledger reference must be a concrete anchor id",
            ));
        }

        let mut update = RecordUpdate::ledger(LedgerReference::Confirmed(reference));
        if self.inner.options.anchor_policy == AnchorPolicy::RejectReconfirmation {
            update = update.when(UpdatePrecondition::LedgerPending);
        }

        match self.inner.catalog.update_record(id, update).await {
            Ok(record) => {
                info!(record_id = %id, reference = %record.ledger_reference, "Anchor confirmed");
                Ok(record)
            }
            Err(e) if e.is_not_found() => Err(EvidenceError::RecordNotFound { id }),
            Err(SetuError::Conflict { .. }) => {
                let existing = self.record(id).await?.ledger_reference.to_string();
                warn!(record_id = %id, existing = %existing, "Record already anchored");
                Err(EvidenceError::AnchorAlreadyConfirmed { id, existing })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Confirm several records, reporting each outcome in order
    pub async fn confirm_anchors(&self, batch: Vec<(RecordId, String)>) -> Vec<AnchorOutcome> {
        let mut outcomes = Vec::with_capacity(batch.len());
        for (record_id, reference) in batch {
            let result = self.confirm_anchor(record_id, reference).await;
            outcomes.push(AnchorOutcome { record_id, result });
        }
        outcomes
    }

    /// Check every tier's copy against the recorded fingerprint
    pub async fn audit(&self, id: RecordId) -> Result<ReplicationAudit, EvidenceError> {
        let record = self.record(id).await?;
        let mut tiers = Vec::with_capacity(TierKind::PRIORITY.len());

        for kind in TierKind::PRIORITY {
            let locator = record.tier_locations.get(kind).map(str::to_string);
            let health = match (&locator, self.inner.chain.get(kind)) {
                (None, _) => TierHealth::NotReplicated,
                (Some(_), None) => TierHealth::Unreachable {
                    error: TierError::read(kind, "tier is not configured"),
                },
                (Some(locator), Some(tier)) => {
                    match self
                        .bounded(kind, TierOperation::Read, tier.fetch(locator))
                        .await
                    {
                        Ok(bytes) => {
                            let actual = fingerprint(&bytes);
                            if actual == record.fingerprint {
                                TierHealth::Intact
                            } else {
                                TierHealth::Corrupted { actual }
                            }
                        }
                        Err(error) => TierHealth::Unreachable { error },
                    }
                }
            };
            debug!(record_id = %id, tier = %kind, ?health, "Audited tier");
            tiers.push(TierAudit {
                tier: kind,
                locator,
                health,
            });
        }

        Ok(ReplicationAudit {
            record_id: id,
            fingerprint: record.fingerprint,
            tiers,
        })
    }

    /// One record by id
    pub async fn record(&self, id: RecordId) -> Result<EvidenceRecord, EvidenceError> {
        self.inner
            .catalog
            .get_record(id)
            .await?
            .ok_or(EvidenceError::RecordNotFound { id })
    }

    /// Catalog records, newest first
    pub async fn list(
        &self,
        case_id: Option<&CaseId>,
    ) -> Result<Vec<EvidenceRecord>, EvidenceError> {
        Ok(self.inner.catalog.list_records(case_id).await?)
    }

    /// Apply the remote-tier timeout; the local vault is never bounded
    async fn bounded<T, F>(
        &self,
        kind: TierKind,
        operation: TierOperation,
        call: F,
    ) -> Result<T, TierError>
    where
        F: Future<Output = Result<T, TierError>>,
    {
        if !kind.is_remote() {
            return call.await;
        }
        let limit = self.inner.options.remote_tier_timeout;
        tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| {
                Err(TierError::Timeout {
                    tier: kind,
                    operation,
                    elapsed_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })
            })
    }
}

impl std::fmt::Debug for EvidenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceStore")
            .field("tiers", &self.inner.chain)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
