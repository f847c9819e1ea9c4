//! Verification Engine
//!
//! Hashes a candidate file and compares the digest against the fingerprint
//! recorded at ingestion. When an anchoring ledger is wired in, the digest is
//! also compared against the fingerprint the ledger attests to.

use futures::future::join_all;
use serde::Serialize;
use setu_core::{
    fingerprint, AnchorLedgerEffects, CaseId, CatalogEffects, EvidenceRecord, Fingerprint,
    RecordId,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::EvidenceError;

/// How to find the record a candidate claims to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLookup {
    /// Exact record
    Id(RecordId),
    /// Most recent record with this file name in the case
    CaseAndName {
        /// Case to search
        case_id: CaseId,
        /// File name to match
        file_name: String,
    },
}

/// Outcome of comparing the candidate against the anchored fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum AnchorCheck {
    /// The record has not been anchored yet
    Pending,
    /// No ledger is configured
    NotChecked,
    /// The ledger attests to the candidate's fingerprint
    Matched,
    /// The ledger attests to a different fingerprint
    Mismatched {
        /// Fingerprint on the ledger
        anchored: Fingerprint,
    },
    /// The ledger could not answer
    LookupFailed {
        /// Why
        message: String,
    },
}

/// Classification of one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verdict")]
pub enum VerificationResult {
    /// Digests match and the ledger does not contradict them
    Authentic {
        /// Matching record
        record_id: RecordId,
        /// The shared digest
        fingerprint: Fingerprint,
        /// Ledger comparison
        anchor: AnchorCheck,
    },
    /// A record exists but the candidate differs from it
    Tampered {
        /// Matching record
        record_id: RecordId,
        /// Fingerprint recorded at ingestion
        original: Fingerprint,
        /// Fingerprint of the candidate
        candidate: Fingerprint,
        /// Ledger comparison
        anchor: AnchorCheck,
    },
    /// No record to compare against
    Unresolvable {
        /// Fingerprint of the candidate
        candidate: Fingerprint,
    },
}

impl VerificationResult {
    /// Whether the candidate is certified authentic
    pub fn is_authentic(&self) -> bool {
        matches!(self, Self::Authentic { .. })
    }

    /// Fingerprint of the candidate
    pub fn candidate(&self) -> Fingerprint {
        match self {
            Self::Authentic { fingerprint, .. } => *fingerprint,
            Self::Tampered { candidate, .. } | Self::Unresolvable { candidate } => *candidate,
        }
    }
}

/// A file submitted for verification
#[derive(Clone)]
pub struct VerificationCandidate {
    /// Name used for `(case, file name)` lookups
    pub file_name: String,
    /// Bytes to check
    pub bytes: Vec<u8>,
}

impl VerificationCandidate {
    /// Bundle a candidate
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

impl fmt::Debug for VerificationCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationCandidate")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Per-candidate batch entry
#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    /// Name the candidate was submitted under
    pub file_name: String,
    /// Fingerprint of the candidate
    pub candidate: Fingerprint,
    /// Classification, or the catalog failure for this item alone
    pub result: Result<VerificationResult, EvidenceError>,
}

/// Fingerprint comparison against the catalog and, optionally, the ledger
#[derive(Clone)]
pub struct VerificationEngine {
    catalog: Arc<dyn CatalogEffects>,
    ledger: Option<Arc<dyn AnchorLedgerEffects>>,
}

impl VerificationEngine {
    /// Engine reading records from `catalog`
    pub fn new(catalog: Arc<dyn CatalogEffects>) -> Self {
        Self {
            catalog,
            ledger: None,
        }
    }

    /// Also check anchored fingerprints
    pub fn with_ledger(mut self, ledger: Arc<dyn AnchorLedgerEffects>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Classify one candidate
    pub async fn verify(
        &self,
        bytes: &[u8],
        lookup: &RecordLookup,
    ) -> Result<VerificationResult, EvidenceError> {
        let candidate = fingerprint(bytes);
        let record = match lookup {
            RecordLookup::Id(id) => self.catalog.get_record(*id).await?,
            RecordLookup::CaseAndName { case_id, file_name } => {
                self.catalog
                    .find_by_case_and_name(case_id, file_name)
                    .await?
            }
        };

        let Some(record) = record else {
            debug!(?lookup, candidate = %candidate, "No record to verify against");
            return Ok(VerificationResult::Unresolvable { candidate });
        };

        let anchor = self.check_anchor(&record, candidate).await;
        let result = if record.fingerprint == candidate
            && !matches!(anchor, AnchorCheck::Mismatched { .. })
        {
            VerificationResult::Authentic {
                record_id: record.id,
                fingerprint: candidate,
                anchor,
            }
        } else {
            warn!(
                record_id = %record.id,
                case_id = %record.case_id,
                original = %record.fingerprint,
                candidate = %candidate,
                "Candidate does not match recorded evidence"
            );
            VerificationResult::Tampered {
                record_id: record.id,
                original: record.fingerprint,
                candidate,
                anchor,
            }
        };
        Ok(result)
    }

    /// Classify many candidates, preserving order
    ///
    /// `record_id` takes precedence over `case_id`; with neither, every
    /// candidate is unresolvable.
    pub async fn verify_batch(
        &self,
        candidates: Vec<VerificationCandidate>,
        case_id: Option<&CaseId>,
        record_id: Option<RecordId>,
    ) -> Vec<VerificationOutcome> {
        let checks = candidates.into_iter().map(|c| async move {
            let lookup = match (record_id, case_id) {
                (Some(id), _) => Some(RecordLookup::Id(id)),
                (None, Some(case_id)) => Some(RecordLookup::CaseAndName {
                    case_id: case_id.clone(),
                    file_name: c.file_name.clone(),
                }),
                (None, None) => None,
            };
            let candidate = fingerprint(&c.bytes);
            let result = match lookup {
                Some(lookup) => self.verify(&c.bytes, &lookup).await,
                None => Ok(VerificationResult::Unresolvable { candidate }),
            };
            VerificationOutcome {
                file_name: c.file_name,
                candidate,
                result,
            }
        });
        join_all(checks).await
    }

    async fn check_anchor(&self, record: &EvidenceRecord, candidate: Fingerprint) -> AnchorCheck {
        let Some(reference) = record.ledger_reference.confirmed() else {
            return AnchorCheck::Pending;
        };
        let Some(ledger) = &self.ledger else {
            return AnchorCheck::NotChecked;
        };
        match ledger.anchored_fingerprint(reference).await {
            Ok(Some(anchored)) if anchored == candidate => AnchorCheck::Matched,
            Ok(Some(anchored)) => AnchorCheck::Mismatched { anchored },
            Ok(None) => AnchorCheck::LookupFailed {
                message: format!("ledger has no entry for {reference}"),
            },
            Err(e) => {
                warn!(record_id = %record.id, error = %e, "Ledger lookup failed");
                AnchorCheck::LookupFailed {
                    message: e.to_string(),
                }
            }
        }
    }
}

impl fmt::Debug for VerificationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationEngine")
            .field("ledger", &self.ledger.is_some())
            .finish_non_exhaustive()
    }
}
