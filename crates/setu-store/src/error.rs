//! Store errors
//!
//! Tier failures never surface on their own. They are absorbed into
//! [`EvidenceError::EvidenceUnavailable`] or [`EvidenceError::IngestFailed`]
//! once no tier is left to try.

use serde::Serialize;
use setu_core::{RecordId, SetuError, TierError};
use thiserror::Error;

/// Terminal outcome of a store operation
#[derive(Debug, Clone, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceError {
    /// The catalog holds no record with this id
    #[error("evidence record {id} not found")]
    RecordNotFound {
        /// Requested id
        id: RecordId,
    },

    /// Every tier holding a copy failed
    #[error("evidence {id} is unavailable: {} tier attempt(s) failed", attempts.len())]
    EvidenceUnavailable {
        /// Requested id
        id: RecordId,
        /// One error per tier attempted, in priority order
        attempts: Vec<TierError>,
    },

    /// No tier accepted the file
    #[error("no tier accepted {file_name}")]
    IngestFailed {
        /// File that could not be stored
        file_name: String,
        /// One error per tier, in priority order
        failures: Vec<TierError>,
    },

    /// The record already carries a ledger reference
    #[error("evidence record {id} is already anchored to {existing}")]
    AnchorAlreadyConfirmed {
        /// Record that was targeted
        id: RecordId,
        /// Reference already stored
        existing: String,
    },

    /// The request itself is malformed
    #[error("invalid submission: {reason}")]
    InvalidSubmission {
        /// What is wrong with it
        reason: String,
    },

    /// The catalog collaborator failed
    #[error("catalog error: {0}")]
    Catalog(#[from] SetuError),

    /// Bug or runtime failure inside the store
    #[error("internal error: {message}")]
    Internal {
        /// Description
        message: String,
    },
}

impl EvidenceError {
    /// Create an invalid-submission error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSubmission {
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use setu_core::TierKind;

    #[test]
    fn test_messages() {
        let id = RecordId::new();
        let err = EvidenceError::EvidenceUnavailable {
            id,
            attempts: vec![
                TierError::read(TierKind::ContentNetwork, "down"),
                TierError::not_found(TierKind::LocalVault, "x"),
            ],
        };
        assert_eq!(
            err.to_string(),
            format!("evidence {id} is unavailable: 2 tier attempt(s) failed")
        );

        let err: EvidenceError = SetuError::storage("disk full").into();
        assert!(err.to_string().contains("disk full"));
    }
}
