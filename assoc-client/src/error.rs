//! Error types for brandassoc-client.

use std::fmt;

use brandassoc_core::{FailureKind, TxFailure};
use brandassoc_types::{CodecError, RecordId};
use thiserror::Error;

use crate::backend::BackendError;
use crate::encrypt::EncryptError;
use crate::store::StoreError;

/// Which half of the two-phase write an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePhase {
    /// Writing the record blob.
    Record,
    /// Appending the id to the index.
    Index,
}

impl fmt::Display for WritePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record => f.write_str("record write"),
            Self::Index => f.write_str("index append"),
        }
    }
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No account is bound to the session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The backend reported itself unavailable.
    #[error("service unavailable")]
    Unavailable,

    /// Another write is still pending.
    #[error("a write is already pending")]
    Busy,

    /// Input rejected before any I/O.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The encryption collaborator failed.
    #[error("encryption failed: {0}")]
    Encryption(#[from] EncryptError),

    /// The signing identity declined a write.
    #[error("{phase} declined by user: {reason}")]
    UserDeclined {
        /// Phase that was declined.
        phase: WritePhase,
        /// Record left unreferenced when the index phase was declined.
        orphan: Option<RecordId>,
        /// Reason reported by the signer.
        reason: String,
    },

    /// The record write failed; the index was not touched.
    #[error("record write failed: {0}")]
    RecordWrite(#[source] BackendError),

    /// The record was written but the index append failed.
    #[error("index append failed, record {id} is orphaned: {source}")]
    IndexAppend {
        /// The orphaned record.
        id: RecordId,
        /// Underlying failure.
        source: StoreError,
    },

    /// Backend error outside the write phases.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl ClientError {
    /// Map a record-phase backend failure.
    pub(crate) fn record_phase(error: BackendError) -> Self {
        match error {
            BackendError::Declined(reason) => Self::UserDeclined {
                phase: WritePhase::Record,
                orphan: None,
                reason,
            },
            other => Self::RecordWrite(other),
        }
    }

    /// Map an index-phase failure for the already written `id`.
    pub(crate) fn index_phase(id: RecordId, error: StoreError) -> Self {
        match error {
            StoreError::Backend(BackendError::Declined(reason)) => Self::UserDeclined {
                phase: WritePhase::Index,
                orphan: Some(id),
                reason,
            },
            source => Self::IndexAppend { id, source },
        }
    }

    /// Record left written but unindexed by this failure, if any.
    pub fn orphan(&self) -> Option<&RecordId> {
        match self {
            Self::IndexAppend { id, .. } => Some(id),
            Self::UserDeclined { orphan, .. } => orphan.as_ref(),
            _ => None,
        }
    }

    /// Message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::UserDeclined { .. } => "Transaction rejected by user".to_string(),
            Self::NotAuthenticated => "Please connect wallet first".to_string(),
            Self::InvalidInput(reason) => reason.clone(),
            other => format!("Submission failed: {other}"),
        }
    }

    /// Classification for [`brandassoc_core::TxStatus::Failed`].
    ///
    /// Errors raised before anything was written map to
    /// [`FailureKind::RecordWrite`] unless they have a closer match.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Unavailable | Self::Backend(BackendError::Unavailable) => {
                FailureKind::Unavailable
            }
            Self::Encryption(_) => FailureKind::Encryption,
            Self::UserDeclined { orphan, .. } => FailureKind::Declined {
                orphan: orphan.clone(),
            },
            Self::IndexAppend { id, .. } => FailureKind::IndexAppend { orphan: id.clone() },
            _ => FailureKind::RecordWrite,
        }
    }

    /// Build the status machine failure for this error.
    pub fn to_failure(&self) -> TxFailure {
        TxFailure {
            kind: self.failure_kind(),
            message: self.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> RecordId {
        RecordId::parse("1-a").unwrap()
    }

    #[test]
    fn declined_record_phase_is_user_declined_without_orphan() {
        let err = ClientError::record_phase(BackendError::Declined("user rejected".into()));
        assert!(matches!(
            err,
            ClientError::UserDeclined {
                phase: WritePhase::Record,
                orphan: None,
                ..
            }
        ));
        assert_eq!(err.user_message(), "Transaction rejected by user");
        assert!(err.orphan().is_none());
    }

    #[test]
    fn declined_index_phase_keeps_orphan() {
        let err = ClientError::index_phase(
            id(),
            StoreError::Backend(BackendError::Declined("no".into())),
        );
        assert_eq!(err.orphan(), Some(&id()));
        assert_eq!(
            err.failure_kind(),
            FailureKind::Declined { orphan: Some(id()) }
        );
    }

    #[test]
    fn record_and_index_failures_are_distinct() {
        let record = ClientError::record_phase(BackendError::Failed("gas".into()));
        let index = ClientError::index_phase(
            id(),
            StoreError::Backend(BackendError::Failed("gas".into())),
        );

        assert_eq!(record.failure_kind(), FailureKind::RecordWrite);
        assert_eq!(index.failure_kind(), FailureKind::IndexAppend { orphan: id() });
        assert!(record.orphan().is_none());
        assert_eq!(index.orphan(), Some(&id()));
    }

    #[test]
    fn generic_failure_message() {
        let err = ClientError::record_phase(BackendError::Failed("out of gas".into()));
        assert_eq!(
            err.user_message(),
            "Submission failed: record write failed: backend request failed: out of gas"
        );
    }

    #[test]
    fn unavailable_classification() {
        assert_eq!(
            ClientError::Unavailable.failure_kind(),
            FailureKind::Unavailable
        );
        assert_eq!(
            ClientError::Backend(BackendError::Unavailable).failure_kind(),
            FailureKind::Unavailable
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientError>();
    }
}
