//! Invocation errors.
//!
//! Every failed invocation surfaces as an [`InvocationError`] naming the
//! role, the operation and the failure kind. Nonces are never reclaimed
//! on failure.

use alloy::primitives::TxHash;
use std::fmt;
use thiserror::Error;

use crate::catalog::{ContractKind, NotAuthorized, Role, SchemaMismatch};
use crate::credentials::SigningError;
use crate::ledger::LedgerError;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Role lacks the operation. Local.
    NotAuthorized,
    /// Arguments do not fit the operation schema. Local.
    SchemaMismatch,
    /// Credential missing, malformed or for another address. Local.
    SigningError,
    /// No address configured for the target contract. Local.
    Misconfigured,
    /// The ledger refused or reverted the transaction.
    SubmissionRejected,
    /// Outcome unknown; reconcile through a receipt query.
    SubmissionTimedOut,
    /// No RPC endpoint could be reached.
    LedgerUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotAuthorized => "not_authorized",
            ErrorKind::SchemaMismatch => "schema_mismatch",
            ErrorKind::SigningError => "signing_error",
            ErrorKind::Misconfigured => "misconfigured",
            ErrorKind::SubmissionRejected => "submission_rejected",
            ErrorKind::SubmissionTimedOut => "submission_timed_out",
            ErrorKind::LedgerUnavailable => "ledger_unavailable",
        }
    }

    /// Whether retrying can help without changing the inputs.
    ///
    /// A timed-out submission is only safe to retry after a receipt query
    /// shows it never landed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::SubmissionTimedOut | ErrorKind::LedgerUnavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What went wrong, by pipeline stage.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    NotAuthorized(#[from] NotAuthorized),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatch),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("no address configured for {0}")]
    Misconfigured(ContractKind),

    #[error("submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    #[error("no confirmation within {deadline_ms} ms; the transaction may still be mined")]
    SubmissionTimedOut { deadline_ms: u64 },

    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[from] LedgerError),
}

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::NotAuthorized(_) => ErrorKind::NotAuthorized,
            RelayError::SchemaMismatch(_) => ErrorKind::SchemaMismatch,
            RelayError::Signing(_) => ErrorKind::SigningError,
            RelayError::Misconfigured(_) => ErrorKind::Misconfigured,
            RelayError::SubmissionRejected { .. } => ErrorKind::SubmissionRejected,
            RelayError::SubmissionTimedOut { .. } => ErrorKind::SubmissionTimedOut,
            RelayError::LedgerUnavailable(_) => ErrorKind::LedgerUnavailable,
        }
    }
}

/// A failed invocation, with enough context to act on it.
#[derive(Debug, Error)]
#[error("{operation} as {role} failed [{}]: {source}", .source.kind())]
pub struct InvocationError {
    pub role: Role,
    pub operation: String,
    /// Set once a transaction was signed; use it to query the receipt.
    pub tx_hash: Option<TxHash>,
    pub source: RelayError,
}

impl InvocationError {
    pub fn new(role: Role, operation: impl Into<String>, source: impl Into<RelayError>) -> Self {
        Self {
            role,
            operation: operation.into(),
            tx_hash: None,
            source: source.into(),
        }
    }

    pub fn with_tx_hash(mut self, tx_hash: TxHash) -> Self {
        self.tx_hash = Some(tx_hash);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}
