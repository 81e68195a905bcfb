//! Ledger-facing types and error definitions.

use alloy::primitives::TxHash;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered but refused the transaction (nonce too low,
    /// insufficient funds, ...).
    #[error("transaction refused by node: {0}")]
    Refused(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Terminal record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    /// Whether execution succeeded.
    pub success: bool,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Set when `success` is false.
    pub failure_reason: Option<String>,
}

impl Receipt {
    /// A receipt for a transaction that executed successfully.
    pub fn confirmed(tx_hash: TxHash, block_number: u64, gas_used: u64) -> Self {
        Self {
            tx_hash,
            success: true,
            block_number: Some(block_number),
            gas_used,
            failure_reason: None,
        }
    }

    /// A receipt for a transaction the ledger did not apply.
    pub fn rejected(tx_hash: TxHash, block_number: Option<u64>, reason: impl Into<String>) -> Self {
        Self {
            tx_hash,
            success: false,
            block_number,
            gas_used: 0,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Observed state of a transaction, as returned by a receipt query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "receipt", rename_all = "snake_case")]
pub enum TxStatus {
    /// Not mined yet, or not deep enough.
    Pending,
    /// Mined and executed successfully.
    Confirmed(Receipt),
    /// Mined but reverted.
    Rejected(Receipt),
}

impl TxStatus {
    pub fn is_final(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}
