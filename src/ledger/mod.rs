//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Nonce sequencer  ──sequence_number──▶ ┐
//! Submitter        ──submit_raw───────▶ ├─ Ledger (trait) ─▶ RpcLedger ─▶ JSON-RPC node(s)
//!                  ──receipt──────────▶ │
//!                  ──block_number─────▶ ┘
//! ```
//!
//! # Constraints
//! - All RPC calls have configurable timeouts
//! - Primary endpoint first, failover endpoints in order
//! - Never log raw transactions or key material

pub mod client;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod types;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;

pub use client::RpcLedger;
pub use types::{LedgerError, LedgerResult, Receipt, TxStatus};

/// The remote ledger the relay submits to.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Next sequence number (pending transaction count) for `address`.
    async fn sequence_number(&self, address: Address) -> LedgerResult<u64>;

    /// Broadcast a signed, EIP-2718 encoded transaction.
    async fn submit_raw(&self, raw: &[u8]) -> LedgerResult<TxHash>;

    /// Receipt for `tx_hash`, `None` while it is not mined.
    async fn receipt(&self, tx_hash: TxHash) -> LedgerResult<Option<Receipt>>;

    /// Latest block number.
    async fn block_number(&self) -> LedgerResult<u64>;
}
