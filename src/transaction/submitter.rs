//! Broadcast and confirmation monitoring.
//!
//! # States
//! ```text
//! submit ─▶ Pending ─┬─▶ Confirmed   receipt ok and deep enough
//!                    ├─▶ Rejected    reverted, or refused by the node
//!                    └─▶ TimedOut    deadline passed; outcome unknown
//! ```
//! A timed-out transaction may still be mined. Callers reconcile through
//! `query`, never by resubmitting blindly. Nothing here retries.

use alloy::primitives::TxHash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::ledger::{Ledger, LedgerError, LedgerResult, Receipt, TxStatus};
use crate::transaction::types::SignedTransaction;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Terminal result of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Confirmed(Receipt),
    Rejected(Receipt),
    /// No confirmation before the deadline. Not a failure.
    TimedOut(TxHash),
}

/// Pushes signed transactions to the ledger and waits for receipts.
pub struct Submitter {
    ledger: Arc<dyn Ledger>,
    poll_interval: Duration,
    confirmation_blocks: u32,
}

impl Submitter {
    pub fn new(ledger: Arc<dyn Ledger>, poll_interval: Duration, confirmation_blocks: u32) -> Self {
        Self {
            ledger,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            confirmation_blocks: confirmation_blocks.max(1),
        }
    }

    /// Broadcast `signed` and wait up to `deadline` for a final receipt.
    ///
    /// Returns `Err` only when the broadcast itself could not reach any node.
    pub async fn submit(
        &self,
        signed: &SignedTransaction,
        deadline: Duration,
    ) -> LedgerResult<SubmissionOutcome> {
        match timeout(deadline, self.submit_and_wait(signed)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    tx_hash = %signed.hash,
                    deadline_ms = deadline.as_millis() as u64,
                    "No confirmation before deadline"
                );
                Ok(SubmissionOutcome::TimedOut(signed.hash))
            }
        }
    }

    async fn submit_and_wait(&self, signed: &SignedTransaction) -> LedgerResult<SubmissionOutcome> {
        let tx_hash = match self.ledger.submit_raw(&signed.raw).await {
            Ok(hash) => hash,
            Err(LedgerError::Refused(reason)) => {
                tracing::warn!(tx_hash = %signed.hash, reason = %reason, "Transaction refused");
                return Ok(SubmissionOutcome::Rejected(Receipt::rejected(
                    signed.hash,
                    None,
                    reason,
                )));
            }
            Err(e) => return Err(e),
        };
        if tx_hash != signed.hash {
            tracing::warn!(local = %signed.hash, remote = %tx_hash, "Node reported a different transaction hash");
        }
        tracing::info!(tx_hash = %tx_hash, nonce = signed.nonce(), "Transaction broadcast");

        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;

            match self.query(tx_hash).await {
                Ok(TxStatus::Pending) => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                }
                Ok(TxStatus::Confirmed(receipt)) => {
                    tracing::info!(
                        tx_hash = %tx_hash,
                        block_number = receipt.block_number,
                        "Transaction confirmed"
                    );
                    return Ok(SubmissionOutcome::Confirmed(receipt));
                }
                Ok(TxStatus::Rejected(receipt)) => {
                    tracing::warn!(tx_hash = %tx_hash, "Transaction reverted");
                    return Ok(SubmissionOutcome::Rejected(receipt));
                }
                // Already broadcast; keep polling until the deadline decides.
                Err(e) => {
                    tracing::warn!(tx_hash = %tx_hash, error = %e, "Receipt poll failed");
                }
            }
        }
    }

    /// Current status of `tx_hash`. Safe to call any number of times.
    pub async fn query(&self, tx_hash: TxHash) -> LedgerResult<TxStatus> {
        let receipt = match self.ledger.receipt(tx_hash).await? {
            Some(r) => r,
            None => return Ok(TxStatus::Pending),
        };

        if !receipt.success {
            return Ok(TxStatus::Rejected(receipt));
        }

        if self.confirmation_blocks > 1 {
            let current = self.ledger.block_number().await?;
            let mined = receipt.block_number.unwrap_or(current);
            let confirmations = current.saturating_sub(mined) + 1;
            if confirmations < self.confirmation_blocks as u64 {
                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations,
                    required = self.confirmation_blocks,
                    "Waiting for confirmations"
                );
                return Ok(TxStatus::Pending);
            }
        }

        Ok(TxStatus::Confirmed(receipt))
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("poll_interval", &self.poll_interval)
            .field("confirmation_blocks", &self.confirmation_blocks)
            .finish()
    }
}
