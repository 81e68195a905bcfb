//! Scripted in-memory ledger.
//!
//! Mines every accepted transaction in the next block. Every trait call is
//! counted, so tests can assert that a local failure never reached the
//! ledger.

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{keccak256, Address, TxHash};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::ledger::types::{LedgerError, LedgerResult, Receipt};
use crate::ledger::Ledger;

#[derive(Debug, Default)]
pub struct MockLedger {
    nonces: Mutex<HashMap<Address, u64>>,
    receipts: Mutex<HashMap<TxHash, Receipt>>,
    submitted: Mutex<Vec<Vec<u8>>>,
    hold: AtomicBool,
    revert: Mutex<Option<String>>,
    refuse: Mutex<Option<String>>,
    block: AtomicU64,
    calls: AtomicUsize,
}

impl MockLedger {
    pub fn with_nonce(address: Address, nonce: u64) -> Self {
        let ledger = Self::default();
        ledger.set_nonce(address, nonce);
        ledger
    }

    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.nonces.lock().unwrap().insert(address, nonce);
    }

    /// Withhold receipts, as if nothing gets mined.
    pub fn hold(&self, hold: bool) {
        self.hold.store(hold, Ordering::SeqCst);
    }

    /// Mine every later transaction as reverted.
    pub fn revert_with(&self, reason: &str) {
        *self.revert.lock().unwrap() = Some(reason.to_string());
    }

    /// Refuse every later broadcast.
    pub fn refuse_with(&self, reason: &str) {
        *self.refuse.lock().unwrap() = Some(reason.to_string());
    }

    pub fn set_block(&self, block: u64) {
        self.block.store(block, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Raw bytes of every accepted broadcast, in order.
    pub fn submitted(&self) -> Vec<Vec<u8>> {
        self.submitted.lock().unwrap().clone()
    }

    /// Accepted broadcasts, decoded.
    pub fn submitted_envelopes(&self) -> Vec<TxEnvelope> {
        self.submitted()
            .iter()
            .map(|raw| TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap())
            .collect()
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn sequence_number(&self, address: Address) -> LedgerResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.nonces.lock().unwrap().get(&address).copied().unwrap_or(0))
    }

    async fn submit_raw(&self, raw: &[u8]) -> LedgerResult<TxHash> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.refuse.lock().unwrap().clone() {
            return Err(LedgerError::Refused(reason));
        }
        let tx_hash = keccak256(raw);
        let block = self.block.fetch_add(1, Ordering::SeqCst) + 1;
        let receipt = match self.revert.lock().unwrap().clone() {
            Some(reason) => Receipt::rejected(tx_hash, Some(block), reason),
            None => Receipt::confirmed(tx_hash, block, 21_000),
        };
        self.receipts.lock().unwrap().insert(tx_hash, receipt);
        self.submitted.lock().unwrap().push(raw.to_vec());
        Ok(tx_hash)
    }

    async fn receipt(&self, tx_hash: TxHash) -> LedgerResult<Option<Receipt>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hold.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn block_number(&self) -> LedgerResult<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.block.load(Ordering::SeqCst))
    }
}
