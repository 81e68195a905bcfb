//! Per-sender nonce allocation.
//!
//! Each sender has its own async mutex. The first allocation seeds the
//! counter from the ledger's pending transaction count; later allocations
//! increment locally. Allocated nonces are never handed back, even when
//! the transaction using them fails. `resync` is the only way to move the
//! counter other than forward by one.

use alloy::primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::ledger::{Ledger, LedgerResult};

/// `None` until seeded from the ledger.
type Slot = Arc<Mutex<Option<u64>>>;

/// Hands out strictly increasing nonces per sender.
pub struct NonceSequencer {
    ledger: Arc<dyn Ledger>,
    senders: DashMap<Address, Slot>,
}

impl NonceSequencer {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            senders: DashMap::new(),
        }
    }

    fn slot(&self, sender: Address) -> Slot {
        // Clone the Arc out so the shard lock is released before awaiting.
        self.senders.entry(sender).or_default().value().clone()
    }

    /// Allocate the next nonce for `sender`.
    pub async fn next(&self, sender: Address) -> LedgerResult<u64> {
        let slot = self.slot(sender);
        let mut state = slot.lock().await;

        let nonce = match *state {
            Some(n) => n,
            None => {
                let seeded = self.ledger.sequence_number(sender).await?;
                tracing::debug!(sender = %sender, nonce = seeded, "Nonce seeded from ledger");
                seeded
            }
        };
        *state = Some(nonce + 1);
        Ok(nonce)
    }

    /// Re-read the ledger's nonce for `sender` and overwrite local state.
    ///
    /// Returns the nonce the next allocation will use.
    pub async fn resync(&self, sender: Address) -> LedgerResult<u64> {
        let slot = self.slot(sender);
        let mut state = slot.lock().await;

        let on_chain = self.ledger.sequence_number(sender).await?;
        if let Some(local) = *state {
            if local != on_chain {
                tracing::warn!(
                    sender = %sender,
                    local,
                    ledger = on_chain,
                    "Nonce resync changed local state"
                );
            }
        }
        *state = Some(on_chain);
        Ok(on_chain)
    }

    /// Next nonce that would be allocated, if the sender has been seeded.
    pub async fn peek(&self, sender: Address) -> Option<u64> {
        let slot = self.senders.get(&sender)?.value().clone();
        let state = slot.lock().await;
        *state
    }
}

impl std::fmt::Debug for NonceSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceSequencer")
            .field("senders", &self.senders.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::MockLedger;
    use futures_util::future::join_all;

    #[tokio::test]
    async fn test_seed_then_increment() {
        let sender = Address::repeat_byte(0x01);
        let ledger = Arc::new(MockLedger::with_nonce(sender, 5));
        let sequencer = NonceSequencer::new(ledger.clone());

        assert_eq!(sequencer.peek(sender).await, None);
        assert_eq!(sequencer.next(sender).await.unwrap(), 5);
        assert_eq!(sequencer.next(sender).await.unwrap(), 6);
        assert_eq!(sequencer.next(sender).await.unwrap(), 7);
        assert_eq!(sequencer.peek(sender).await, Some(8));

        // Only the first allocation touches the ledger.
        assert_eq!(ledger.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_distinct() {
        let sender = Address::repeat_byte(0x02);
        let ledger = Arc::new(MockLedger::with_nonce(sender, 10));
        let sequencer = Arc::new(NonceSequencer::new(ledger.clone()));

        let tasks = (0..64).map(|_| {
            let sequencer = sequencer.clone();
            tokio::spawn(async move { sequencer.next(sender).await.unwrap() })
        });
        let mut nonces: Vec<u64> = join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        nonces.sort_unstable();

        assert_eq!(nonces, (10..74).collect::<Vec<_>>());
        assert_eq!(ledger.calls(), 1);
    }

    #[tokio::test]
    async fn test_senders_are_independent() {
        let a = Address::repeat_byte(0x0a);
        let b = Address::repeat_byte(0x0b);
        let ledger = Arc::new(MockLedger::with_nonce(a, 3));
        ledger.set_nonce(b, 100);
        let sequencer = NonceSequencer::new(ledger);

        assert_eq!(sequencer.next(a).await.unwrap(), 3);
        assert_eq!(sequencer.next(b).await.unwrap(), 100);
        assert_eq!(sequencer.next(a).await.unwrap(), 4);
        assert_eq!(sequencer.next(b).await.unwrap(), 101);
    }

    #[tokio::test]
    async fn test_resync_overwrites_local_state() {
        let sender = Address::repeat_byte(0x03);
        let ledger = Arc::new(MockLedger::with_nonce(sender, 0));
        let sequencer = NonceSequencer::new(ledger.clone());

        assert_eq!(sequencer.next(sender).await.unwrap(), 0);
        assert_eq!(sequencer.next(sender).await.unwrap(), 1);

        // Someone else sent three transactions from this account.
        ledger.set_nonce(sender, 5);
        assert_eq!(sequencer.resync(sender).await.unwrap(), 5);
        assert_eq!(sequencer.next(sender).await.unwrap(), 5);
    }
}
