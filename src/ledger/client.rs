//! JSON-RPC ledger client with timeout and failover.
//!
//! # Responsibilities
//! - Connect to the primary and failover JSON-RPC endpoints
//! - Query nonces, receipts and block height
//! - Broadcast raw signed transactions
//! - Tell node refusals apart from transport failures
//!
//! A broadcast that timed out or failed in transit may still have reached
//! the node. After such a failure, an error reply from the next endpoint
//! is not trusted as a refusal; the transaction hash is returned and the
//! receipt decides.

use alloy::primitives::{keccak256, Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::transports::TransportResult;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LedgerConfig;
use crate::ledger::types::{LedgerError, LedgerResult, Receipt};
use crate::ledger::Ledger;
use crate::observability::metrics;

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Ledger reached over JSON-RPC, primary endpoint first.
#[derive(Clone)]
pub struct RpcLedger {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    config: LedgerConfig,
    timeout_duration: Duration,
}

impl RpcLedger {
    /// Connect to the configured endpoints.
    ///
    /// An unreachable node is not fatal here (it is reported on first use),
    /// but a node on the wrong chain is.
    pub async fn connect(config: LedgerConfig) -> LedgerResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            LedgerError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as DynProvider);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        let ledger = Self {
            providers,
            config,
            timeout_duration,
        };

        match ledger.verify_chain_id().await {
            Ok(()) => {
                tracing::info!(
                    rpc_url = %ledger.config.rpc_url,
                    chain_id = ledger.config.chain_id,
                    "Ledger client initialized"
                );
            }
            Err(e @ LedgerError::ChainMismatch { .. }) => return Err(e),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Ledger client initialized but chain verification failed"
                );
            }
        }

        Ok(ledger)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> LedgerResult<()> {
        let actual = self
            .with_failover("eth_chainId", |p| async move { p.get_chain_id().await })
            .await?;
        if actual != self.config.chain_id {
            return Err(LedgerError::ChainMismatch {
                expected: self.config.chain_id,
                actual,
            });
        }
        Ok(())
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Run `call` against each provider in turn until one answers.
    async fn with_failover<T, F, Fut>(&self, method: &'static str, call: F) -> LedgerResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut timeouts = 0;
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    metrics::record_rpc_failure(method, "error");
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    timeouts += 1;
                    metrics::record_rpc_failure(method, "timeout");
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                }
            }
        }
        Err(self.exhausted(method, timeouts))
    }

    fn exhausted(&self, method: &str, timeouts: usize) -> LedgerError {
        if timeouts == self.providers.len() {
            LedgerError::Timeout(self.config.rpc_timeout_secs)
        } else {
            LedgerError::Rpc(format!("All RPC providers failed for {}", method))
        }
    }
}

/// Replies meaning the node already holds this exact transaction.
const KNOWN_TX_REPLIES: &[&str] = &[
    "already known",
    "known transaction",
    "already imported",
    "alreadyknown",
];

/// Reading of an error reply to `eth_sendRawTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BroadcastReply {
    /// The node already has the transaction.
    Known,
    /// An earlier attempt may have landed; only the receipt can tell.
    Unknown,
    Refused,
}

fn classify_reply(message: &str, earlier_attempt_lost: bool) -> BroadcastReply {
    let message = message.to_ascii_lowercase();
    if KNOWN_TX_REPLIES.iter().any(|known| message.contains(known)) {
        BroadcastReply::Known
    } else if earlier_attempt_lost {
        BroadcastReply::Unknown
    } else {
        BroadcastReply::Refused
    }
}

fn to_receipt(receipt: TransactionReceipt) -> Receipt {
    if receipt.status() {
        Receipt::confirmed(
            receipt.transaction_hash,
            receipt.block_number.unwrap_or_default(),
            receipt.gas_used,
        )
    } else {
        Receipt {
            gas_used: receipt.gas_used,
            ..Receipt::rejected(
                receipt.transaction_hash,
                receipt.block_number,
                "execution reverted",
            )
        }
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn sequence_number(&self, address: Address) -> LedgerResult<u64> {
        self.with_failover("eth_getTransactionCount", |p| async move {
            p.get_transaction_count(address).pending().await
        })
        .await
    }

    async fn submit_raw(&self, raw: &[u8]) -> LedgerResult<TxHash> {
        const METHOD: &str = "eth_sendRawTransaction";
        let tx_hash = keccak256(raw);
        let mut earlier_attempt_lost = false;
        let mut timeouts = 0;

        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, provider.send_raw_transaction(raw)).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                Ok(Err(e)) => {
                    if let Some(payload) = e.as_error_resp() {
                        match classify_reply(&payload.message, earlier_attempt_lost) {
                            BroadcastReply::Known => {
                                tracing::debug!(provider_idx = i, tx_hash = %tx_hash, "Node already holds transaction");
                                return Ok(tx_hash);
                            }
                            BroadcastReply::Unknown => {
                                tracing::warn!(
                                    provider_idx = i,
                                    tx_hash = %tx_hash,
                                    reply = %payload.message,
                                    "Error reply after a lost broadcast, waiting for receipt"
                                );
                                return Ok(tx_hash);
                            }
                            // Every node would say the same.
                            BroadcastReply::Refused => {
                                metrics::record_rpc_failure(METHOD, "refused");
                                return Err(LedgerError::Refused(payload.message.to_string()));
                            }
                        }
                    }
                    earlier_attempt_lost = true;
                    metrics::record_rpc_failure(METHOD, "error");
                    tracing::warn!(provider_idx = i, error = %e, "Broadcast failed, trying next provider");
                }
                Err(_) => {
                    earlier_attempt_lost = true;
                    timeouts += 1;
                    metrics::record_rpc_failure(METHOD, "timeout");
                    tracing::warn!(provider_idx = i, "Broadcast timeout, trying next provider");
                }
            }
        }
        Err(self.exhausted(METHOD, timeouts))
    }

    async fn receipt(&self, tx_hash: TxHash) -> LedgerResult<Option<Receipt>> {
        let receipt = self
            .with_failover("eth_getTransactionReceipt", |p| async move {
                p.get_transaction_receipt(tx_hash).await
            })
            .await?;
        Ok(receipt.map(to_receipt))
    }

    async fn block_number(&self) -> LedgerResult<u64> {
        self.with_failover("eth_blockNumber", |p| async move { p.get_block_number().await })
            .await
    }
}

impl std::fmt::Debug for RpcLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcLedger")
            .field("rpc_url", &self.config.rpc_url)
            .field("failovers", &self.config.failover_urls.len())
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
