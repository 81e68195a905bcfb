//! Transaction envelopes.

use alloy::consensus::{SignableTransaction, TxLegacy};
use alloy::primitives::{Address, Bytes, Signature, TxHash, TxKind, B256, U256};
use serde::Serialize;

use crate::config::LimitsConfig;

/// Gas ceiling and price applied to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceLimits {
    pub gas_limit: u64,
    /// Price per gas unit in wei.
    pub gas_price: u128,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for ResourceLimits {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            gas_limit: config.gas_limit,
            gas_price: config.gas_price_gwei as u128 * 1_000_000_000,
        }
    }
}

/// A fully assembled, not yet signed contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsignedTransaction {
    /// Sender the transaction must be signed by.
    pub from: Address,
    pub chain_id: u64,
    pub nonce: u64,
    /// Contract address.
    pub to: Address,
    /// ABI-encoded call data.
    pub input: Bytes,
    pub gas_limit: u64,
    pub gas_price: u128,
}

impl UnsignedTransaction {
    /// The EIP-155 legacy transaction this envelope describes.
    pub fn to_legacy(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: U256::ZERO,
            input: self.input.clone(),
        }
    }

    /// Hash the sender signs.
    pub fn signing_hash(&self) -> B256 {
        self.to_legacy().signature_hash()
    }
}

/// A signed transaction, ready to broadcast exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub unsigned: UnsignedTransaction,
    pub signature: Signature,
    /// Transaction hash, as the ledger will report it.
    pub hash: TxHash,
    /// EIP-2718 encoded bytes for `eth_sendRawTransaction`.
    pub raw: Bytes,
}

impl SignedTransaction {
    pub fn nonce(&self) -> u64 {
        self.unsigned.nonce
    }

    /// Recover the address that produced the signature.
    pub fn recover_sender(&self) -> Result<Address, alloy::primitives::SignatureError> {
        self.signature
            .recover_address_from_prehash(&self.unsigned.signing_hash())
    }
}
