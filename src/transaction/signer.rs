//! Transaction signing.
//!
//! The credential is moved into `sign` and dropped before it returns, on
//! success and on every error path.

use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;

use crate::credentials::{Credential, SigningError};
use crate::transaction::types::{SignedTransaction, UnsignedTransaction};

/// Produces EIP-155 legacy signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxSigner;

impl TxSigner {
    pub fn new() -> Self {
        Self
    }

    /// Sign `unsigned` with `credential`, consuming the credential.
    pub fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        credential: Credential,
    ) -> Result<SignedTransaction, SigningError> {
        if credential.address() != unsigned.from {
            return Err(SigningError::SenderMismatch {
                expected: unsigned.from,
                actual: credential.address(),
            });
        }

        let legacy = unsigned.to_legacy();
        let signature = credential.sign_hash(&legacy.signature_hash())?;
        drop(credential);

        let signed = legacy.into_signed(signature);
        let hash = *signed.hash();
        let raw = TxEnvelope::Legacy(signed).encoded_2718();

        tracing::debug!(
            from = %unsigned.from,
            nonce = unsigned.nonce,
            tx_hash = %hash,
            "Transaction signed"
        );

        Ok(SignedTransaction {
            unsigned: unsigned.clone(),
            signature,
            hash,
            raw: raw.into(),
        })
    }
}
