//! Per-actor entry points.
//!
//! The role is data: every actor gets the same client type, and the
//! catalog decides what it may call.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{Address, TxHash, U256};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::catalog::{self, Operation, Role};
use crate::client::actor::Actor;
use crate::client::relay::Relay;
use crate::credentials::SigningError;
use crate::error::{InvocationError, RelayError};
use crate::ledger::{LedgerResult, Receipt, TxStatus};
use crate::observability::metrics;
use crate::transaction::SubmissionOutcome;

/// Entry point for one actor.
#[derive(Debug, Clone)]
pub struct ActorClient {
    relay: Arc<Relay>,
    actor: Actor,
}

impl ActorClient {
    pub(crate) fn new(relay: Arc<Relay>, actor: Actor) -> Self {
        Self { relay, actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn role(&self) -> Role {
        self.actor.role
    }

    /// Operations this actor's role may invoke.
    pub fn operations(&self) -> &[&'static Operation] {
        self.relay.catalog.operations(self.actor.role)
    }

    /// Invoke `operation` with the configured deadline.
    pub async fn invoke(
        &self,
        operation: &str,
        args: Vec<DynSolValue>,
    ) -> Result<Receipt, InvocationError> {
        self.invoke_with_deadline(operation, args, self.relay.deadline)
            .await
    }

    /// Invoke `operation`, waiting at most `deadline` for confirmation.
    ///
    /// Dropping the returned future after broadcast does not undo the
    /// transaction; its nonce stays consumed.
    pub async fn invoke_with_deadline(
        &self,
        operation: &str,
        args: Vec<DynSolValue>,
        deadline: Duration,
    ) -> Result<Receipt, InvocationError> {
        let span = tracing::info_span!(
            "invoke",
            invocation_id = %Uuid::new_v4(),
            actor = %self.actor.name,
            role = %self.actor.role,
            operation,
        );
        let started = Instant::now();
        let result = self.run(operation, &args, deadline).instrument(span).await;

        let outcome = match &result {
            Ok(_) => "confirmed",
            Err(e) => e.kind().as_str(),
        };
        metrics::record_invocation(self.actor.role, operation, outcome, started.elapsed());
        result
    }

    /// Invoke with textual arguments, coerced by the operation's schema.
    pub async fn invoke_str<S: AsRef<str>>(
        &self,
        operation: &str,
        args: &[S],
    ) -> Result<Receipt, InvocationError> {
        self.invoke_str_with_deadline(operation, args, self.relay.deadline)
            .await
    }

    pub async fn invoke_str_with_deadline<S: AsRef<str>>(
        &self,
        operation: &str,
        args: &[S],
        deadline: Duration,
    ) -> Result<Receipt, InvocationError> {
        let op = self
            .relay
            .catalog
            .resolve(self.actor.role, operation)
            .map_err(|e| self.fail(operation, e))?;
        let values = op.parse_args(args).map_err(|e| self.fail(operation, e))?;
        self.invoke_with_deadline(operation, values, deadline).await
    }

    async fn run(
        &self,
        operation: &str,
        args: &[DynSolValue],
        deadline: Duration,
    ) -> Result<Receipt, InvocationError> {
        let relay = &self.relay;
        let role = self.actor.role;

        let op = relay
            .catalog
            .resolve(role, operation)
            .map_err(|e| self.fail(operation, e))?;
        let to = relay
            .contract_address(&self.actor, op.contract)
            .ok_or_else(|| self.fail(operation, RelayError::Misconfigured(op.contract)))?;
        let input = relay
            .builder
            .encode_call(op, args)
            .map_err(|e| self.fail(operation, e))?;

        // Credential problems must surface before a nonce is consumed.
        let credential = relay
            .credentials
            .credential(&self.actor.name)
            .map_err(|e| self.fail(operation, e))?;
        if credential.address() != self.actor.address {
            return Err(self.fail(
                operation,
                SigningError::SenderMismatch {
                    expected: self.actor.address,
                    actual: credential.address(),
                },
            ));
        }

        let nonce = relay
            .sequencer
            .next(self.actor.address)
            .await
            .map_err(|e| self.fail(operation, e))?;
        let unsigned = relay
            .builder
            .assemble(self.actor.address, to, input, nonce, &relay.limits);
        let signed = relay
            .signer
            .sign(&unsigned, credential)
            .map_err(|e| self.fail(operation, e))?;

        tracing::debug!(nonce, to = %to, tx_hash = %signed.hash, "Submitting");

        let outcome = relay
            .submitter
            .submit(&signed, deadline)
            .await
            .map_err(|e| self.fail(operation, e).with_tx_hash(signed.hash))?;

        match outcome {
            SubmissionOutcome::Confirmed(receipt) => Ok(receipt),
            SubmissionOutcome::Rejected(receipt) => {
                let reason = receipt
                    .failure_reason
                    .unwrap_or_else(|| "rejected".to_string());
                Err(self
                    .fail(operation, RelayError::SubmissionRejected { reason })
                    .with_tx_hash(receipt.tx_hash))
            }
            SubmissionOutcome::TimedOut(tx_hash) => Err(self
                .fail(
                    operation,
                    RelayError::SubmissionTimedOut {
                        deadline_ms: deadline.as_millis() as u64,
                    },
                )
                .with_tx_hash(tx_hash)),
        }
    }

    fn fail(&self, operation: &str, source: impl Into<RelayError>) -> InvocationError {
        let err = InvocationError::new(self.actor.role, operation, source);
        tracing::warn!(kind = %err.kind(), error = %err.source, "Invocation failed");
        err
    }

    /// Status of an earlier transaction. Use this to settle a timed-out
    /// invocation before deciding to resubmit.
    pub async fn receipt(&self, tx_hash: TxHash) -> LedgerResult<TxStatus> {
        self.relay.receipt(tx_hash).await
    }

    /// Overwrite the local nonce with the ledger's view.
    pub async fn resync(&self) -> LedgerResult<u64> {
        self.relay.sequencer.resync(self.actor.address).await
    }

    /// Next nonce this actor would use, if already seeded.
    pub async fn pending_nonce(&self) -> Option<u64> {
        self.relay.sequencer.peek(self.actor.address).await
    }

    pub async fn register_identity(
        &self,
        user: Address,
        name: &str,
        role: &str,
        kyc: &[u8],
    ) -> Result<Receipt, InvocationError> {
        self.invoke(
            catalog::REGISTER_IDENTITY.name,
            vec![
                DynSolValue::Address(user),
                DynSolValue::String(name.to_string()),
                DynSolValue::String(role.to_string()),
                DynSolValue::Bytes(kyc.to_vec()),
            ],
        )
        .await
    }

    pub async fn generate_key_pair(&self) -> Result<Receipt, InvocationError> {
        self.invoke(catalog::GENERATE_KEY_PAIR.name, Vec::new()).await
    }

    pub async fn generate_bonds(&self) -> Result<Receipt, InvocationError> {
        self.invoke(catalog::GENERATE_BONDS.name, Vec::new()).await
    }

    pub async fn issue_bond(&self, bond_id: &str, amount: U256) -> Result<Receipt, InvocationError> {
        self.invoke(
            catalog::ISSUE_BOND.name,
            vec![
                DynSolValue::String(bond_id.to_string()),
                DynSolValue::Uint(amount, 256),
            ],
        )
        .await
    }

    pub async fn redeem_bond(&self, bond_id: &str) -> Result<Receipt, InvocationError> {
        self.invoke(
            catalog::REDEEM_BOND.name,
            vec![DynSolValue::String(bond_id.to_string())],
        )
        .await
    }

    pub async fn redeem(&self) -> Result<Receipt, InvocationError> {
        self.invoke(catalog::REDEEM.name, Vec::new()).await
    }

    pub async fn shenc_bond(&self, bond_id: &str, public_key: &[u8]) -> Result<Receipt, InvocationError> {
        self.invoke(
            catalog::SHENC_BOND.name,
            vec![
                DynSolValue::String(bond_id.to_string()),
                DynSolValue::Bytes(public_key.to_vec()),
            ],
        )
        .await
    }

    pub async fn rti(&self) -> Result<Receipt, InvocationError> {
        self.invoke(catalog::RTI.name, Vec::new()).await
    }
}
