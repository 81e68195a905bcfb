//! The shared pipeline every actor client runs through.

use alloy::primitives::TxHash;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{ContractKind, OperationCatalog};
use crate::client::actor::{Actor, ContractDirectory, SetupError};
use crate::client::facade::ActorClient;
use crate::config::validation::validate_config;
use crate::config::{ConfigError, RelayConfig};
use crate::credentials::{CredentialSource, EnvCredentials};
use crate::ledger::{Ledger, LedgerResult, RpcLedger, TxStatus};
use crate::transaction::{NonceSequencer, ResourceLimits, Submitter, TxBuilder, TxSigner};

/// Catalog, builder, sequencer, signer and submitter, resolved once from
/// configuration and shared by all actors.
pub struct Relay {
    pub(crate) catalog: OperationCatalog,
    pub(crate) builder: TxBuilder,
    pub(crate) sequencer: NonceSequencer,
    pub(crate) signer: TxSigner,
    pub(crate) submitter: Submitter,
    pub(crate) credentials: Arc<dyn CredentialSource>,
    pub(crate) limits: ResourceLimits,
    pub(crate) deadline: Duration,
    contracts: ContractDirectory,
    actors: HashMap<String, Actor>,
}

impl Relay {
    /// Assemble a relay over an existing ledger connection.
    ///
    /// `config` is validated here as well, so callers that build it in code
    /// get the same checks as a loaded file.
    pub fn new(
        config: &RelayConfig,
        ledger: Arc<dyn Ledger>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self, SetupError> {
        validate_config(config).map_err(ConfigError::Validation)?;
        let contracts = ContractDirectory::from_config(&config.contracts)?;
        let actors = config
            .actors
            .iter()
            .map(|a| Actor::from_config(a).map(|actor| (actor.name.clone(), actor)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        Ok(Self {
            catalog: OperationCatalog::standard(),
            builder: TxBuilder::new(config.ledger.chain_id),
            sequencer: NonceSequencer::new(ledger.clone()),
            signer: TxSigner::new(),
            submitter: Submitter::new(
                ledger,
                Duration::from_millis(config.submission.poll_interval_ms),
                config.ledger.confirmation_blocks,
            ),
            credentials,
            limits: ResourceLimits::from(&config.limits),
            deadline: Duration::from_millis(config.submission.deadline_ms),
            contracts,
            actors,
        })
    }

    /// Connect to the configured RPC endpoints and read keys from the environment.
    pub async fn connect(config: &RelayConfig) -> Result<Self, SetupError> {
        let ledger = RpcLedger::connect(config.ledger.clone()).await?;
        Self::new(
            config,
            Arc::new(ledger),
            Arc::new(EnvCredentials::from_config(config)),
        )
    }

    /// Replace the operation catalog, e.g. after a contract redeploy.
    pub fn with_catalog(mut self, catalog: OperationCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace the default resource limits.
    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Default submission deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// A configured actor by name.
    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.get(name)
    }

    /// Client for a configured actor.
    pub fn client(self: &Arc<Self>, name: &str) -> Option<ActorClient> {
        self.actor(name)
            .cloned()
            .map(|actor| ActorClient::new(self.clone(), actor))
    }

    /// Client for an actor provisioned outside the config file.
    pub fn client_for(self: &Arc<Self>, actor: Actor) -> ActorClient {
        ActorClient::new(self.clone(), actor)
    }

    /// Address of `kind` for `actor`, per-actor entries first.
    pub(crate) fn contract_address(&self, actor: &Actor, kind: ContractKind) -> Option<alloy::primitives::Address> {
        self.contracts.overlay(&actor.contracts).address(kind)
    }

    /// Receipt-by-id query, idempotent.
    pub async fn receipt(&self, tx_hash: TxHash) -> LedgerResult<TxStatus> {
        self.submitter.query(tx_hash).await
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("chain_id", &self.builder.chain_id())
            .field("limits", &self.limits)
            .field("deadline", &self.deadline)
            .field("contracts", &self.contracts)
            .field("actors", &self.actors.keys().collect::<Vec<_>>())
            .finish()
    }
}
