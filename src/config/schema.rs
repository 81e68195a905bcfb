//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the bond relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Ledger RPC connection settings.
    pub ledger: LedgerConfig,

    /// Default resource limits applied to every transaction.
    pub limits: LimitsConfig,

    /// Submission deadline and receipt polling.
    pub submission: SubmissionConfig,

    /// Deployed contract addresses.
    pub contracts: ContractsConfig,

    /// Provisioned actors.
    pub actors: Vec<ActorConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl RelayConfig {
    /// Find an actor entry by name.
    pub fn actor(&self, name: &str) -> Option<&ActorConfig> {
        self.actors.iter().find(|a| a.name == name)
    }
}

/// Ledger JSON-RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of blocks (including the mining block) before a receipt counts as confirmed.
    pub confirmation_blocks: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
        }
    }
}

/// Resource limits for built transactions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Execution cost ceiling (gas limit).
    pub gas_limit: u64,

    /// Unit price in gwei.
    pub gas_price_gwei: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            gas_limit: 800_000,
            gas_price_gwei: 10,
        }
    }
}

/// Submission behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// How long to wait for a confirmed receipt, in milliseconds.
    pub deadline_ms: u64,

    /// Receipt polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 60_000,
            poll_interval_ms: 2_000,
        }
    }
}

/// Addresses of the deployed contracts.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ContractsConfig {
    /// Address of the IdentityManager contract.
    pub identity_manager: String,

    /// Address of the ElectoralBondServiceProvider contract.
    pub bond_service_provider: String,
}

/// A provisioned actor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActorConfig {
    /// Name used to select the actor (CLI, logs).
    pub name: String,

    /// Role string: institution, authority, beneficiary, auditor or user.
    pub role: String,

    /// Sender address.
    pub address: String,

    /// Environment variable holding the hex private key.
    pub credential_env: String,

    /// Contract addresses used by this actor instead of the global ones.
    #[serde(default)]
    pub contracts: Option<ContractsConfig>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON instead of the human-readable format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
