//! Actors and the contract addresses they talk to.

use alloy::primitives::Address;
use serde::Serialize;

use crate::catalog::{ContractKind, Role};
use crate::config::{ActorConfig, ContractsConfig};

/// Errors turning configuration into actors.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("{field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Ledger(#[from] crate::ledger::LedgerError),
}

fn parse_address(field: impl Into<String>, value: &str) -> Result<Address, SetupError> {
    value.parse().map_err(|e| SetupError::Invalid {
        field: field.into(),
        reason: format!("invalid address '{}': {}", value, e),
    })
}

/// Deployed contract addresses. Unset entries make the operations that
/// target them fail locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContractDirectory {
    pub identity_manager: Option<Address>,
    pub bond_service_provider: Option<Address>,
}

impl ContractDirectory {
    pub fn from_config(config: &ContractsConfig) -> Result<Self, SetupError> {
        let parse = |field: &str, value: &str| -> Result<Option<Address>, SetupError> {
            if value.is_empty() {
                Ok(None)
            } else {
                parse_address(format!("contracts.{}", field), value).map(Some)
            }
        };
        Ok(Self {
            identity_manager: parse("identity_manager", &config.identity_manager)?,
            bond_service_provider: parse("bond_service_provider", &config.bond_service_provider)?,
        })
    }

    pub fn address(&self, kind: ContractKind) -> Option<Address> {
        match kind {
            ContractKind::IdentityManager => self.identity_manager,
            ContractKind::BondServiceProvider => self.bond_service_provider,
        }
    }

    /// Entries set in `overrides` win.
    pub fn overlay(&self, overrides: &ContractDirectory) -> ContractDirectory {
        ContractDirectory {
            identity_manager: overrides.identity_manager.or(self.identity_manager),
            bond_service_provider: overrides.bond_service_provider.or(self.bond_service_provider),
        }
    }
}

/// A participant identity. The credential is looked up by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub name: String,
    pub role: Role,
    pub address: Address,
    /// Per-actor contract addresses layered over the global ones.
    pub contracts: ContractDirectory,
}

impl Actor {
    pub fn new(name: impl Into<String>, role: Role, address: Address) -> Self {
        Self {
            name: name.into(),
            role,
            address,
            contracts: ContractDirectory::default(),
        }
    }

    pub fn with_contracts(mut self, contracts: ContractDirectory) -> Self {
        self.contracts = contracts;
        self
    }

    pub fn from_config(config: &ActorConfig) -> Result<Self, SetupError> {
        let role = config.role.parse::<Role>().map_err(|e| SetupError::Invalid {
            field: format!("actors.{}.role", config.name),
            reason: e.to_string(),
        })?;
        let address = parse_address(format!("actors.{}.address", config.name), &config.address)?;
        let contracts = match &config.contracts {
            Some(c) => ContractDirectory::from_config(c)?,
            None => ContractDirectory::default(),
        };
        Ok(Self::new(config.name.clone(), role, address).with_contracts(contracts))
    }
}
