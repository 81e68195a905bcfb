//! Configuration validation.
//!
//! Serde handles syntax; this module checks values: parseable URLs and
//! addresses, known roles, non-zero limits, unique actor names.
//! All problems are collected, not just the first.

use std::collections::HashSet;
use std::fmt;

use alloy::primitives::Address;

use crate::catalog::Role;
use crate::config::schema::{ContractsConfig, RelayConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.ledger.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new("ledger.rpc_url", "not a valid URL"));
    }
    for (i, u) in config.ledger.failover_urls.iter().enumerate() {
        if u.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                format!("ledger.failover_urls[{}]", i),
                "not a valid URL",
            ));
        }
    }
    if config.ledger.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("ledger.rpc_timeout_secs", "must be > 0"));
    }
    if config.limits.gas_limit == 0 {
        errors.push(ValidationError::new("limits.gas_limit", "must be > 0"));
    }
    if config.submission.deadline_ms == 0 {
        errors.push(ValidationError::new("submission.deadline_ms", "must be > 0"));
    }
    if config.submission.poll_interval_ms == 0 {
        errors.push(ValidationError::new("submission.poll_interval_ms", "must be > 0"));
    }
    if config.submission.poll_interval_ms > config.submission.deadline_ms {
        errors.push(ValidationError::new(
            "submission.poll_interval_ms",
            "must not exceed submission.deadline_ms",
        ));
    }

    check_contracts("contracts", &config.contracts, &mut errors);

    let mut names = HashSet::new();
    for (i, actor) in config.actors.iter().enumerate() {
        let prefix = format!("actors[{}]", i);
        if actor.name.is_empty() {
            errors.push(ValidationError::new(format!("{}.name", prefix), "must not be empty"));
        } else if !names.insert(actor.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.name", prefix),
                format!("duplicate actor name '{}'", actor.name),
            ));
        }
        if actor.role.parse::<Role>().is_err() {
            errors.push(ValidationError::new(
                format!("{}.role", prefix),
                format!("unknown role '{}'", actor.role),
            ));
        }
        if actor.address.parse::<Address>().is_err() {
            errors.push(ValidationError::new(format!("{}.address", prefix), "not a valid address"));
        }
        if actor.credential_env.is_empty() {
            errors.push(ValidationError::new(
                format!("{}.credential_env", prefix),
                "must name an environment variable",
            ));
        }
        if let Some(contracts) = &actor.contracts {
            check_contracts(&format!("{}.contracts", prefix), contracts, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// Empty addresses are allowed: the operation fails at invocation time instead.
fn check_contracts(prefix: &str, contracts: &ContractsConfig, errors: &mut Vec<ValidationError>) {
    for (field, value) in [
        ("identity_manager", &contracts.identity_manager),
        ("bond_service_provider", &contracts.bond_service_provider),
    ] {
        if !value.is_empty() && value.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                format!("{}.{}", prefix, field),
                "not a valid address",
            ));
        }
    }
}
