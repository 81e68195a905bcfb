//! Shared utilities for the integration tests.

#![allow(dead_code)]

use alloy::primitives::Address;
use bond_relay::config::{ActorConfig, ContractsConfig, RelayConfig};
use bond_relay::credentials::MemoryCredentials;
use bond_relay::Relay;
use std::sync::Arc;

pub use bond_relay::ledger::mock::MockLedger;

/// Well-known development keys (anvil / hardhat accounts 0..3).
pub const INSTITUTION_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const INSTITUTION_ADDR: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const BENEFICIARY_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
pub const BENEFICIARY_ADDR: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const AUTHORITY_KEY: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";
pub const AUTHORITY_ADDR: &str = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";
pub const USER_KEY: &str = "7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6";
pub const USER_ADDR: &str = "0x90F79bf6EB2c4f870365E785982E1f101E93b906";

pub const IDENTITY_MANAGER: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const BOND_SERVICE_PROVIDER: &str = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512";

fn actor(name: &str, role: &str, address: &str) -> ActorConfig {
    ActorConfig {
        name: name.to_string(),
        role: role.to_string(),
        address: address.to_string(),
        credential_env: format!("{}_KEY", name.to_uppercase()),
        contracts: None,
    }
}

/// Config with one actor per test role and fast polling.
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.submission.deadline_ms = 2_000;
    config.submission.poll_interval_ms = 10;
    config.contracts = ContractsConfig {
        identity_manager: IDENTITY_MANAGER.to_string(),
        bond_service_provider: BOND_SERVICE_PROVIDER.to_string(),
    };
    config.actors = vec![
        actor("sbi", "institution", INSTITUTION_ADDR),
        actor("party", "beneficiary", BENEFICIARY_ADDR),
        actor("eci", "authority", AUTHORITY_ADDR),
        actor("voter", "user", USER_ADDR),
    ];
    config
}

pub fn test_credentials() -> MemoryCredentials {
    MemoryCredentials::new()
        .with("sbi", INSTITUTION_KEY)
        .with("party", BENEFICIARY_KEY)
        .with("eci", AUTHORITY_KEY)
        .with("voter", USER_KEY)
}

pub fn ledger() -> Arc<MockLedger> {
    Arc::new(MockLedger::default())
}

/// A relay over `ledger` with the test config and credentials.
pub fn relay(ledger: Arc<MockLedger>) -> Arc<Relay> {
    relay_with(test_config(), ledger, test_credentials())
}

pub fn relay_with(
    config: RelayConfig,
    ledger: Arc<MockLedger>,
    credentials: MemoryCredentials,
) -> Arc<Relay> {
    Arc::new(Relay::new(&config, ledger, Arc::new(credentials)).unwrap())
}

pub fn address(s: &str) -> Address {
    s.parse().unwrap()
}
