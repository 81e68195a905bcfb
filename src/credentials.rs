//! Signing credentials and where they come from.
//!
//! # Security
//! - Keys come from the environment (or an in-process map), never from the config file
//! - The hex text is zeroized as soon as it is parsed
//! - The parsed key is zeroized when the `Credential` is dropped
//! - Neither `Debug` nor any error message contains key material

use alloy::primitives::{Address, Signature, B256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use std::collections::HashMap;
use zeroize::Zeroizing;

use crate::config::RelayConfig;

/// Errors raised while obtaining or using a credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    /// No credential is provisioned for the actor.
    #[error("no credential available: {0}")]
    Unavailable(String),

    /// The key material does not parse as a secp256k1 private key.
    #[error("malformed private key")]
    Malformed,

    /// The key belongs to a different address than the sender.
    #[error("credential address {actual} does not match sender {expected}")]
    SenderMismatch { expected: Address, actual: Address },

    #[error("signing failed: {0}")]
    Signature(String),
}

/// A parsed private key. Single use: signing consumes it.
pub struct Credential {
    signer: PrivateKeySigner,
}

impl Credential {
    /// Parse a hex private key (with or without `0x`).
    pub fn from_hex(secret: Zeroizing<String>) -> Result<Self, SigningError> {
        let key_hex = secret.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let signer: PrivateKeySigner = key_hex.parse().map_err(|_| SigningError::Malformed)?;
        Ok(Self { signer })
    }

    /// Address derived from the key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub(crate) fn sign_hash(&self, hash: &B256) -> Result<Signature, SigningError> {
        self.signer
            .sign_hash_sync(hash)
            .map_err(|e| SigningError::Signature(e.to_string()))
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Supplies a fresh credential per signing call.
pub trait CredentialSource: Send + Sync {
    fn credential(&self, actor: &str) -> Result<Credential, SigningError>;
}

/// Reads each actor's key from the environment variable named in its config entry.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials {
    vars: HashMap<String, String>,
}

impl EnvCredentials {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            vars: config
                .actors
                .iter()
                .map(|a| (a.name.clone(), a.credential_env.clone()))
                .collect(),
        }
    }
}

impl CredentialSource for EnvCredentials {
    fn credential(&self, actor: &str) -> Result<Credential, SigningError> {
        let var = self
            .vars
            .get(actor)
            .ok_or_else(|| SigningError::Unavailable(format!("actor '{}' is not provisioned", actor)))?;
        let secret = std::env::var(var).map_err(|_| {
            SigningError::Unavailable(format!("environment variable {} not set", var))
        })?;
        Credential::from_hex(Zeroizing::new(secret))
    }
}

/// Keys held in process memory, for embedding and tests.
#[derive(Default)]
pub struct MemoryCredentials {
    keys: HashMap<String, Zeroizing<String>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: impl Into<String>, private_key_hex: impl Into<String>) {
        self.keys
            .insert(actor.into(), Zeroizing::new(private_key_hex.into()));
    }

    pub fn with(mut self, actor: impl Into<String>, private_key_hex: impl Into<String>) -> Self {
        self.insert(actor, private_key_hex);
        self
    }
}

impl CredentialSource for MemoryCredentials {
    fn credential(&self, actor: &str) -> Result<Credential, SigningError> {
        let secret = self
            .keys
            .get(actor)
            .ok_or_else(|| SigningError::Unavailable(format!("actor '{}' is not provisioned", actor)))?;
        Credential::from_hex(secret.clone())
    }
}

impl std::fmt::Debug for MemoryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentials")
            .field("actors", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
