//! Client-side transaction relay for the electoral bond contracts.
//!
//! Resolves role-gated operations, encodes and nonce-sequences them, signs
//! with the actor's credential and submits to an EVM ledger, reporting a
//! receipt or a typed error for every invocation.

pub mod catalog;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod ledger;
pub mod observability;
pub mod transaction;

pub use catalog::{Operation, OperationCatalog, Role};
pub use client::{Actor, ActorClient, Relay};
pub use config::RelayConfig;
pub use error::{ErrorKind, InvocationError};
pub use ledger::{Ledger, Receipt, TxStatus};
