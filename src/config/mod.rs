//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! relay.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → passed explicitly to Relay::new
//! ```
//!
//! # Design Decisions
//! - Resolved once at startup; nothing reads configuration per call
//! - All fields have defaults to allow minimal configs
//! - Private keys are never part of the file, only the env var names

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ActorConfig, ContractsConfig, LedgerConfig, LimitsConfig, ObservabilityConfig, RelayConfig,
    SubmissionConfig,
};
