//! Client façade.
//!
//! # Data Flow
//! ```text
//! caller ─▶ ActorClient::issue_bond / invoke
//!             → catalog.resolve(role, op)     NotAuthorized, no network
//!             → builder.encode_call           SchemaMismatch, no network
//!             → credentials.credential(actor) SigningError, no network
//!             → sequencer.next(sender)
//!             → builder.assemble → signer.sign
//!             → submitter.submit              Receipt | Rejected | TimedOut
//! ```

pub mod actor;
pub mod facade;
pub mod relay;

pub use actor::{Actor, ContractDirectory, SetupError};
pub use facade::ActorClient;
pub use relay::Relay;
