//! Transaction pipeline.
//!
//! # Data Flow
//! ```text
//! Operation + args
//!     → builder.rs   (validate, ABI-encode)
//!     → nonce.rs     (allocate next nonce for the sender)
//!     → builder.rs   (assemble envelope with limits)
//!     → signer.rs    (sign, consuming the credential)
//!     → submitter.rs (broadcast, wait for receipt or deadline)
//! ```

pub mod builder;
pub mod nonce;
pub mod signer;
pub mod submitter;
pub mod types;

pub use builder::TxBuilder;
pub use nonce::NonceSequencer;
pub use signer::TxSigner;
pub use submitter::{SubmissionOutcome, Submitter};
pub use types::{ResourceLimits, SignedTransaction, UnsignedTransaction};
