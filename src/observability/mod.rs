//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every invocation produces:
//!     → logging.rs (structured events inside an `invoke` span
//!                   carrying invocation_id, actor, role, operation)
//!     → metrics.rs (counters and latency histogram)
//! ```
//!
//! Key material never reaches either.

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
