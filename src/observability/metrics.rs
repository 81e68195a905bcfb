//! Metrics collection.
//!
//! # Metrics
//! - `relay_invocations_total` (counter): invocations by role, operation, outcome
//! - `relay_invocation_duration_seconds` (histogram): end-to-end latency
//! - `relay_rpc_failures_total` (counter): failed RPC calls by method and kind
//!
//! No recorder is installed by this crate; embedders install their own
//! exporter, otherwise these calls are no-ops.

use std::time::Duration;

use crate::catalog::Role;

/// Record a finished invocation.
pub fn record_invocation(role: Role, operation: &str, outcome: &'static str, elapsed: Duration) {
    metrics::counter!(
        "relay_invocations_total",
        "role" => role.as_str(),
        "operation" => operation.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "relay_invocation_duration_seconds",
        "role" => role.as_str(),
        "operation" => operation.to_string()
    )
    .record(elapsed.as_secs_f64());
}

/// Record a failed RPC call.
pub fn record_rpc_failure(method: &'static str, kind: &'static str) {
    metrics::counter!("relay_rpc_failures_total", "method" => method, "kind" => kind).increment(1);
}
