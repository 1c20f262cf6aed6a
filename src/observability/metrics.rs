//! Metrics collection.
//!
//! # Metrics
//! - `gateway_rpc_calls_total` (counter): RPC calls by method
//! - `gateway_rpc_failures_total` (counter): exhausted/rejected calls by method
//! - `gateway_node_health` (gauge): 1=reachable, 0=unreachable
//!
//! Uses the `metrics` facade; the hosting application decides whether to
//! install an exporter.

/// Record one RPC call attempt set for a method.
pub fn record_rpc_call(method: &str) {
    metrics::counter!("gateway_rpc_calls_total", "method" => method.to_string()).increment(1);
}

/// Record a call that failed after all attempts or was rejected by the node.
pub fn record_rpc_failure(method: &str) {
    metrics::counter!("gateway_rpc_failures_total", "method" => method.to_string()).increment(1);
}

/// Record current node reachability.
pub fn record_node_health(healthy: bool) {
    metrics::gauge!("gateway_node_health").set(if healthy { 1.0 } else { 0.0 });
}
