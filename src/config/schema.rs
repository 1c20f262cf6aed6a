//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, with
//! defaults so a minimal config works out of the box.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Chain node/wallet endpoint settings.
    pub node: NodeConfig,

    /// Account settings.
    pub account: AccountConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain node/wallet endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint URL of the node/wallet service.
    pub url: String,

    /// Low-level retry count per RPC call.
    pub num_retries: u32,

    /// Suppress broadcasting; proposals are built and returned only.
    pub nobroadcast: bool,

    /// Per-attempt RPC timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8090".to_string(),
            num_retries: 1,
            nobroadcast: false,
            rpc_timeout_secs: 10,
        }
    }
}

/// Account configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Active account name; proposals are addressed to it.
    pub default_account: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            default_account: "init0".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter directive (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
