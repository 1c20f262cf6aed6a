//! JSON-RPC transport to the chain node/wallet service.
//!
//! # Responsibilities
//! - POST JSON-RPC 2.0 calls to the configured endpoint
//! - Bound every attempt by the configured timeout
//! - Retry transient transport failures up to `num_retries`
//! - Surface node-reported errors without retrying

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::chain::types::RpcError;
use crate::config::schema::NodeConfig;
use crate::observability::metrics;

/// Low-level call interface to the node. Object-safe so the transport can be
/// swapped out in tests.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

/// JSON-RPC over HTTP.
pub struct HttpRpc {
    http: reqwest::Client,
    endpoint: Url,
    /// Attempts per call (num_retries, minimum one).
    attempts: u32,
    timeout_duration: Duration,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcFailure>,
}

#[derive(Deserialize)]
struct RpcFailure {
    #[serde(default)]
    code: i64,
    message: String,
}

impl HttpRpc {
    pub fn new(config: &NodeConfig) -> Result<Self, RpcError> {
        let endpoint: Url = config
            .url
            .parse()
            .map_err(|_| RpcError::InvalidUrl(config.url.clone()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            attempts: config.num_retries.max(1),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl NodeRpc for HttpRpc {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        metrics::record_rpc_call(method);

        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::SeqCst),
            "method": method,
            "params": params,
        });

        let mut last_err = None;
        for attempt in 1..=self.attempts {
            let fut = async {
                self.http
                    .post(self.endpoint.clone())
                    .json(&body)
                    .send()
                    .await?
                    .error_for_status()?
                    .json::<RpcEnvelope>()
                    .await
            };

            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(envelope)) => {
                    if let Some(failure) = envelope.error {
                        // Node rejections are authoritative, not transient.
                        metrics::record_rpc_failure(method);
                        return Err(RpcError::Node {
                            code: failure.code,
                            message: failure.message,
                        });
                    }
                    metrics::record_node_health(true);
                    return Ok(envelope.result.unwrap_or(Value::Null));
                }
                Ok(Err(e)) => {
                    tracing::warn!(method, attempt, error = %e, "RPC transport error");
                    last_err = Some(RpcError::Transport(e));
                }
                Err(_) => {
                    tracing::warn!(method, attempt, "RPC timeout");
                    last_err = Some(RpcError::Timeout(self.timeout_duration.as_secs()));
                }
            }
        }

        metrics::record_rpc_failure(method);
        metrics::record_node_health(false);
        Err(last_err
            .unwrap_or_else(|| RpcError::InvalidResponse("no attempt was made".to_string())))
    }
}

impl std::fmt::Debug for HttpRpc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRpc")
            .field("endpoint", &self.endpoint.as_str())
            .field("attempts", &self.attempts)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
