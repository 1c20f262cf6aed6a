//! Shared test harness: a scripted in-process chain node.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use bookie_gateway::chain::connection::NodeConnection;
use bookie_gateway::chain::rpc::NodeRpc;
use bookie_gateway::chain::types::RpcError;
use bookie_gateway::config::{GatewayConfig, NodeConfig};
use bookie_gateway::gateway::{ChainGateway, Connector};

/// Scripted RPC endpoint. Responses are canned per method; every call is
/// recorded so tests can assert on traffic (or the absence of it).
pub struct MockRpc {
    calls: Mutex<Vec<(String, Value)>>,
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, (i64, String)>>,
}

impl MockRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
        })
    }

    pub fn respond(&self, method: &str, value: Value) {
        self.responses.lock().unwrap().insert(method.to_string(), value);
    }

    pub fn fail(&self, method: &str, code: i64, message: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(method.to_string(), (code, message.to_string()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

#[async_trait]
impl NodeRpc for MockRpc {
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        if let Some((code, message)) = self.failures.lock().unwrap().get(method) {
            return Err(RpcError::Node {
                code: *code,
                message: message.clone(),
            });
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or(Value::Null))
    }
}

/// Connector that hands out the scripted endpoint and counts constructions.
pub struct MockConnector {
    rpc: Arc<MockRpc>,
    connects: Arc<AtomicU32>,
    fail_connect: bool,
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, config: &NodeConfig) -> Result<NodeConnection, RpcError> {
        // Yield first so concurrent first callers really race for the cell.
        tokio::task::yield_now().await;
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(RpcError::Node {
                code: -1,
                message: "connection refused".to_string(),
            });
        }
        Ok(NodeConnection::new(self.rpc.clone(), config.clone()))
    }
}

/// One scripted chain per test.
pub struct MockChain {
    pub rpc: Arc<MockRpc>,
    pub connects: Arc<AtomicU32>,
    pub config: GatewayConfig,
    fail_connect: bool,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            rpc: MockRpc::new(),
            connects: Arc::new(AtomicU32::new(0)),
            config: GatewayConfig::default(),
            fail_connect: false,
        }
    }

    pub fn unreachable() -> Self {
        let mut chain = Self::new();
        chain.fail_connect = true;
        chain
    }

    pub fn gateway(&self) -> ChainGateway {
        ChainGateway::with_connector(
            self.config.clone(),
            MockConnector {
                rpc: self.rpc.clone(),
                connects: self.connects.clone(),
                fail_connect: self.fail_connect,
            },
        )
    }

    pub fn connect_count(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }
}
