//! Typed connection to the chain node/wallet service.
//!
//! Translates between entity snapshots and the wire JSON. One
//! `NodeConnection` is shared per process; the gateway creates it lazily.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::chain::proposal::{OperationKind, Proposal, ProposedOperation};
use crate::chain::rpc::NodeRpc;
use crate::chain::types::{
    is_object_id, Account, BettingMarket, BettingMarketGroup, BettingMarketRules, Event,
    EventGroup, LocalizedText, RpcError, Sport,
};
use crate::config::schema::NodeConfig;
use crate::observability::metrics;

pub struct NodeConnection {
    rpc: Arc<dyn NodeRpc>,
    config: NodeConfig,
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, RpcError> {
    serde_json::from_value(value)
        .map_err(|e| RpcError::InvalidResponse(format!("{what}: {e}")))
}

impl NodeConnection {
    pub fn new(rpc: Arc<dyn NodeRpc>, config: NodeConfig) -> Self {
        Self { rpc, config }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Raw object fetch by dotted id.
    pub async fn object(&self, id: &str) -> Result<Value, RpcError> {
        let result = self.rpc.call("get_objects", json!([[id]])).await?;
        match result {
            Value::Array(mut items) if !items.is_empty() => {
                let first = items.remove(0);
                if first.is_null() {
                    Err(RpcError::InvalidResponse(format!("object {id} not found")))
                } else {
                    Ok(first)
                }
            }
            other => Err(RpcError::InvalidResponse(format!(
                "expected object array for {id}, got {other}"
            ))),
        }
    }

    pub async fn account(&self, name_or_id: &str) -> Result<Account, RpcError> {
        if is_object_id(name_or_id) {
            let value = self.object(name_or_id).await?;
            return decode(value, "account");
        }
        let value = self
            .rpc
            .call("get_account_by_name", json!([name_or_id]))
            .await?;
        if value.is_null() {
            return Err(RpcError::InvalidResponse(format!(
                "account {name_or_id} not found"
            )));
        }
        decode(value, "account")
    }

    pub async fn sport(&self, sport_id: &str) -> Result<Sport, RpcError> {
        decode(self.object(sport_id).await?, "sport")
    }

    pub async fn sports(&self) -> Result<Vec<Sport>, RpcError> {
        decode(self.rpc.call("list_sports", json!([])).await?, "sports")
    }

    pub async fn event_group(&self, event_group_id: &str) -> Result<EventGroup, RpcError> {
        decode(self.object(event_group_id).await?, "event group")
    }

    pub async fn event_groups(&self, sport_id: &str) -> Result<Vec<EventGroup>, RpcError> {
        decode(
            self.rpc.call("list_event_groups", json!([sport_id])).await?,
            "event groups",
        )
    }

    pub async fn event(&self, event_id: &str) -> Result<Event, RpcError> {
        decode(self.object(event_id).await?, "event")
    }

    pub async fn events(&self, event_group_id: &str) -> Result<Vec<Event>, RpcError> {
        decode(
            self.rpc
                .call("list_events_in_group", json!([event_group_id]))
                .await?,
            "events",
        )
    }

    pub async fn betting_market_group(
        &self,
        group_id: &str,
    ) -> Result<BettingMarketGroup, RpcError> {
        decode(self.object(group_id).await?, "betting market group")
    }

    pub async fn betting_market_groups(
        &self,
        event_id: &str,
    ) -> Result<Vec<BettingMarketGroup>, RpcError> {
        decode(
            self.rpc
                .call("list_betting_market_groups", json!([event_id]))
                .await?,
            "betting market groups",
        )
    }

    pub async fn betting_market(&self, market_id: &str) -> Result<BettingMarket, RpcError> {
        decode(self.object(market_id).await?, "betting market")
    }

    pub async fn betting_markets(&self, group_id: &str) -> Result<Vec<BettingMarket>, RpcError> {
        decode(
            self.rpc
                .call("list_betting_markets", json!([group_id]))
                .await?,
            "betting markets",
        )
    }

    pub async fn betting_market_rules(&self) -> Result<Vec<BettingMarketRules>, RpcError> {
        decode(
            self.rpc.call("list_betting_market_rules", json!([])).await?,
            "betting market rules",
        )
    }

    // Wallet passthrough. The wallet service reports `is_new`; callers want
    // the positive form.
    pub async fn wallet_exists(&self) -> Result<bool, RpcError> {
        let is_new: bool = decode(self.rpc.call("is_new", json!([])).await?, "wallet state")?;
        Ok(!is_new)
    }

    pub async fn unlock(&self, password: &str) -> Result<Value, RpcError> {
        self.rpc.call("unlock", json!([password])).await
    }

    pub async fn locked(&self) -> Result<bool, RpcError> {
        decode(self.rpc.call("is_locked", json!([])).await?, "wallet state")
    }

    // Proposal operation builders. Creates are built locally; updates verify
    // the target object exists before being queued.

    pub fn sport_create_op(&self, name: &LocalizedText) -> ProposedOperation {
        ProposedOperation {
            kind: OperationKind::SportCreate,
            payload: json!({ "name": name }),
        }
    }

    pub async fn sport_update_op(
        &self,
        sport_id: &str,
        name: &LocalizedText,
    ) -> Result<ProposedOperation, RpcError> {
        self.object(sport_id).await?;
        Ok(ProposedOperation {
            kind: OperationKind::SportUpdate,
            payload: json!({ "sport_id": sport_id, "new_name": name }),
        })
    }

    pub fn event_group_create_op(
        &self,
        name: &LocalizedText,
        sport_id: &str,
    ) -> ProposedOperation {
        ProposedOperation {
            kind: OperationKind::EventGroupCreate,
            payload: json!({ "name": name, "sport_id": sport_id }),
        }
    }

    pub async fn event_group_update_op(
        &self,
        event_group_id: &str,
        name: &LocalizedText,
        sport_id: &str,
    ) -> Result<ProposedOperation, RpcError> {
        self.object(event_group_id).await?;
        Ok(ProposedOperation {
            kind: OperationKind::EventGroupUpdate,
            payload: json!({
                "event_group_id": event_group_id,
                "new_name": name,
                "new_sport_id": sport_id,
            }),
        })
    }

    pub async fn event_update_op(
        &self,
        event_id: &str,
        name: Option<&LocalizedText>,
        season: Option<&LocalizedText>,
        status: Option<&str>,
    ) -> Result<ProposedOperation, RpcError> {
        self.object(event_id).await?;
        let mut payload = json!({ "event_id": event_id });
        if let Some(name) = name {
            payload["new_name"] = json!(name);
        }
        if let Some(season) = season {
            payload["new_season"] = json!(season);
        }
        if let Some(status) = status {
            payload["new_status"] = json!(status);
        }
        Ok(ProposedOperation {
            kind: OperationKind::EventUpdate,
            payload,
        })
    }

    pub async fn betting_market_group_update_op(
        &self,
        group_id: &str,
        description: &LocalizedText,
        rules_id: Option<&str>,
    ) -> Result<ProposedOperation, RpcError> {
        self.object(group_id).await?;
        let mut payload = json!({
            "betting_market_group_id": group_id,
            "new_description": description,
        });
        if let Some(rules_id) = rules_id {
            payload["new_rules_id"] = json!(rules_id);
        }
        Ok(ProposedOperation {
            kind: OperationKind::BettingMarketGroupUpdate,
            payload,
        })
    }

    pub async fn betting_market_update_op(
        &self,
        market_id: &str,
        payout_condition: &LocalizedText,
        description: &LocalizedText,
    ) -> Result<ProposedOperation, RpcError> {
        self.object(market_id).await?;
        Ok(ProposedOperation {
            kind: OperationKind::BettingMarketUpdate,
            payload: json!({
                "betting_market_id": market_id,
                "new_payout_condition": payout_condition,
                "new_description": description,
            }),
        })
    }

    /// Submit the accumulated proposal. With `nobroadcast` set the
    /// serialized transaction is returned without touching the network.
    pub async fn broadcast(&self, proposal: &Proposal) -> Result<Value, RpcError> {
        let tx = proposal.to_transaction();
        if self.config.nobroadcast {
            tracing::info!(
                proposal = %proposal.id(),
                operations = proposal.len(),
                "nobroadcast set, returning transaction without submitting"
            );
            return Ok(tx);
        }
        self.rpc.call("broadcast_transaction", json!([tx])).await
    }

    /// True when the node answers a cheap listing call.
    pub async fn health(&self) -> bool {
        let healthy = self.sports().await.is_ok();
        metrics::record_node_health(healthy);
        healthy
    }
}

impl std::fmt::Debug for NodeConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConnection")
            .field("url", &self.config.url)
            .field("nobroadcast", &self.config.nobroadcast)
            .finish()
    }
}
