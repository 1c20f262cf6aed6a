//! The shared chain gateway facade.
//!
//! # Responsibilities
//! - Hold one lazily created node connection per process
//! - Funnel every mutation into the single open proposal
//! - Wrap remote failures into the uniform error taxonomy
//! - Refuse unscoped collection listings before any network call
//!
//! The gateway is cheap to clone; all clones share the connection and the
//! open proposal. The web layer keeps one instance and calls it from its
//! worker tasks concurrently.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use crate::chain::connection::NodeConnection;
use crate::chain::proposal::Proposal;
use crate::chain::rpc::HttpRpc;
use crate::chain::types::{
    Account, BettingMarket, BettingMarketGroup, BettingMarketRules, Event, EventGroup,
    GatewayError, GatewayResult, LocalizedText, RpcError, Sport,
};
use crate::config::schema::{GatewayConfig, NodeConfig};

/// Literal returned by the stubbed create operations until the node exposes
/// the corresponding calls.
pub const STUB_PLACEHOLDER: &str = "dummy";

/// Result of a mutating call.
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    /// The operation was appended; snapshot of the open proposal.
    Proposed(Proposal),
    /// The operation is not supported upstream yet; nothing was queued.
    Stubbed(&'static str),
}

/// Connection factory seam so tests can inject a scripted transport.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &NodeConfig) -> Result<NodeConnection, RpcError>;
}

/// Default connector: JSON-RPC over HTTP.
pub struct HttpConnector;

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, config: &NodeConfig) -> Result<NodeConnection, RpcError> {
        let rpc = HttpRpc::new(config)?;
        tracing::info!(url = %config.url, num_retries = config.num_retries, "node connection created");
        Ok(NodeConnection::new(Arc::new(rpc), config.clone()))
    }
}

struct Inner {
    config: GatewayConfig,
    connector: Box<dyn Connector>,
    connection: OnceCell<NodeConnection>,
    proposal: Mutex<Option<Proposal>>,
}

/// Facade over the chain node/wallet service.
#[derive(Clone)]
pub struct ChainGateway {
    inner: Arc<Inner>,
}

impl ChainGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_connector(config, HttpConnector)
    }

    pub fn with_connector(config: GatewayConfig, connector: impl Connector + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                connector: Box::new(connector),
                connection: OnceCell::new(),
                proposal: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// The shared connection, created on first use. Concurrent first calls
    /// are serialized by the cell; exactly one connection is constructed.
    /// A failed attempt leaves the cell empty so a later call can retry.
    async fn connection(&self) -> GatewayResult<&NodeConnection> {
        self.inner
            .connection
            .get_or_try_init(|| self.inner.connector.connect(&self.inner.config.node))
            .await
            .map_err(|cause| GatewayError::ServiceUnavailable { cause })
    }

    fn require_id(what: &str, id: &str) -> GatewayResult<()> {
        if id.trim().is_empty() {
            return Err(GatewayError::TooExpensiveQuery { what: what.into() });
        }
        Ok(())
    }

    // --- read accessors -------------------------------------------------

    pub async fn account(&self, name_or_id: &str) -> GatewayResult<Account> {
        Self::require_id("account", name_or_id)?;
        let conn = self.connection().await?;
        conn.account(name_or_id).await.map_err(|cause| {
            GatewayError::remote(
                format!("Account (id={name_or_id}) could not be loaded"),
                cause,
            )
        })
    }

    /// The configured default account; so far the default is always active.
    pub fn active_account_name(&self) -> &str {
        &self.inner.config.account.default_account
    }

    pub async fn active_account(&self) -> GatewayResult<Account> {
        let name = self.active_account_name().to_string();
        let conn = self.connection().await?;
        conn.account(&name)
            .await
            .map_err(|cause| GatewayError::remote("Active account could not be loaded", cause))
    }

    pub async fn sport(&self, sport_id: &str) -> GatewayResult<Sport> {
        Self::require_id("sport", sport_id)?;
        let conn = self.connection().await?;
        conn.sport(sport_id).await.map_err(|cause| {
            GatewayError::remote(format!("Sport (id={sport_id}) could not be loaded"), cause)
        })
    }

    pub async fn sports(&self) -> GatewayResult<Vec<Sport>> {
        let conn = self.connection().await?;
        conn.sports()
            .await
            .map_err(|cause| GatewayError::remote("Sports could not be loaded", cause))
    }

    /// `(id, display name)` pairs for UI listings.
    pub async fn sport_choices(&self) -> GatewayResult<Vec<(String, String)>> {
        Ok(self
            .sports()
            .await?
            .into_iter()
            .map(|s| {
                let name = s.name.first().unwrap_or_default().to_string();
                (s.id, name)
            })
            .collect())
    }

    pub async fn sport_choice(&self, sport_id: &str) -> GatewayResult<(String, String)> {
        let sport = self.sport(sport_id).await?;
        let name = sport.name.first().unwrap_or_default().to_string();
        Ok((sport.id, name))
    }

    pub async fn event_group(&self, event_group_id: &str) -> GatewayResult<EventGroup> {
        Self::require_id("event group", event_group_id)?;
        let conn = self.connection().await?;
        conn.event_group(event_group_id).await.map_err(|cause| {
            GatewayError::remote(
                format!("Event group (id={event_group_id}) could not be loaded"),
                cause,
            )
        })
    }

    pub async fn event_groups(&self, sport_id: &str) -> GatewayResult<Vec<EventGroup>> {
        Self::require_id("event groups", sport_id)?;
        let conn = self.connection().await?;
        conn.event_groups(sport_id).await.map_err(|cause| {
            GatewayError::remote(
                format!("Event groups (sport id={sport_id}) could not be loaded"),
                cause,
            )
        })
    }

    pub async fn event(&self, event_id: &str) -> GatewayResult<Event> {
        Self::require_id("event", event_id)?;
        let conn = self.connection().await?;
        conn.event(event_id).await.map_err(|cause| {
            GatewayError::remote(format!("Event (id={event_id}) could not be loaded"), cause)
        })
    }

    pub async fn events(&self, event_group_id: &str) -> GatewayResult<Vec<Event>> {
        Self::require_id("events", event_group_id)?;
        let conn = self.connection().await?;
        conn.events(event_group_id).await.map_err(|cause| {
            GatewayError::remote(
                format!("Events (event group id={event_group_id}) could not be loaded"),
                cause,
            )
        })
    }

    pub async fn betting_market_group(
        &self,
        group_id: &str,
    ) -> GatewayResult<BettingMarketGroup> {
        Self::require_id("betting market group", group_id)?;
        let conn = self.connection().await?;
        conn.betting_market_group(group_id).await.map_err(|cause| {
            GatewayError::remote(
                format!("Betting market group (id={group_id}) could not be loaded"),
                cause,
            )
        })
    }

    pub async fn betting_market_groups(
        &self,
        event_id: &str,
    ) -> GatewayResult<Vec<BettingMarketGroup>> {
        Self::require_id("betting market groups", event_id)?;
        let conn = self.connection().await?;
        conn.betting_market_groups(event_id).await.map_err(|cause| {
            GatewayError::remote(
                format!("Betting market groups (event id={event_id}) could not be loaded"),
                cause,
            )
        })
    }

    pub async fn betting_market(&self, market_id: &str) -> GatewayResult<BettingMarket> {
        Self::require_id("betting market", market_id)?;
        let conn = self.connection().await?;
        conn.betting_market(market_id).await.map_err(|cause| {
            GatewayError::remote(
                format!("Betting market (id={market_id}) could not be loaded"),
                cause,
            )
        })
    }

    pub async fn betting_markets(&self, group_id: &str) -> GatewayResult<Vec<BettingMarket>> {
        Self::require_id("betting markets", group_id)?;
        let conn = self.connection().await?;
        conn.betting_markets(group_id).await.map_err(|cause| {
            GatewayError::remote(
                format!("Betting markets (group id={group_id}) could not be loaded"),
                cause,
            )
        })
    }

    /// Rules are a small bounded set; listing them unscoped is fine.
    pub async fn betting_market_rules(&self) -> GatewayResult<Vec<BettingMarketRules>> {
        let conn = self.connection().await?;
        conn.betting_market_rules()
            .await
            .map_err(|cause| GatewayError::remote("Betting market rules could not be loaded", cause))
    }

    // --- wallet passthrough ---------------------------------------------

    pub async fn wallet_exists(&self) -> GatewayResult<bool> {
        let conn = self.connection().await?;
        conn.wallet_exists()
            .await
            .map_err(|cause| GatewayError::remote("Wallet state could not be determined", cause))
    }

    pub async fn unlock(&self, password: &str) -> GatewayResult<Value> {
        let conn = self.connection().await?;
        conn.unlock(password)
            .await
            .map_err(|cause| GatewayError::remote("Wallet could not be unlocked", cause))
    }

    pub async fn locked(&self) -> GatewayResult<bool> {
        let conn = self.connection().await?;
        conn.locked()
            .await
            .map_err(|cause| GatewayError::remote("Wallet state could not be determined", cause))
    }

    // --- proposal-batched mutators --------------------------------------
    //
    // Each mutator ensures the open proposal under the lock, appends its
    // operation and returns a snapshot. The check-then-create and the append
    // are serialized so concurrent requests cannot open duplicate proposals
    // or interleave appends.

    pub async fn create_sport(&self, name: &LocalizedText) -> GatewayResult<MutationOutcome> {
        let conn = self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        let op = conn.sport_create_op(name);
        let proposal = self.open_proposal(&mut slot);
        proposal.append(op);
        Ok(MutationOutcome::Proposed(proposal.clone()))
    }

    pub async fn update_sport(
        &self,
        sport_id: &str,
        name: &LocalizedText,
    ) -> GatewayResult<MutationOutcome> {
        Self::require_id("sport", sport_id)?;
        let conn = self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        self.open_proposal(&mut slot);
        let op = conn.sport_update_op(sport_id, name).await.map_err(|cause| {
            GatewayError::remote(format!("Sport (id={sport_id}) could not be loaded"), cause)
        })?;
        let proposal = self.open_proposal(&mut slot);
        proposal.append(op);
        Ok(MutationOutcome::Proposed(proposal.clone()))
    }

    pub async fn create_event_group(
        &self,
        name: &LocalizedText,
        sport_id: &str,
    ) -> GatewayResult<MutationOutcome> {
        Self::require_id("sport", sport_id)?;
        let conn = self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        let op = conn.event_group_create_op(name, sport_id);
        let proposal = self.open_proposal(&mut slot);
        proposal.append(op);
        Ok(MutationOutcome::Proposed(proposal.clone()))
    }

    pub async fn update_event_group(
        &self,
        event_group_id: &str,
        name: &LocalizedText,
        sport_id: &str,
    ) -> GatewayResult<MutationOutcome> {
        Self::require_id("event group", event_group_id)?;
        let conn = self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        self.open_proposal(&mut slot);
        let op = conn
            .event_group_update_op(event_group_id, name, sport_id)
            .await
            .map_err(|cause| {
                GatewayError::remote(
                    format!("Event group (id={event_group_id}) could not be loaded"),
                    cause,
                )
            })?;
        let proposal = self.open_proposal(&mut slot);
        proposal.append(op);
        Ok(MutationOutcome::Proposed(proposal.clone()))
    }

    pub async fn update_event(
        &self,
        event_id: &str,
        name: Option<&LocalizedText>,
        season: Option<&LocalizedText>,
        status: Option<&str>,
    ) -> GatewayResult<MutationOutcome> {
        Self::require_id("event", event_id)?;
        let conn = self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        self.open_proposal(&mut slot);
        let op = conn
            .event_update_op(event_id, name, season, status)
            .await
            .map_err(|cause| {
                GatewayError::remote(format!("Event (id={event_id}) could not be loaded"), cause)
            })?;
        let proposal = self.open_proposal(&mut slot);
        proposal.append(op);
        Ok(MutationOutcome::Proposed(proposal.clone()))
    }

    pub async fn update_betting_market_group(
        &self,
        group_id: &str,
        description: &LocalizedText,
        rules_id: Option<&str>,
    ) -> GatewayResult<MutationOutcome> {
        Self::require_id("betting market group", group_id)?;
        let conn = self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        self.open_proposal(&mut slot);
        let op = conn
            .betting_market_group_update_op(group_id, description, rules_id)
            .await
            .map_err(|cause| {
                GatewayError::remote(
                    format!("Betting market group (id={group_id}) could not be loaded"),
                    cause,
                )
            })?;
        let proposal = self.open_proposal(&mut slot);
        proposal.append(op);
        Ok(MutationOutcome::Proposed(proposal.clone()))
    }

    pub async fn update_betting_market(
        &self,
        market_id: &str,
        payout_condition: &LocalizedText,
        description: &LocalizedText,
    ) -> GatewayResult<MutationOutcome> {
        Self::require_id("betting market", market_id)?;
        let conn = self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        self.open_proposal(&mut slot);
        let op = conn
            .betting_market_update_op(market_id, payout_condition, description)
            .await
            .map_err(|cause| {
                GatewayError::remote(
                    format!("Betting market (id={market_id}) could not be loaded"),
                    cause,
                )
            })?;
        let proposal = self.open_proposal(&mut slot);
        proposal.append(op);
        Ok(MutationOutcome::Proposed(proposal.clone()))
    }

    /// Stub: the node does not expose betting_market_group_create for
    /// proposals yet. Ensures the proposal like every mutator but queues
    /// nothing and never reaches the mutation path.
    pub async fn create_betting_market_group(
        &self,
        _description: &LocalizedText,
    ) -> GatewayResult<MutationOutcome> {
        self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        self.open_proposal(&mut slot);
        Ok(MutationOutcome::Stubbed(STUB_PLACEHOLDER))
    }

    /// Stub: see [`Self::create_betting_market_group`].
    pub async fn create_betting_market(
        &self,
        _payout_condition: &LocalizedText,
    ) -> GatewayResult<MutationOutcome> {
        self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        self.open_proposal(&mut slot);
        Ok(MutationOutcome::Stubbed(STUB_PLACEHOLDER))
    }

    fn open_proposal<'a>(&self, slot: &'a mut Option<Proposal>) -> &'a mut Proposal {
        slot.get_or_insert_with(|| {
            let proposer = self.active_account_name().to_string();
            tracing::debug!(%proposer, "opening proposal");
            Proposal::new(proposer)
        })
    }

    // --- proposal lifecycle ---------------------------------------------

    /// Snapshot of the open proposal, if any.
    pub async fn active_proposal(&self) -> Option<Proposal> {
        self.inner.proposal.lock().await.clone()
    }

    /// Submit the open proposal and end the epoch. Returns `None` when no
    /// proposal is open. On failure the proposal stays open so the caller
    /// can retry or discard it.
    pub async fn broadcast_proposal(&self) -> GatewayResult<Option<Value>> {
        let conn = self.connection().await?;
        let mut slot = self.inner.proposal.lock().await;
        let Some(proposal) = slot.take() else {
            return Ok(None);
        };
        match conn.broadcast(&proposal).await {
            Ok(tx) => {
                tracing::info!(proposal = %proposal.id(), operations = proposal.len(), "proposal broadcast");
                Ok(Some(tx))
            }
            Err(cause) => {
                *slot = Some(proposal);
                Err(GatewayError::remote("Proposal could not be broadcast", cause))
            }
        }
    }

    /// Drop the open proposal without submitting it.
    pub async fn discard_proposal(&self) -> Option<Proposal> {
        let dropped = self.inner.proposal.lock().await.take();
        if let Some(ref proposal) = dropped {
            tracing::info!(proposal = %proposal.id(), operations = proposal.len(), "proposal discarded");
        }
        dropped
    }

    /// True when the node answers queries.
    pub async fn is_healthy(&self) -> bool {
        match self.connection().await {
            Ok(conn) => conn.health().await,
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for ChainGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainGateway")
            .field("url", &self.inner.config.node.url)
            .field("connected", &self.inner.connection.initialized())
            .finish()
    }
}
