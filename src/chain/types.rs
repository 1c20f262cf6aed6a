//! Chain entity snapshots and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Localized name/description pairs as stored on chain:
/// `[["en", "Soccer"], ["de", "Fussball"]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(pub Vec<(String, String)>);

impl LocalizedText {
    pub fn new<L, T>(pairs: impl IntoIterator<Item = (L, T)>) -> Self
    where
        L: Into<String>,
        T: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(lang, text)| (lang.into(), text.into()))
                .collect(),
        )
    }

    /// The first translation, used for display listings.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(|(_, text)| text.as_str())
    }

    /// Translation for a specific language code, if present.
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, text)| text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Returns true for graphene-style dotted object ids such as `1.20.5`.
pub fn is_object_id(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Chain account snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
}

/// Sport snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sport {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
}

/// Event group snapshot (e.g. a league), scoped to a sport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventGroup {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    pub sport_id: String,
}

/// Event snapshot, scoped to an event group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub season: LocalizedText,
    #[serde(default)]
    pub start_time: Option<String>,
    pub event_group_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Betting market group snapshot, scoped to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingMarketGroup {
    pub id: String,
    #[serde(default)]
    pub description: LocalizedText,
    pub event_id: String,
    #[serde(default)]
    pub rules_id: Option<String>,
}

/// Betting market snapshot, scoped to a betting market group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingMarket {
    pub id: String,
    #[serde(default)]
    pub description: LocalizedText,
    #[serde(default)]
    pub payout_condition: LocalizedText,
    pub group_id: String,
}

/// Betting market rules snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingMarketRules {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub description: LocalizedText,
}

/// Errors from the low-level RPC transport.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Network-level failure reaching the node.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The call did not complete within the configured timeout.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered with a JSON-RPC error object.
    #[error("node rejected call: {message} (code {code})")]
    Node { code: i64, message: String },

    /// The node answered with something we could not interpret.
    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    /// The configured endpoint is not a usable URL.
    #[error("invalid node URL '{0}'")]
    InvalidUrl(String),
}

/// Errors surfaced to the hosting web layer.
///
/// Every remote failure is wrapped at the point of invocation; nothing is
/// swallowed and nothing is retried above the transport layer.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The node/wallet connection could not be established.
    #[error("chain node is not available")]
    ServiceUnavailable {
        #[source]
        cause: RpcError,
    },

    /// Uniform wrap of an underlying remote failure. `Display` is the
    /// entity-specific message; the original error stays reachable as the
    /// source for diagnostics.
    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        cause: RpcError,
    },

    /// The caller asked for a collection listing without the narrowing
    /// parent identifier. Refused before any remote call is made.
    #[error("refusing unscoped chain query: {what}")]
    TooExpensiveQuery { what: String },
}

impl GatewayError {
    pub(crate) fn remote(message: impl Into<String>, cause: RpcError) -> Self {
        Self::Remote {
            message: message.into(),
            cause,
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
