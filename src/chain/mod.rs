//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig (endpoint, retries, nobroadcast)
//!     → rpc.rs (JSON-RPC transport with timeouts and retries)
//!     → connection.rs (typed queries, wallet passthrough, op builders)
//!     → proposal.rs (accumulating proposal per epoch)
//! ```
//!
//! All remote failures are wrapped into the `GatewayError` taxonomy at the
//! gateway boundary; nothing below this module retries beyond the configured
//! per-call attempt count.

pub mod connection;
pub mod proposal;
pub mod rpc;
pub mod types;

pub use connection::NodeConnection;
pub use proposal::{OperationKind, Proposal, ProposedOperation};
pub use rpc::{HttpRpc, NodeRpc};
pub use types::{
    Account, BettingMarket, BettingMarketGroup, BettingMarketRules, Event, EventGroup,
    GatewayError, GatewayResult, LocalizedText, RpcError, Sport,
};
