//! Chain gateway for sports-betting market management.
//!
//! A facade over a remote chain node/wallet JSON-RPC service. One shared
//! connection is established lazily on first use; read accessors fetch
//! entity snapshots live, and every mutation is queued into a single open
//! proposal until the hosting application broadcasts or discards it.
//! Transaction semantics, signing and consensus stay on the node side.

pub mod chain;
pub mod config;
pub mod gateway;
pub mod observability;

pub use chain::{GatewayError, GatewayResult, LocalizedText, Proposal};
pub use config::GatewayConfig;
pub use gateway::{ChainGateway, MutationOutcome, STUB_PLACEHOLDER};
