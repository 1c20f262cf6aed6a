//! Proposal accumulation.
//!
//! Mutations are not broadcast individually. They collect in one open
//! proposal addressed to the proposer account until the epoch ends by
//! broadcast or discard.

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// Operation kinds the gateway can attach to a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    SportCreate,
    SportUpdate,
    EventGroupCreate,
    EventGroupUpdate,
    EventUpdate,
    BettingMarketGroupUpdate,
    BettingMarketUpdate,
}

/// A single mutation queued in the open proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposedOperation {
    pub kind: OperationKind,
    pub payload: Value,
}

/// The open, accumulating proposal for one epoch.
///
/// The uuid identifies the epoch: every mutator call within one epoch
/// appends to the same proposal and observes the same id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Proposal {
    id: Uuid,
    proposer: String,
    operations: Vec<ProposedOperation>,
}

impl Proposal {
    pub fn new(proposer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            proposer: proposer.into(),
            operations: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn proposer(&self) -> &str {
        &self.proposer
    }

    pub fn operations(&self) -> &[ProposedOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn append(&mut self, op: ProposedOperation) {
        tracing::debug!(proposal = %self.id, kind = ?op.kind, "appending operation to proposal");
        self.operations.push(op);
    }

    /// Wire form submitted to the node on broadcast.
    pub fn to_transaction(&self) -> Value {
        json!({
            "proposer": self.proposer,
            "operations": self
                .operations
                .iter()
                .map(|op| json!([op.kind, op.payload]))
                .collect::<Vec<_>>(),
        })
    }
}
