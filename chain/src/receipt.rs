//! Receipts and the events a transaction emits.

use dxgov_governance::ProposalState;
use dxgov_types::{Address, Bytes, ProposalId, Selector, Timestamp, U256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainEvent {
    ContractDeployed {
        address: Address,
        name: String,
    },
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    NewProposal {
        scheme: Address,
        proposal_id: ProposalId,
        proposer: Address,
    },
    VoteProposal {
        voting_machine: Address,
        proposal_id: ProposalId,
        voter: Address,
        option: u8,
    },
    ProposalRejected {
        scheme: Address,
        proposal_id: ProposalId,
    },
    /// Per-call outcome of an executed proposal.
    ExecutionResults {
        scheme: Address,
        proposal_id: ProposalId,
        successes: Vec<bool>,
        return_data: Vec<Bytes>,
    },
    ProposalStateChange {
        scheme: Address,
        proposal_id: ProposalId,
        state: ProposalState,
    },
    PermissionSet {
        registry: Address,
        caller: Address,
        target: Address,
        selector: Selector,
        value_allowed: U256,
        from_time: Timestamp,
    },
}

/// Proof that a transaction was confirmed, with everything it emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Position in the ledger's transaction log.
    pub index: u64,
    pub timestamp: Timestamp,
    pub sender: Address,
    pub events: Vec<ChainEvent>,
}

impl Receipt {
    /// Id of the first proposal submitted in this transaction.
    pub fn proposal_id(&self) -> Option<ProposalId> {
        self.events.iter().find_map(|e| match e {
            ChainEvent::NewProposal { proposal_id, .. } => Some(*proposal_id),
            _ => None,
        })
    }

    /// The scheme's verdict emitted in this transaction: `ProposalRejected`
    /// or `ExecutionResults`.
    pub fn execution_event(&self) -> Option<&ChainEvent> {
        self.events.iter().find(|e| {
            matches!(
                e,
                ChainEvent::ProposalRejected { .. } | ChainEvent::ExecutionResults { .. }
            )
        })
    }

    /// Per-call successes and return data, when a proposal was executed.
    pub fn execution_results(&self) -> Option<(&[bool], &[Bytes])> {
        self.events.iter().find_map(|e| match e {
            ChainEvent::ExecutionResults {
                successes, return_data, ..
            } => Some((successes.as_slice(), return_data.as_slice())),
            _ => None,
        })
    }

    pub fn state_change(&self) -> Option<ProposalState> {
        self.events.iter().find_map(|e| match e {
            ChainEvent::ProposalStateChange { state, .. } => Some(*state),
            _ => None,
        })
    }
}
