//! Proposals and their lifecycle.

use crate::error::GovernanceError;
use dxgov_permissions::PermissionDenied;
use dxgov_types::{Address, Bytes, ProposalId, Timestamp, B256, U256};
use serde::{Deserialize, Serialize};

/// The state of a proposal, numbered as the scheme reports it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Waiting for the voting machine.
    Submitted = 0,
    /// The vote failed; nothing was executed.
    Rejected = 1,
    /// Every call succeeded.
    ExecutionSucceeded = 2,
    /// A call was refused by the permission registry or reverted.
    ExecutionFailed = 3,
}

impl ProposalState {
    pub fn is_terminal(&self) -> bool {
        *self != Self::Submitted
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// One call of a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// A validated, non-empty batch of calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalCalls(Vec<Call>);

impl ProposalCalls {
    /// Zip the three parallel arrays of a submission.
    ///
    /// Fails before anything reaches the ledger when the arrays are empty or
    /// of different lengths.
    pub fn new(to: Vec<Address>, call_data: Vec<Bytes>, value: Vec<U256>) -> Result<Self, GovernanceError> {
        if to.len() != call_data.len() || to.len() != value.len() {
            return Err(GovernanceError::LengthMismatch {
                to: to.len(),
                call_data: call_data.len(),
                value: value.len(),
            });
        }
        if to.is_empty() {
            return Err(GovernanceError::EmptyProposal);
        }
        let calls = to
            .into_iter()
            .zip(call_data)
            .zip(value)
            .map(|((to, data), value)| Call { to, data, value })
            .collect();
        Ok(Self(calls))
    }

    pub fn from_calls(calls: Vec<Call>) -> Result<Self, GovernanceError> {
        if calls.is_empty() {
            return Err(GovernanceError::EmptyProposal);
        }
        Ok(Self(calls))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Call> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Call] {
        &self.0
    }
}

/// What one executed call returned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResult {
    pub success: bool,
    /// Return data on success, `Error(string)` revert data on failure.
    pub return_data: Bytes,
}

impl CallResult {
    pub fn ok(return_data: Bytes) -> Self {
        Self {
            success: true,
            return_data,
        }
    }

    pub fn reverted(return_data: Bytes) -> Self {
        Self {
            success: false,
            return_data,
        }
    }

    /// The revert reason, when this call failed with `Error(string)`.
    pub fn revert_reason(&self) -> Option<String> {
        if self.success {
            return None;
        }
        dxgov_abi::decode_revert(&self.return_data)
    }
}

/// Per-call outcome of one execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// One entry per call that was attempted, in order. Calls after a
    /// permission denial are not attempted and have no entry.
    pub results: Vec<CallResult>,
    /// Index of the call refused by the permission registry, and why.
    pub denied: Option<(usize, PermissionDenied)>,
}

impl ExecutionReport {
    pub fn is_permission_denied(&self) -> bool {
        self.denied.is_some()
    }

    pub fn all_succeeded(&self, expected_calls: usize) -> bool {
        self.denied.is_none() && self.results.len() == expected_calls && self.results.iter().all(|r| r.success)
    }

    pub fn successes(&self) -> Vec<bool> {
        self.results.iter().map(|r| r.success).collect()
    }

    pub fn return_data(&self) -> Vec<Bytes> {
        self.results.iter().map(|r| r.return_data.clone()).collect()
    }
}

/// A wallet-scheme proposal.
#[derive(Clone, Debug)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub calls: ProposalCalls,
    pub title: String,
    pub description_hash: B256,
    pub submitted_at: Timestamp,
    state: ProposalState,
    execution: Option<ExecutionReport>,
}

impl Proposal {
    pub fn new(
        id: ProposalId,
        proposer: Address,
        calls: ProposalCalls,
        title: String,
        description_hash: B256,
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            id,
            proposer,
            calls,
            title,
            description_hash,
            submitted_at,
            state: ProposalState::Submitted,
            execution: None,
        }
    }

    pub fn state(&self) -> ProposalState {
        self.state
    }

    pub fn execution(&self) -> Option<&ExecutionReport> {
        self.execution.as_ref()
    }

    pub fn to(&self) -> Vec<Address> {
        self.calls.iter().map(|c| c.to).collect()
    }

    pub fn call_data(&self) -> Vec<Bytes> {
        self.calls.iter().map(|c| c.data.clone()).collect()
    }

    pub fn value(&self) -> Vec<U256> {
        self.calls.iter().map(|c| c.value).collect()
    }

    /// Move out of Submitted. Happens exactly once.
    pub(crate) fn resolve(&mut self, state: ProposalState, execution: Option<ExecutionReport>) -> Result<(), GovernanceError> {
        if self.state.is_terminal() {
            return Err(GovernanceError::AlreadyResolved {
                id: self.id,
                state: self.state,
            });
        }
        if !state.is_terminal() {
            return Err(GovernanceError::Other(format!(
                "proposal {} cannot move back to Submitted",
                self.id
            )));
        }
        self.state = state;
        self.execution = execution;
        Ok(())
    }
}
