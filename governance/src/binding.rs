//! The capability surface every scheme exposes to the ledger.

use crate::error::GovernanceError;
use crate::executor::CallDispatcher;
use crate::proposal::{ExecutionReport, ProposalState};
use dxgov_types::{Address, ProposalId, Timestamp, B256};
use dxgov_voting::Decision;
use serde::{Deserialize, Serialize};

/// Wiring of a scheme, fixed at initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeConfig {
    pub avatar: Address,
    pub voting_machine: Address,
    /// Hash of the voting parameters registered on the voting machine.
    pub vote_params: B256,
    /// `Some` makes a "master" scheme that acts as the avatar through the
    /// controller; `None` a "quick" scheme that acts from its own address.
    pub controller: Option<Address>,
    /// `None` disables permission gating.
    pub permission_registry: Option<Address>,
}

/// Access a scheme has to the voting machine while it handles a submission.
pub trait VotingGate {
    fn now(&self) -> Timestamp;

    /// Open a vote for a new proposal of `scheme` and return its id.
    fn open_vote(
        &mut self,
        voting_machine: Address,
        scheme: Address,
        organization: Address,
        params_hash: B256,
        proposer: Address,
    ) -> Result<ProposalId, GovernanceError>;
}

/// Where a decided proposal ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalResolution {
    pub state: ProposalState,
    /// `None` for rejected proposals.
    pub report: Option<ExecutionReport>,
}

/// A scheme deployed on the ledger.
pub trait ContractBinding {
    fn address(&self) -> Address;

    /// Short type name, used in logs and receipts.
    fn name(&self) -> &'static str;

    /// One-time wiring. A second call fails with `AlreadyInitialized`.
    fn initialize(&mut self, config: SchemeConfig) -> Result<(), GovernanceError>;

    fn config(&self) -> Option<&SchemeConfig>;

    fn is_initialized(&self) -> bool {
        self.config().is_some()
    }

    /// Entry point the voting machine calls once it has a decision.
    ///
    /// Fails with `OnlyVotingMachine` for any other `caller`, leaving the
    /// proposal untouched.
    fn execute_proposal(
        &mut self,
        caller: Address,
        id: ProposalId,
        decision: Decision,
        dispatcher: &mut dyn CallDispatcher,
    ) -> Result<ProposalResolution, GovernanceError>;

    fn proposal_state(&self, id: &ProposalId) -> Option<ProposalState>;
}

/// Checks shared by every scheme before it acts on a decision.
pub(crate) fn authorize_execution<'a>(
    config: Option<&'a SchemeConfig>,
    caller: Address,
) -> Result<&'a SchemeConfig, GovernanceError> {
    let config = config.ok_or(GovernanceError::NotInitialized)?;
    if caller != config.voting_machine {
        return Err(GovernanceError::OnlyVotingMachine(caller));
    }
    Ok(config)
}
