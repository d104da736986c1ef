use crate::proposal::ProposalState;
use dxgov_types::{Address, ProposalId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal has no calls")]
    EmptyProposal,

    #[error("call arrays differ in length: to={to}, call_data={call_data}, value={value}")]
    LengthMismatch {
        to: usize,
        call_data: usize,
        value: usize,
    },

    #[error("{0}")]
    MissingField(&'static str),

    #[error("avatar {given} is not the avatar of this scheme ({expected})")]
    WrongAvatar { given: Address, expected: Address },

    #[error("scheme is already initialized")]
    AlreadyInitialized,

    #[error("scheme is not initialized")]
    NotInitialized,

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("only the voting machine may execute proposals (caller {0})")]
    OnlyVotingMachine(Address),

    #[error("proposal {id} is already resolved as {state:?}")]
    AlreadyResolved { id: ProposalId, state: ProposalState },

    #[error("voting error: {0}")]
    Voting(#[from] dxgov_voting::VotingError),

    #[error("{0}")]
    Other(String),
}

impl GovernanceError {
    /// Malformed arguments, raised before anything reaches the ledger.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyProposal | Self::LengthMismatch { .. } | Self::MissingField(_) | Self::WrongAvatar { .. }
        )
    }
}
