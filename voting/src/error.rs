use dxgov_types::{Address, ProposalId, U256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VotingError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("voting parameters {0} are not registered")]
    UnknownParameters(String),

    #[error("invalid voting parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid vote option {0}: expected 1 (yes) or 2 (no)")]
    InvalidOption(u8),

    #[error("voting on proposal {0} is closed")]
    VoteClosed(ProposalId),

    #[error("voting period of proposal {0} has expired")]
    VotePeriodExpired(ProposalId),

    #[error("{0} has already voted on this proposal")]
    AlreadyVoted(Address),

    #[error("{0} holds no reputation")]
    NoReputation(Address),

    #[error("insufficient reputation: have {have}, voted {voted}")]
    InsufficientReputation { have: U256, voted: U256 },

    #[error("{0} may not vote on behalf of others")]
    VoteOnBehalfNotAllowed(Address),
}
