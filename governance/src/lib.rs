//! Scheme-side governance for a DAO.
//!
//! Lifecycle of a proposal, as seen by its scheme:
//! Submitted → (voting machine decides) → Rejected | ExecutionSucceeded | ExecutionFailed
//!
//! Submission validates the batch of calls and obtains an id from the voting
//! machine; nothing executes until the machine reports a decision. Execution
//! checks every call against the permission registry before making it and
//! records a `(success, return_data)` pair per call.

pub mod binding;
pub mod error;
pub mod executor;
pub mod proposal;
pub mod upgrade_scheme;
pub mod wallet_scheme;

#[cfg(test)]
pub(crate) mod test_support;

pub use binding::{ContractBinding, ProposalResolution, SchemeConfig, VotingGate};
pub use error::GovernanceError;
pub use executor::{CallDispatcher, CallRoute, ExecutionContext, Executor, OutboundCall};
pub use proposal::{Call, CallResult, ExecutionReport, Proposal, ProposalCalls, ProposalState};
pub use upgrade_scheme::{
    ProposeControllerOptions, ProposeUpgradingSchemeOptions, UpgradeAction, UpgradeProposal, UpgradeScheme,
};
pub use wallet_scheme::WalletScheme;
