//! The voting machine that gates every scheme proposal.
//!
//! A scheme opens a vote when a proposal is submitted. Reputation holders vote
//! Yes or No; as soon as one side holds more than the required share of the
//! total reputation the vote is decided and the scheme is told to execute or
//! reject. A vote nobody decides expires after the configured period and is
//! resolved as a rejection by anyone calling `execute`.

pub mod error;
pub mod machine;
pub mod params;
pub mod tally;

pub use error::VotingError;
pub use machine::{ReputationSource, VotingMachine};
pub use params::VotingParams;
pub use tally::{Decision, GateState, VoteOption, VoteTally};
