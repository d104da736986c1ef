//! Voting parameters, registered once and referenced by hash.

use crate::error::VotingError;
use alloy_sol_types::SolValue;
use dxgov_types::{keccak256, Address, B256, NULL_ADDRESS, U256};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingParams {
    /// Share of total reputation (percent) an option must exceed to decide the vote.
    #[serde(default = "default_required_percentage")]
    pub required_percentage: u32,

    /// Seconds after submission at which an undecided vote expires.
    #[serde(default = "default_vote_period_limit_secs")]
    pub vote_period_limit_secs: u64,

    /// The only account allowed to vote on behalf of a delegator. The null
    /// address disables voting on behalf.
    #[serde(default = "default_vote_on_behalf")]
    pub vote_on_behalf: Address,
}

fn default_required_percentage() -> u32 {
    50
}

fn default_vote_period_limit_secs() -> u64 {
    86_400
}

fn default_vote_on_behalf() -> Address {
    NULL_ADDRESS
}

impl VotingParams {
    pub fn validate(&self) -> Result<(), VotingError> {
        if self.required_percentage == 0 || self.required_percentage > 100 {
            return Err(VotingError::InvalidParameters(format!(
                "required_percentage must be in 1..=100, got {}",
                self.required_percentage
            )));
        }
        if self.vote_period_limit_secs == 0 {
            return Err(VotingError::InvalidParameters(
                "vote_period_limit_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Identifier of this parameter set: keccak256 of its ABI encoding.
    pub fn hash(&self) -> B256 {
        let encoded = (
            U256::from(self.required_percentage),
            U256::from(self.vote_period_limit_secs),
            self.vote_on_behalf,
        )
            .abi_encode();
        keccak256(encoded)
    }
}

impl Default for VotingParams {
    fn default() -> Self {
        Self {
            required_percentage: default_required_percentage(),
            vote_period_limit_secs: default_vote_period_limit_secs(),
            vote_on_behalf: default_vote_on_behalf(),
        }
    }
}
