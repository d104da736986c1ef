//! Per-proposal vote state.

use crate::error::VotingError;
use dxgov_types::{Address, B256, Timestamp, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A ballot option, numbered as on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOption {
    Yes = 1,
    No = 2,
}

impl TryFrom<u8> for VoteOption {
    type Error = VotingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Yes),
            2 => Ok(Self::No),
            other => Err(VotingError::InvalidOption(other)),
        }
    }
}

/// The outcome handed to the proposing scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Yes,
    No,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    Open,
    Passed,
    Failed,
}

#[derive(Clone, Debug)]
pub struct VoteTally {
    /// The scheme that opened the vote and will be told the decision.
    pub scheme: Address,
    /// The avatar whose reputation votes.
    pub organization: Address,
    pub params_hash: B256,
    pub proposer: Address,
    pub created_at: Timestamp,
    pub yes: U256,
    pub no: U256,
    pub voters: HashMap<Address, (VoteOption, U256)>,
    pub state: GateState,
}

impl VoteTally {
    pub fn is_open(&self) -> bool {
        self.state == GateState::Open
    }

    /// Whether either side exceeds `required_percentage` of `total`.
    pub(crate) fn decide(&self, total: U256, required_percentage: u32) -> Option<Decision> {
        let threshold = total.saturating_mul(U256::from(required_percentage));
        let hundred = U256::from(100u64);
        if self.yes.saturating_mul(hundred) > threshold {
            Some(Decision::Yes)
        } else if self.no.saturating_mul(hundred) > threshold {
            Some(Decision::No)
        } else {
            None
        }
    }
}
