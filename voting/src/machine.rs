//! The voting machine.

use crate::error::VotingError;
use crate::params::VotingParams;
use crate::tally::{Decision, GateState, VoteOption, VoteTally};
use dxgov_types::{keccak256, Address, ProposalId, Timestamp, B256, NULL_ADDRESS, U256};
use std::collections::HashMap;

/// Where the machine reads voting weight from.
pub trait ReputationSource {
    fn reputation_of(&self, holder: &Address) -> U256;
    fn total_reputation(&self) -> U256;
}

#[derive(Clone, Debug)]
pub struct VotingMachine {
    address: Address,
    parameters: HashMap<B256, VotingParams>,
    tallies: HashMap<ProposalId, VoteTally>,
    proposal_count: u64,
}

impl VotingMachine {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            parameters: HashMap::new(),
            tallies: HashMap::new(),
            proposal_count: 0,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Register a parameter set; returns the hash schemes refer to it by.
    pub fn set_parameters(&mut self, params: VotingParams) -> Result<B256, VotingError> {
        params.validate()?;
        let hash = params.hash();
        self.parameters.insert(hash, params);
        Ok(hash)
    }

    pub fn parameters(&self, hash: &B256) -> Option<&VotingParams> {
        self.parameters.get(hash)
    }

    pub fn tally(&self, id: &ProposalId) -> Option<&VoteTally> {
        self.tallies.get(id)
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }

    /// Open a vote for a proposal of `scheme`. The returned id is the proposal's id.
    pub fn propose(
        &mut self,
        scheme: Address,
        organization: Address,
        params_hash: B256,
        proposer: Address,
        now: Timestamp,
    ) -> Result<ProposalId, VotingError> {
        if !self.parameters.contains_key(&params_hash) {
            return Err(VotingError::UnknownParameters(params_hash.to_string()));
        }
        let mut preimage = Vec::with_capacity(28);
        preimage.extend_from_slice(self.address.as_slice());
        preimage.extend_from_slice(&self.proposal_count.to_be_bytes());
        let id = ProposalId::from(keccak256(&preimage));
        self.proposal_count += 1;

        self.tallies.insert(
            id,
            VoteTally {
                scheme,
                organization,
                params_hash,
                proposer,
                created_at: now,
                yes: U256::ZERO,
                no: U256::ZERO,
                voters: HashMap::new(),
                state: GateState::Open,
            },
        );
        tracing::debug!(machine = %self.address, proposal = %id, %scheme, "vote opened");
        Ok(id)
    }

    /// Cast a vote. `amount` zero votes with the voter's full reputation.
    /// `delegator` other than the null address votes on that account's behalf.
    ///
    /// Returns the decision when this vote settled the proposal.
    #[allow(clippy::too_many_arguments)]
    pub fn vote(
        &mut self,
        id: &ProposalId,
        sender: &Address,
        option: u8,
        amount: U256,
        delegator: &Address,
        reputation: &dyn ReputationSource,
        now: Timestamp,
    ) -> Result<Option<Decision>, VotingError> {
        let option = VoteOption::try_from(option)?;
        let tally = self.tallies.get(id).ok_or(VotingError::ProposalNotFound(*id))?;
        let params = self
            .parameters
            .get(&tally.params_hash)
            .ok_or_else(|| VotingError::UnknownParameters(tally.params_hash.to_string()))?;

        if !tally.is_open() {
            return Err(VotingError::VoteClosed(*id));
        }
        if tally.created_at.has_expired(params.vote_period_limit_secs, now) {
            return Err(VotingError::VotePeriodExpired(*id));
        }

        let voter = if *delegator == NULL_ADDRESS {
            *sender
        } else {
            if params.vote_on_behalf == NULL_ADDRESS || *sender != params.vote_on_behalf {
                return Err(VotingError::VoteOnBehalfNotAllowed(*sender));
            }
            *delegator
        };
        if tally.voters.contains_key(&voter) {
            return Err(VotingError::AlreadyVoted(voter));
        }

        let have = reputation.reputation_of(&voter);
        if have.is_zero() {
            return Err(VotingError::NoReputation(voter));
        }
        let weight = if amount.is_zero() { have } else { amount };
        if weight > have {
            return Err(VotingError::InsufficientReputation { have, voted: weight });
        }

        let required = params.required_percentage;
        let total = reputation.total_reputation();
        let tally = self
            .tallies
            .get_mut(id)
            .ok_or(VotingError::ProposalNotFound(*id))?;
        tally.voters.insert(voter, (option, weight));
        match option {
            VoteOption::Yes => tally.yes += weight,
            VoteOption::No => tally.no += weight,
        }
        tracing::debug!(proposal = %id, %voter, ?option, %weight, "vote cast");

        let decision = tally.decide(total, required);
        if let Some(decision) = decision {
            tally.state = match decision {
                Decision::Yes => GateState::Passed,
                Decision::No => GateState::Failed,
            };
            tracing::info!(proposal = %id, ?decision, "vote decided");
        }
        Ok(decision)
    }

    /// Resolve a proposal from outside the voting flow.
    ///
    /// An open vote that has not expired is left untouched and `None` is
    /// returned; the proposal stays submitted. An expired vote is closed as
    /// failed and reported as `Decision::No`.
    pub fn execute(&mut self, id: &ProposalId, now: Timestamp) -> Result<Option<Decision>, VotingError> {
        let tally = self.tallies.get(id).ok_or(VotingError::ProposalNotFound(*id))?;
        if !tally.is_open() {
            return Ok(None);
        }
        let period = self
            .parameters
            .get(&tally.params_hash)
            .map(|p| p.vote_period_limit_secs)
            .unwrap_or(u64::MAX);
        if !tally.created_at.has_expired(period, now) {
            tracing::debug!(proposal = %id, "execute called on an open vote, nothing to do");
            return Ok(None);
        }
        if let Some(tally) = self.tallies.get_mut(id) {
            tally.state = GateState::Failed;
        }
        tracing::info!(proposal = %id, "vote expired without decision");
        Ok(Some(Decision::No))
    }
}
