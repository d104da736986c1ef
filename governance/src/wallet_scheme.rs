//! A scheme that executes arbitrary batches of calls once voted in.

use crate::binding::{authorize_execution, ContractBinding, ProposalResolution, SchemeConfig, VotingGate};
use crate::error::GovernanceError;
use crate::executor::{CallDispatcher, ExecutionContext, Executor};
use crate::proposal::{Proposal, ProposalCalls, ProposalState};
use dxgov_types::{Address, ProposalId, B256};
use dxgov_voting::Decision;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct WalletScheme {
    address: Address,
    config: Option<SchemeConfig>,
    proposals: HashMap<ProposalId, Proposal>,
    /// Submission order.
    proposal_ids: Vec<ProposalId>,
}

impl WalletScheme {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            config: None,
            proposals: HashMap::new(),
            proposal_ids: Vec::new(),
        }
    }

    /// Submit a validated batch of calls for a vote. Nothing executes here.
    pub fn propose_calls(
        &mut self,
        gate: &mut dyn VotingGate,
        proposer: Address,
        calls: ProposalCalls,
        title: String,
        description_hash: B256,
    ) -> Result<ProposalId, GovernanceError> {
        let config = self.config.ok_or(GovernanceError::NotInitialized)?;
        let id = gate.open_vote(
            config.voting_machine,
            self.address,
            config.avatar,
            config.vote_params,
            proposer,
        )?;
        let proposal = Proposal::new(id, proposer, calls, title, description_hash, gate.now());
        tracing::info!(
            scheme = %self.address,
            proposal = %id,
            %proposer,
            calls = proposal.calls.len(),
            "proposal submitted"
        );
        self.proposals.insert(id, proposal);
        self.proposal_ids.push(id);
        Ok(id)
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub fn proposal_ids(&self) -> &[ProposalId] {
        &self.proposal_ids
    }

    pub fn proposal_count(&self) -> usize {
        self.proposal_ids.len()
    }
}

impl ContractBinding for WalletScheme {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &'static str {
        "WalletScheme"
    }

    fn initialize(&mut self, config: SchemeConfig) -> Result<(), GovernanceError> {
        if self.config.is_some() {
            return Err(GovernanceError::AlreadyInitialized);
        }
        if config.avatar.is_zero() {
            return Err(GovernanceError::MissingField("avatar address is not defined"));
        }
        if config.voting_machine.is_zero() {
            return Err(GovernanceError::MissingField("voting machine address is not defined"));
        }
        tracing::info!(
            scheme = %self.address,
            avatar = %config.avatar,
            master = config.controller.is_some(),
            "wallet scheme initialized"
        );
        self.config = Some(config);
        Ok(())
    }

    fn config(&self) -> Option<&SchemeConfig> {
        self.config.as_ref()
    }

    fn execute_proposal(
        &mut self,
        caller: Address,
        id: ProposalId,
        decision: Decision,
        dispatcher: &mut dyn CallDispatcher,
    ) -> Result<ProposalResolution, GovernanceError> {
        let config = *authorize_execution(self.config.as_ref(), caller)?;
        let address = self.address;
        let proposal = self.proposals.get_mut(&id).ok_or(GovernanceError::ProposalNotFound(id))?;
        if proposal.state().is_terminal() {
            return Err(GovernanceError::AlreadyResolved {
                id,
                state: proposal.state(),
            });
        }

        let resolution = match decision {
            Decision::No => ProposalResolution {
                state: ProposalState::Rejected,
                report: None,
            },
            Decision::Yes => {
                let report = Executor::new(ExecutionContext::new(address, &config)).run(&proposal.calls, dispatcher);
                let state = if report.all_succeeded(proposal.calls.len()) {
                    ProposalState::ExecutionSucceeded
                } else {
                    ProposalState::ExecutionFailed
                };
                ProposalResolution {
                    state,
                    report: Some(report),
                }
            }
        };
        proposal.resolve(resolution.state, resolution.report.clone())?;
        tracing::info!(scheme = %address, proposal = %id, state = ?resolution.state, "proposal resolved");
        Ok(resolution)
    }

    fn proposal_state(&self, id: &ProposalId) -> Option<ProposalState> {
        self.proposals.get(id).map(Proposal::state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{addr, FakeGate, FakeLedger, AVATAR, CONTROLLER, REGISTRY, VOTING_MACHINE};
    use dxgov_types::{Bytes, U256};

    const SCHEME: u8 = 0x5c;

    fn config(controller: Option<Address>) -> SchemeConfig {
        SchemeConfig {
            avatar: addr(AVATAR),
            voting_machine: addr(VOTING_MACHINE),
            vote_params: B256::repeat_byte(0x77),
            controller,
            permission_registry: Some(addr(REGISTRY)),
        }
    }

    fn quick_scheme() -> WalletScheme {
        let mut scheme = WalletScheme::new(addr(SCHEME));
        scheme.initialize(config(None)).unwrap();
        scheme
    }

    fn one_call(target: u8) -> ProposalCalls {
        ProposalCalls::new(vec![addr(target)], vec![Bytes::from(vec![1u8, 2, 3, 4])], vec![U256::ZERO]).unwrap()
    }

    fn submit(scheme: &mut WalletScheme, gate: &mut FakeGate, calls: ProposalCalls) -> ProposalId {
        scheme
            .propose_calls(gate, addr(0x33), calls, "Test Title".into(), B256::repeat_byte(0x11))
            .unwrap()
    }

    #[test]
    fn cannot_initialize_twice() {
        let mut scheme = quick_scheme();
        let err = scheme.initialize(config(Some(addr(CONTROLLER)))).unwrap_err();
        assert!(matches!(err, GovernanceError::AlreadyInitialized));
        assert_eq!(scheme.config().unwrap().controller, None);
    }

    #[test]
    fn initialize_requires_avatar() {
        let mut scheme = WalletScheme::new(addr(SCHEME));
        let mut cfg = config(None);
        cfg.avatar = Address::ZERO;
        let err = scheme.initialize(cfg).unwrap_err();
        assert_eq!(err.to_string(), "avatar address is not defined");
        assert!(!scheme.is_initialized());
    }

    #[test]
    fn submission_requires_initialization() {
        let mut scheme = WalletScheme::new(addr(SCHEME));
        let err = scheme
            .propose_calls(&mut FakeGate::default(), addr(0x33), one_call(0x10), String::new(), B256::ZERO)
            .unwrap_err();
        assert!(matches!(err, GovernanceError::NotInitialized));
    }

    #[test]
    fn submission_opens_a_vote_and_stores_the_proposal() {
        let mut scheme = quick_scheme();
        let mut gate = FakeGate::default();
        let id = submit(&mut scheme, &mut gate, one_call(0x10));

        assert_eq!(gate.opened, vec![(addr(SCHEME), addr(AVATAR), B256::repeat_byte(0x77))]);
        let p = scheme.proposal(&id).unwrap();
        assert_eq!(p.state(), ProposalState::Submitted);
        assert_eq!(p.title, "Test Title");
        assert_eq!(p.to(), vec![addr(0x10)]);
        assert_eq!(p.value(), vec![U256::ZERO]);
        assert_eq!(scheme.proposal_ids(), &[id]);
    }

    #[test]
    fn negative_decision_rejects_without_calls() {
        let mut scheme = quick_scheme();
        let id = submit(&mut scheme, &mut FakeGate::default(), one_call(0x10));
        let mut ledger = FakeLedger::new();

        let res = scheme
            .execute_proposal(addr(VOTING_MACHINE), id, Decision::No, &mut ledger)
            .unwrap();

        assert_eq!(res.state, ProposalState::Rejected);
        assert!(res.report.is_none());
        assert!(ledger.dispatched.is_empty());
        assert_eq!(scheme.proposal_state(&id), Some(ProposalState::Rejected));
    }

    #[test]
    fn positive_decision_executes() {
        let mut scheme = quick_scheme();
        let id = submit(&mut scheme, &mut FakeGate::default(), one_call(0x10));
        let mut ledger = FakeLedger::new();
        ledger.allow_all(addr(SCHEME));

        let res = scheme
            .execute_proposal(addr(VOTING_MACHINE), id, Decision::Yes, &mut ledger)
            .unwrap();

        assert_eq!(res.state, ProposalState::ExecutionSucceeded);
        assert_eq!(ledger.dispatched.len(), 1);
        assert!(scheme.proposal(&id).unwrap().execution().is_some());
    }

    #[test]
    fn positive_decision_without_permission_fails_execution() {
        let mut scheme = quick_scheme();
        let id = submit(&mut scheme, &mut FakeGate::default(), one_call(0x10));
        let mut ledger = FakeLedger::new();

        let res = scheme
            .execute_proposal(addr(VOTING_MACHINE), id, Decision::Yes, &mut ledger)
            .unwrap();

        assert_eq!(res.state, ProposalState::ExecutionFailed);
        assert!(res.report.unwrap().is_permission_denied());
        assert!(ledger.dispatched.is_empty());
    }

    #[test]
    fn only_the_voting_machine_may_execute() {
        let mut scheme = quick_scheme();
        let id = submit(&mut scheme, &mut FakeGate::default(), one_call(0x10));
        let mut ledger = FakeLedger::new();
        ledger.allow_all(addr(SCHEME));

        let err = scheme
            .execute_proposal(addr(0x33), id, Decision::Yes, &mut ledger)
            .unwrap_err();

        assert!(matches!(err, GovernanceError::OnlyVotingMachine(_)));
        assert_eq!(scheme.proposal_state(&id), Some(ProposalState::Submitted));
        assert!(ledger.dispatched.is_empty());
    }

    #[test]
    fn proposal_executes_at_most_once() {
        let mut scheme = quick_scheme();
        let id = submit(&mut scheme, &mut FakeGate::default(), one_call(0x10));
        let mut ledger = FakeLedger::new();
        ledger.allow_all(addr(SCHEME));

        scheme
            .execute_proposal(addr(VOTING_MACHINE), id, Decision::Yes, &mut ledger)
            .unwrap();
        let err = scheme
            .execute_proposal(addr(VOTING_MACHINE), id, Decision::Yes, &mut ledger)
            .unwrap_err();

        assert!(matches!(err, GovernanceError::AlreadyResolved { .. }));
        assert_eq!(ledger.dispatched.len(), 1);
        assert_eq!(scheme.proposal_state(&id), Some(ProposalState::ExecutionSucceeded));
    }

    #[test]
    fn unknown_proposal_is_reported() {
        let mut scheme = quick_scheme();
        let err = scheme
            .execute_proposal(addr(VOTING_MACHINE), ProposalId::ZERO, Decision::Yes, &mut FakeLedger::new())
            .unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotFound(_)));
    }
}
