//! A scheme that replaces the controller or installs a new upgrading scheme.

use crate::binding::{authorize_execution, ContractBinding, ProposalResolution, SchemeConfig, VotingGate};
use crate::error::GovernanceError;
use crate::executor::{CallDispatcher, ExecutionContext, Executor};
use crate::proposal::{Call, ExecutionReport, ProposalCalls, ProposalState};
use dxgov_abi::calls;
use dxgov_controller::SchemePermissions;
use dxgov_types::{Address, ProposalId, Timestamp, B256, U256};
use dxgov_voting::Decision;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Registered, may register schemes, may upgrade the controller.
pub const DEFAULT_PERMISSIONS: SchemePermissions = SchemePermissions::from_bits(0x0000_000b);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeControllerOptions {
    pub avatar: Option<Address>,
    pub controller: Option<Address>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposeUpgradingSchemeOptions {
    pub avatar: Option<Address>,
    pub scheme: Option<Address>,
    pub scheme_parameters_hash: Option<B256>,
}

fn required_address(value: Option<Address>, message: &'static str) -> Result<Address, GovernanceError> {
    value.filter(|a| !a.is_zero()).ok_or(GovernanceError::MissingField(message))
}

impl ProposeControllerOptions {
    pub fn validate(&self) -> Result<(Address, Address), GovernanceError> {
        let avatar = required_address(self.avatar, "avatar address is not defined")?;
        let controller = required_address(self.controller, "controller address is not defined")?;
        Ok((avatar, controller))
    }
}

impl ProposeUpgradingSchemeOptions {
    pub fn validate(&self) -> Result<(Address, Address, B256), GovernanceError> {
        let avatar = required_address(self.avatar, "avatar address is not defined")?;
        let scheme = required_address(self.scheme, "scheme is not defined")?;
        let hash = self
            .scheme_parameters_hash
            .filter(|h| !h.is_zero())
            .ok_or(GovernanceError::MissingField("schemeParametersHash is not defined"))?;
        Ok((avatar, scheme, hash))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeAction {
    Controller {
        new_controller: Address,
    },
    UpgradingScheme {
        scheme: Address,
        params_hash: B256,
        permissions: SchemePermissions,
    },
}

#[derive(Clone, Debug)]
pub struct UpgradeProposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub action: UpgradeAction,
    pub submitted_at: Timestamp,
    state: ProposalState,
    execution: Option<ExecutionReport>,
}

impl UpgradeProposal {
    pub fn state(&self) -> ProposalState {
        self.state
    }

    pub fn execution(&self) -> Option<&ExecutionReport> {
        self.execution.as_ref()
    }
}

#[derive(Clone, Debug)]
pub struct UpgradeScheme {
    address: Address,
    config: Option<SchemeConfig>,
    permissions: SchemePermissions,
    proposals: HashMap<ProposalId, UpgradeProposal>,
}

impl UpgradeScheme {
    pub fn new(address: Address) -> Self {
        Self::with_permissions(address, DEFAULT_PERMISSIONS)
    }

    /// `permissions` are granted to a new upgrading scheme on approval.
    pub fn with_permissions(address: Address, permissions: SchemePermissions) -> Self {
        Self {
            address,
            config: None,
            permissions,
            proposals: HashMap::new(),
        }
    }

    pub fn permissions(&self) -> SchemePermissions {
        self.permissions
    }

    pub fn propose_controller(
        &mut self,
        gate: &mut dyn VotingGate,
        proposer: Address,
        options: ProposeControllerOptions,
    ) -> Result<ProposalId, GovernanceError> {
        let (avatar, new_controller) = options.validate()?;
        self.submit(gate, proposer, avatar, UpgradeAction::Controller { new_controller })
    }

    pub fn propose_upgrading_scheme(
        &mut self,
        gate: &mut dyn VotingGate,
        proposer: Address,
        options: ProposeUpgradingSchemeOptions,
    ) -> Result<ProposalId, GovernanceError> {
        let (avatar, scheme, params_hash) = options.validate()?;
        let action = UpgradeAction::UpgradingScheme {
            scheme,
            params_hash,
            permissions: self.permissions,
        };
        self.submit(gate, proposer, avatar, action)
    }

    pub fn proposal(&self, id: &ProposalId) -> Option<&UpgradeProposal> {
        self.proposals.get(id)
    }

    fn submit(
        &mut self,
        gate: &mut dyn VotingGate,
        proposer: Address,
        avatar: Address,
        action: UpgradeAction,
    ) -> Result<ProposalId, GovernanceError> {
        let config = self.config.ok_or(GovernanceError::NotInitialized)?;
        if avatar != config.avatar {
            return Err(GovernanceError::WrongAvatar {
                given: avatar,
                expected: config.avatar,
            });
        }
        let id = gate.open_vote(
            config.voting_machine,
            self.address,
            config.avatar,
            config.vote_params,
            proposer,
        )?;
        tracing::info!(scheme = %self.address, proposal = %id, action = ?action, "upgrade proposed");
        self.proposals.insert(
            id,
            UpgradeProposal {
                id,
                proposer,
                action,
                submitted_at: gate.now(),
                state: ProposalState::Submitted,
                execution: None,
            },
        );
        Ok(id)
    }

    /// The controller calls that carry out `action`.
    fn calls_for(&self, action: &UpgradeAction, controller: Address, avatar: Address) -> Result<ProposalCalls, GovernanceError> {
        let call = |data| Call {
            to: controller,
            data,
            value: U256::ZERO,
        };
        let mut batch = Vec::new();
        match *action {
            UpgradeAction::Controller { new_controller } => {
                batch.push(call(calls::upgrade_controller(new_controller, avatar)));
            }
            UpgradeAction::UpgradingScheme {
                scheme,
                params_hash,
                permissions,
            } => {
                batch.push(call(calls::register_scheme(scheme, params_hash, permissions.bits(), avatar)));
                if scheme != self.address {
                    batch.push(call(calls::unregister_self(avatar)));
                }
            }
        }
        ProposalCalls::from_calls(batch)
    }
}

impl ContractBinding for UpgradeScheme {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &'static str {
        "UpgradeScheme"
    }

    /// Sets the voting parameters and voting machine. An upgrade scheme is
    /// always bound to a controller and never gated by a permission registry.
    fn initialize(&mut self, config: SchemeConfig) -> Result<(), GovernanceError> {
        if self.config.is_some() {
            return Err(GovernanceError::AlreadyInitialized);
        }
        required_address(Some(config.avatar), "avatar address is not defined")?;
        required_address(config.controller, "controller address is not defined")?;
        required_address(Some(config.voting_machine), "voting machine address is not defined")?;
        self.config = Some(SchemeConfig {
            permission_registry: None,
            ..config
        });
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
        let controller = config.controller.ok_or(GovernanceError::NotInitialized)?;
        let proposal = self.proposals.get(&id).ok_or(GovernanceError::ProposalNotFound(id))?;
        if proposal.state.is_terminal() {
            return Err(GovernanceError::AlreadyResolved {
                id,
                state: proposal.state,
            });
        }

        let resolution = match decision {
            Decision::No => ProposalResolution {
                state: ProposalState::Rejected,
                report: None,
            },
            Decision::Yes => {
                let batch = self.calls_for(&proposal.action, controller, config.avatar)?;
                let report = Executor::new(ExecutionContext::new(self.address, &config)).run(&batch, dispatcher);
                let state = if report.all_succeeded(batch.len()) {
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

        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.state = resolution.state;
            proposal.execution = resolution.report.clone();
        }
        tracing::info!(scheme = %self.address, proposal = %id, state = ?resolution.state, "upgrade resolved");
        Ok(resolution)
    }

    fn proposal_state(&self, id: &ProposalId) -> Option<ProposalState> {
        self.proposals.get(id).map(UpgradeProposal::state)
    }
}
