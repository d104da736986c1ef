//! The local ledger: one ordered log of transactions over a shared world state.
//!
//! Every public mutating method is a transaction. It runs to completion and
//! yields a [`Receipt`], or fails and leaves the world exactly as it found
//! it. Inside a transaction each contract call is atomic on its own: a
//! reverted call is rolled back while the transaction carries on, which is
//! what lets a proposal record per-call failures.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_sol_types::SolInterface;
use dxgov_abi::calls::IPermissionRegistry::IPermissionRegistryCalls;
use dxgov_abi::{decode_generic_call_result, encode_generic_call_result, encode_revert};
use dxgov_controller::{Controller, ControllerOutcome, Reputation, SchemePermissions, SchemeRecord};
use dxgov_governance::{
    CallDispatcher, CallResult, CallRoute, ContractBinding, GovernanceError, OutboundCall, Proposal,
    ProposalCalls, ProposalResolution, ProposalState, ProposeControllerOptions, ProposeUpgradingSchemeOptions,
    SchemeConfig, UpgradeProposal, UpgradeScheme, VotingGate, WalletScheme,
};
use dxgov_permissions::{PermissionCheck, PermissionGrant, PermissionRecord, PermissionRegistry};
use dxgov_types::{contract_address, Address, Bytes, ProposalId, Selector, Timestamp, B256, U256};
use dxgov_voting::{Decision, ReputationSource, VotingError, VotingMachine, VotingParams};

use crate::clock::{Clock, SystemClock};
use crate::config::ChainConfig;
use crate::contract::{CallEnv, Contract};
use crate::receipt::{ChainEvent, Receipt};
use crate::ChainError;

#[derive(Clone)]
enum Deployed {
    PermissionRegistry(PermissionRegistry),
    Controller(Controller),
    VotingMachine(VotingMachine),
    WalletScheme(WalletScheme),
    UpgradeScheme(UpgradeScheme),
    External(Box<dyn Contract>),
}

impl Deployed {
    fn name(&self) -> &'static str {
        match self {
            Self::PermissionRegistry(_) => "PermissionRegistry",
            Self::Controller(_) => "Controller",
            Self::VotingMachine(_) => "VotingMachine",
            Self::WalletScheme(s) => s.name(),
            Self::UpgradeScheme(s) => s.name(),
            Self::External(c) => c.name(),
        }
    }
}

#[derive(Clone, Default)]
struct World {
    balances: HashMap<Address, U256>,
    contracts: HashMap<Address, Deployed>,
    /// avatar → controller
    controllers: HashMap<Address, Address>,
    deployments: u64,
    /// Events of the transaction in flight.
    events: Vec<ChainEvent>,
}

/// Reputation of one organization, as the voting machine reads it.
struct ReputationView<'a>(&'a Reputation);

impl ReputationSource for ReputationView<'_> {
    fn reputation_of(&self, holder: &Address) -> U256 {
        self.0.balance_of(holder)
    }

    fn total_reputation(&self) -> U256 {
        self.0.total_supply()
    }
}

fn wrong_contract(address: Address, expected: &'static str) -> ChainError {
    ChainError::WrongContract { address, expected }
}

pub struct LocalChain {
    config: ChainConfig,
    clock: Arc<dyn Clock>,
    time_offset: u64,
    world: World,
    receipts: Vec<Receipt>,
    /// Schemes in the middle of handling a transaction. Calls into them revert.
    executing: Vec<Address>,
}

impl LocalChain {
    pub fn new(config: ChainConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            time_offset: 0,
            world: World::default(),
            receipts: Vec::new(),
            executing: Vec::new(),
        }
    }

    pub fn with_system_clock(config: ChainConfig) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Ledger time: the clock plus every [`increase_time`](Self::increase_time).
    pub fn now(&self) -> Timestamp {
        self.clock.now().saturating_add(self.time_offset)
    }

    pub fn increase_time(&mut self, secs: u64) {
        self.time_offset = self.time_offset.saturating_add(secs);
        tracing::debug!(secs, now = self.now().as_secs(), "time increased");
    }

    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// Index the next transaction will get.
    pub fn block_number(&self) -> u64 {
        self.receipts.len() as u64
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        self.world.balances.get(account).copied().unwrap_or_default()
    }

    /// Genesis allocation; not a transaction.
    pub fn set_balance(&mut self, account: Address, amount: U256) {
        self.world.balances.insert(account, amount);
    }

    // ── Transactions ───────────────────────────────────────────────────

    fn transact<T>(
        &mut self,
        sender: Address,
        action: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, ChainError>,
    ) -> Result<(T, Receipt), ChainError> {
        let snapshot = self.world.clone();
        match f(self) {
            Ok(value) => {
                let receipt = Receipt {
                    index: self.block_number(),
                    timestamp: self.now(),
                    sender,
                    events: std::mem::take(&mut self.world.events),
                };
                tracing::debug!(index = receipt.index, %sender, action, events = receipt.events.len(), "transaction confirmed");
                self.receipts.push(receipt.clone());
                Ok((value, receipt))
            }
            Err(err) => {
                self.world = snapshot;
                self.executing.clear();
                tracing::warn!(%sender, action, error = %err, "transaction failed");
                Err(err)
            }
        }
    }

    fn deploy(
        &mut self,
        sender: Address,
        build: impl FnOnce(Address) -> Result<Deployed, ChainError>,
    ) -> Result<Address, ChainError> {
        let (address, _) = self.transact(sender, "deploy", |chain| {
            let address = contract_address(&sender, chain.world.deployments);
            chain.world.deployments += 1;
            let deployed = build(address)?;
            let name = deployed.name();
            chain.world.contracts.insert(address, deployed);
            chain.world.events.push(ChainEvent::ContractDeployed {
                address,
                name: name.to_string(),
            });
            tracing::info!(%address, name, "contract deployed");
            Ok(address)
        })?;
        Ok(address)
    }

    pub fn deploy_permission_registry(&mut self, sender: Address, owner: Address, time_delay: u64) -> Result<Address, ChainError> {
        self.deploy(sender, |address| {
            Ok(Deployed::PermissionRegistry(PermissionRegistry::new(address, owner, time_delay)?))
        })
    }

    /// Create an avatar and its controller, with `founder` registered as the
    /// founding scheme. Returns `(avatar, controller)`.
    pub fn deploy_organization(&mut self, founder: Address) -> Result<(Address, Address), ChainError> {
        let (pair, _) = self.transact(founder, "deploy_organization", |chain| {
            let avatar = contract_address(&founder, chain.world.deployments);
            let controller = contract_address(&founder, chain.world.deployments + 1);
            chain.world.deployments += 2;
            chain
                .world
                .contracts
                .insert(controller, Deployed::Controller(Controller::new(controller, avatar, founder)));
            chain.world.controllers.insert(avatar, controller);
            chain.world.events.push(ChainEvent::ContractDeployed {
                address: avatar,
                name: "Avatar".to_string(),
            });
            chain.world.events.push(ChainEvent::ContractDeployed {
                address: controller,
                name: "Controller".to_string(),
            });
            tracing::info!(%avatar, %controller, %founder, "organization deployed");
            Ok((avatar, controller))
        })?;
        Ok(pair)
    }

    pub fn deploy_voting_machine(&mut self, sender: Address) -> Result<Address, ChainError> {
        self.deploy(sender, |address| Ok(Deployed::VotingMachine(VotingMachine::new(address))))
    }

    pub fn deploy_wallet_scheme(&mut self, sender: Address) -> Result<Address, ChainError> {
        self.deploy(sender, |address| Ok(Deployed::WalletScheme(WalletScheme::new(address))))
    }

    pub fn deploy_upgrade_scheme(&mut self, sender: Address, permissions: SchemePermissions) -> Result<Address, ChainError> {
        self.deploy(sender, |address| {
            Ok(Deployed::UpgradeScheme(UpgradeScheme::with_permissions(address, permissions)))
        })
    }

    pub fn deploy_contract(&mut self, sender: Address, contract: Box<dyn Contract>) -> Result<Address, ChainError> {
        self.deploy(sender, |_| Ok(Deployed::External(contract)))
    }

    pub fn set_voting_parameters(
        &mut self,
        sender: Address,
        voting_machine: Address,
        params: VotingParams,
    ) -> Result<B256, ChainError> {
        let (hash, _) = self.transact(sender, "set_voting_parameters", |chain| {
            match chain.contract_mut(voting_machine)? {
                Deployed::VotingMachine(vm) => Ok(vm.set_parameters(params)?),
                _ => Err(wrong_contract(voting_machine, "VotingMachine")),
            }
        })?;
        Ok(hash)
    }

    pub fn initialize_scheme(&mut self, sender: Address, scheme: Address, config: SchemeConfig) -> Result<Receipt, ChainError> {
        let (_, receipt) = self.transact(sender, "initialize", |chain| {
            match chain.contract_mut(scheme)? {
                Deployed::WalletScheme(s) => Ok(s.initialize(config)?),
                Deployed::UpgradeScheme(s) => Ok(s.initialize(config)?),
                _ => Err(wrong_contract(scheme, "scheme")),
            }
        })?;
        Ok(receipt)
    }

    /// A plain transaction from `from`. A reverting call fails the
    /// transaction with its decoded reason.
    pub fn send_transaction(&mut self, from: Address, to: Address, data: Bytes, value: U256) -> Result<(Bytes, Receipt), ChainError> {
        self.transact(from, "send_transaction", |chain| {
            let result = chain.call(from, to, &data, value, 0);
            if result.success {
                Ok(result.return_data)
            } else {
                Err(ChainError::Reverted(
                    result.revert_reason().unwrap_or_else(|| "reverted without reason".to_string()),
                ))
            }
        })
    }

    /// Submit a batch of calls to a wallet scheme. Malformed batches are
    /// refused before anything reaches the ledger.
    #[allow(clippy::too_many_arguments)]
    pub fn propose_calls(
        &mut self,
        sender: Address,
        scheme: Address,
        to: Vec<Address>,
        call_data: Vec<Bytes>,
        value: Vec<U256>,
        title: impl Into<String>,
        description_hash: B256,
    ) -> Result<(ProposalId, Receipt), ChainError> {
        let calls = ProposalCalls::new(to, call_data, value)?;
        let title = title.into();
        self.transact(sender, "propose_calls", |chain| {
            let id = chain.with_contract(scheme, |deployed, chain| match deployed {
                Deployed::WalletScheme(s) => Ok(s.propose_calls(chain, sender, calls, title, description_hash)?),
                _ => Err(wrong_contract(scheme, "WalletScheme")),
            })?;
            chain.world.events.push(ChainEvent::NewProposal {
                scheme,
                proposal_id: id,
                proposer: sender,
            });
            Ok(id)
        })
    }

    pub fn propose_controller(
        &mut self,
        sender: Address,
        scheme: Address,
        options: ProposeControllerOptions,
    ) -> Result<(ProposalId, Receipt), ChainError> {
        options.validate()?;
        self.transact(sender, "propose_controller", |chain| {
            let id = chain.with_contract(scheme, |deployed, chain| match deployed {
                Deployed::UpgradeScheme(s) => Ok(s.propose_controller(chain, sender, options)?),
                _ => Err(wrong_contract(scheme, "UpgradeScheme")),
            })?;
            chain.world.events.push(ChainEvent::NewProposal {
                scheme,
                proposal_id: id,
                proposer: sender,
            });
            Ok(id)
        })
    }

    pub fn propose_upgrading_scheme(
        &mut self,
        sender: Address,
        scheme: Address,
        options: ProposeUpgradingSchemeOptions,
    ) -> Result<(ProposalId, Receipt), ChainError> {
        options.validate()?;
        self.transact(sender, "propose_upgrading_scheme", |chain| {
            let id = chain.with_contract(scheme, |deployed, chain| match deployed {
                Deployed::UpgradeScheme(s) => Ok(s.propose_upgrading_scheme(chain, sender, options)?),
                _ => Err(wrong_contract(scheme, "UpgradeScheme")),
            })?;
            chain.world.events.push(ChainEvent::NewProposal {
                scheme,
                proposal_id: id,
                proposer: sender,
            });
            Ok(id)
        })
    }

    /// Vote on a proposal. When the vote decides it, the proposing scheme
    /// executes or rejects it in the same transaction.
    pub fn vote(
        &mut self,
        sender: Address,
        voting_machine: Address,
        id: ProposalId,
        option: u8,
        amount: U256,
        delegator: Address,
    ) -> Result<Receipt, ChainError> {
        let (_, receipt) = self.transact(sender, "vote", |chain| {
            let now = chain.now();
            let decision = chain.with_contract(voting_machine, |deployed, chain| {
                let Deployed::VotingMachine(vm) = deployed else {
                    return Err(wrong_contract(voting_machine, "VotingMachine"));
                };
                let organization = vm.tally(&id).ok_or(VotingError::ProposalNotFound(id))?.organization;
                let reputation = ReputationView(chain.organization_reputation(&organization)?);
                Ok(vm.vote(&id, &sender, option, amount, &delegator, &reputation, now)?)
            })?;
            chain.world.events.push(ChainEvent::VoteProposal {
                voting_machine,
                proposal_id: id,
                voter: sender,
                option,
            });
            if let Some(decision) = decision {
                chain.settle(voting_machine, id, decision)?;
            }
            Ok(())
        })?;
        Ok(receipt)
    }

    /// Ask the voting machine to resolve a proposal. Nothing happens while the
    /// vote is open and unexpired; an expired vote rejects the proposal.
    pub fn execute(&mut self, sender: Address, voting_machine: Address, id: ProposalId) -> Result<Receipt, ChainError> {
        let (_, receipt) = self.transact(sender, "execute", |chain| {
            let now = chain.now();
            let decision = match chain.contract_mut(voting_machine)? {
                Deployed::VotingMachine(vm) => vm.execute(&id, now)?,
                _ => return Err(wrong_contract(voting_machine, "VotingMachine")),
            };
            if let Some(decision) = decision {
                chain.settle(voting_machine, id, decision)?;
            }
            Ok(())
        })?;
        Ok(receipt)
    }

    /// Call a scheme's execution entry point directly. Only the voting
    /// machine gets past the scheme's check.
    pub fn execute_proposal(
        &mut self,
        sender: Address,
        scheme: Address,
        id: ProposalId,
        decision: Decision,
    ) -> Result<Receipt, ChainError> {
        let (_, receipt) = self.transact(sender, "execute_proposal", |chain| {
            chain.execute_scheme(sender, scheme, id, decision)
        })?;
        Ok(receipt)
    }

    /// Self-service grant: `sender` is the caller the record is stored under.
    #[allow(clippy::too_many_arguments)]
    pub fn set_permission(
        &mut self,
        sender: Address,
        registry: Address,
        target: Address,
        selector: Selector,
        value_allowed: U256,
        delay_secs: u64,
        allowed: bool,
    ) -> Result<(PermissionRecord, Receipt), ChainError> {
        self.transact(sender, "set_permission", |chain| {
            let now = chain.now();
            let record = match chain.contract_mut(registry)? {
                Deployed::PermissionRegistry(r) => r.set_permission(
                    sender,
                    PermissionGrant {
                        target,
                        selector,
                        value_allowed,
                        delay_secs,
                        allowed,
                    },
                    now,
                )?,
                _ => return Err(wrong_contract(registry, "PermissionRegistry")),
            };
            chain.emit_permission_set(registry, sender, target, selector, &record);
            Ok(record)
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_admin_permission(
        &mut self,
        sender: Address,
        registry: Address,
        caller: Address,
        target: Address,
        selector: Selector,
        value_allowed: U256,
        allowed: bool,
    ) -> Result<(PermissionRecord, Receipt), ChainError> {
        self.transact(sender, "set_admin_permission", |chain| {
            let now = chain.now();
            let record = match chain.contract_mut(registry)? {
                Deployed::PermissionRegistry(r) => {
                    r.set_admin_permission(&sender, caller, target, selector, value_allowed, allowed, now)?
                }
                _ => return Err(wrong_contract(registry, "PermissionRegistry")),
            };
            chain.emit_permission_set(registry, caller, target, selector, &record);
            Ok(record)
        })
    }

    pub fn register_scheme(
        &mut self,
        sender: Address,
        controller: Address,
        scheme: Address,
        params_hash: B256,
        permissions: SchemePermissions,
    ) -> Result<Receipt, ChainError> {
        let (_, receipt) = self.transact(sender, "register_scheme", |chain| match chain.contract_mut(controller)? {
            Deployed::Controller(c) => Ok(c.register_scheme(&sender, scheme, params_hash, permissions)?),
            _ => Err(wrong_contract(controller, "Controller")),
        })?;
        Ok(receipt)
    }

    pub fn unregister_scheme(&mut self, sender: Address, controller: Address, scheme: Address) -> Result<bool, ChainError> {
        let (removed, _) = self.transact(sender, "unregister_scheme", |chain| match chain.contract_mut(controller)? {
            Deployed::Controller(c) => Ok(c.unregister_scheme(&sender, &scheme)?),
            _ => Err(wrong_contract(controller, "Controller")),
        })?;
        Ok(removed)
    }

    pub fn unregister_self(&mut self, sender: Address, controller: Address) -> Result<bool, ChainError> {
        let (removed, _) = self.transact(sender, "unregister_self", |chain| match chain.contract_mut(controller)? {
            Deployed::Controller(c) => Ok(c.unregister_self(&sender)?),
            _ => Err(wrong_contract(controller, "Controller")),
        })?;
        Ok(removed)
    }

    pub fn mint_reputation(&mut self, sender: Address, controller: Address, to: Address, amount: U256) -> Result<Receipt, ChainError> {
        let (_, receipt) = self.transact(sender, "mint_reputation", |chain| match chain.contract_mut(controller)? {
            Deployed::Controller(c) => Ok(c.mint_reputation(&sender, amount, &to)?),
            _ => Err(wrong_contract(controller, "Controller")),
        })?;
        Ok(receipt)
    }

    /// Returns the amount actually burned, capped at the holder's balance.
    pub fn burn_reputation(&mut self, sender: Address, controller: Address, from: Address, amount: U256) -> Result<U256, ChainError> {
        let (burned, _) = self.transact(sender, "burn_reputation", |chain| match chain.contract_mut(controller)? {
            Deployed::Controller(c) => Ok(c.burn_reputation(&sender, amount, &from)?),
            _ => Err(wrong_contract(controller, "Controller")),
        })?;
        Ok(burned)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn permission_registry(&self, address: Address) -> Result<&PermissionRegistry, ChainError> {
        match self.contract(address)? {
            Deployed::PermissionRegistry(r) => Ok(r),
            _ => Err(wrong_contract(address, "PermissionRegistry")),
        }
    }

    pub fn controller(&self, address: Address) -> Result<&Controller, ChainError> {
        match self.contract(address)? {
            Deployed::Controller(c) => Ok(c),
            _ => Err(wrong_contract(address, "Controller")),
        }
    }

    pub fn voting_machine(&self, address: Address) -> Result<&VotingMachine, ChainError> {
        match self.contract(address)? {
            Deployed::VotingMachine(vm) => Ok(vm),
            _ => Err(wrong_contract(address, "VotingMachine")),
        }
    }

    pub fn wallet_scheme(&self, address: Address) -> Result<&WalletScheme, ChainError> {
        match self.contract(address)? {
            Deployed::WalletScheme(s) => Ok(s),
            _ => Err(wrong_contract(address, "WalletScheme")),
        }
    }

    pub fn upgrade_scheme(&self, address: Address) -> Result<&UpgradeScheme, ChainError> {
        match self.contract(address)? {
            Deployed::UpgradeScheme(s) => Ok(s),
            _ => Err(wrong_contract(address, "UpgradeScheme")),
        }
    }

    pub fn get_proposal(&self, scheme: Address, id: ProposalId) -> Result<Proposal, ChainError> {
        self.wallet_scheme(scheme)?
            .proposal(&id)
            .cloned()
            .ok_or_else(|| GovernanceError::ProposalNotFound(id).into())
    }

    pub fn get_upgrade_proposal(&self, scheme: Address, id: ProposalId) -> Result<UpgradeProposal, ChainError> {
        self.upgrade_scheme(scheme)?
            .proposal(&id)
            .cloned()
            .ok_or_else(|| GovernanceError::ProposalNotFound(id).into())
    }

    pub fn proposal_state(&self, scheme: Address, id: ProposalId) -> Result<ProposalState, ChainError> {
        let state = match self.contract(scheme)? {
            Deployed::WalletScheme(s) => s.proposal_state(&id),
            Deployed::UpgradeScheme(s) => s.proposal_state(&id),
            _ => return Err(wrong_contract(scheme, "scheme")),
        };
        state.ok_or_else(|| GovernanceError::ProposalNotFound(id).into())
    }

    pub fn get_permission(
        &self,
        registry: Address,
        caller: Address,
        target: Address,
        selector: Selector,
    ) -> Result<PermissionRecord, ChainError> {
        Ok(self.permission_registry(registry)?.get_permission(&caller, &target, &selector))
    }

    /// The raw record under the exact key, without wildcard fallback.
    pub fn permission(
        &self,
        registry: Address,
        caller: Address,
        target: Address,
        selector: Selector,
    ) -> Result<PermissionRecord, ChainError> {
        Ok(self.permission_registry(registry)?.permission(&caller, &target, &selector))
    }

    pub fn scheme(&self, controller: Address, scheme: Address) -> Result<SchemeRecord, ChainError> {
        Ok(self.controller(controller)?.scheme(&scheme))
    }

    pub fn reputation_of(&self, controller: Address, holder: Address) -> Result<U256, ChainError> {
        Ok(self.controller(controller)?.reputation().balance_of(&holder))
    }

    pub fn total_reputation(&self, controller: Address) -> Result<U256, ChainError> {
        Ok(self.controller(controller)?.reputation().total_supply())
    }

    pub fn controller_of(&self, avatar: &Address) -> Option<Address> {
        self.world.controllers.get(avatar).copied()
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn contract(&self, address: Address) -> Result<&Deployed, ChainError> {
        self.world.contracts.get(&address).ok_or(ChainError::UnknownContract(address))
    }

    fn contract_mut(&mut self, address: Address) -> Result<&mut Deployed, ChainError> {
        if self.executing.contains(&address) {
            return Err(ChainError::Reverted(format!("{address} is busy")));
        }
        self.world.contracts.get_mut(&address).ok_or(ChainError::UnknownContract(address))
    }

    /// Take a contract out of the world while it runs, so it can drive the
    /// ledger without aliasing itself.
    fn with_contract<T>(
        &mut self,
        address: Address,
        f: impl FnOnce(&mut Deployed, &mut Self) -> Result<T, ChainError>,
    ) -> Result<T, ChainError> {
        if self.executing.contains(&address) {
            return Err(ChainError::Reverted(format!("{address} is busy")));
        }
        let mut deployed = self
            .world
            .contracts
            .remove(&address)
            .ok_or(ChainError::UnknownContract(address))?;
        self.executing.push(address);
        let result = f(&mut deployed, self);
        self.executing.retain(|a| *a != address);
        self.world.contracts.insert(address, deployed);
        result
    }

    fn organization_reputation(&self, avatar: &Address) -> Result<&Reputation, ChainError> {
        let controller = self
            .controller_of(avatar)
            .ok_or_else(|| ChainError::Reverted(format!("{avatar} has no controller")))?;
        Ok(self.controller(controller)?.reputation())
    }

    fn settle(&mut self, voting_machine: Address, id: ProposalId, decision: Decision) -> Result<(), ChainError> {
        let scheme = self
            .voting_machine(voting_machine)?
            .tally(&id)
            .map(|t| t.scheme)
            .ok_or(VotingError::ProposalNotFound(id))?;
        self.execute_scheme(voting_machine, scheme, id, decision)
    }

    fn execute_scheme(&mut self, caller: Address, scheme: Address, id: ProposalId, decision: Decision) -> Result<(), ChainError> {
        let resolution = self.with_contract(scheme, |deployed, chain| {
            let binding: &mut dyn ContractBinding = match deployed {
                Deployed::WalletScheme(s) => s,
                Deployed::UpgradeScheme(s) => s,
                _ => return Err(wrong_contract(scheme, "scheme")),
            };
            Ok(binding.execute_proposal(caller, id, decision, chain)?)
        })?;
        self.emit_resolution(scheme, id, resolution);
        Ok(())
    }

    fn emit_resolution(&mut self, scheme: Address, id: ProposalId, resolution: ProposalResolution) {
        match resolution.report {
            None => self.world.events.push(ChainEvent::ProposalRejected {
                scheme,
                proposal_id: id,
            }),
            Some(report) => self.world.events.push(ChainEvent::ExecutionResults {
                scheme,
                proposal_id: id,
                successes: report.successes(),
                return_data: report.return_data(),
            }),
        }
        self.world.events.push(ChainEvent::ProposalStateChange {
            scheme,
            proposal_id: id,
            state: resolution.state,
        });
    }

    fn emit_permission_set(&mut self, registry: Address, caller: Address, target: Address, selector: Selector, record: &PermissionRecord) {
        self.world.events.push(ChainEvent::PermissionSet {
            registry,
            caller,
            target,
            selector,
            value_allowed: record.value_allowed,
            from_time: record.from_time,
        });
    }

    fn move_value(&mut self, from: Address, to: Address, value: U256) -> Result<(), ChainError> {
        if value.is_zero() {
            return Ok(());
        }
        let available = self.balance_of(&from);
        if available < value {
            return Err(ChainError::InsufficientBalance {
                account: from,
                available,
                required: value,
            });
        }
        self.world.balances.insert(from, available - value);
        *self.world.balances.entry(to).or_default() += value;
        self.world.events.push(ChainEvent::Transfer { from, to, value });
        Ok(())
    }

    /// One atomic call: on revert every change it made is undone.
    fn call(&mut self, from: Address, to: Address, data: &[u8], value: U256, depth: usize) -> CallResult {
        let snapshot = self.world.clone();
        match self.call_inner(from, to, data, value, depth) {
            Ok(returned) => CallResult::ok(returned),
            Err(revert) => {
                self.world = snapshot;
                CallResult::reverted(revert)
            }
        }
    }

    fn call_inner(&mut self, from: Address, to: Address, data: &[u8], value: U256, depth: usize) -> Result<Bytes, Bytes> {
        if depth > self.config.max_call_depth {
            return Err(encode_revert("call depth exceeded"));
        }
        if self.executing.contains(&to) {
            return Err(encode_revert("reentrant call"));
        }
        self.move_value(from, to, value).map_err(|e| encode_revert(e.to_string()))?;
        let now = self.now();

        match self.world.contracts.get_mut(&to) {
            // Externally owned account.
            None => Ok(Bytes::new()),
            Some(Deployed::PermissionRegistry(registry)) => {
                let IPermissionRegistryCalls::setPermission(c) = IPermissionRegistryCalls::abi_decode(data, true)
                    .map_err(|_| encode_revert("PermissionRegistry: unknown function"))?;
                let grant = PermissionGrant {
                    target: c.to,
                    selector: c.functionSignature,
                    value_allowed: c.valueAllowed,
                    delay_secs: 0,
                    allowed: c.allowed,
                };
                let record = registry
                    .set_permission(from, grant, now)
                    .map_err(|e| encode_revert(e.to_string()))?;
                self.emit_permission_set(to, from, grant.target, grant.selector, &record);
                Ok(Bytes::new())
            }
            Some(Deployed::Controller(controller)) => {
                let outcome = controller
                    .handle_call(&from, data)
                    .map_err(|e| encode_revert(e.to_string()))?;
                match outcome {
                    ControllerOutcome::Returned(returned) => Ok(returned),
                    ControllerOutcome::GenericCall {
                        avatar,
                        target,
                        data,
                        value,
                    } => {
                        let inner = self.call(avatar, target, &data, value, depth + 1);
                        if inner.success {
                            Ok(encode_generic_call_result(true, inner.return_data))
                        } else {
                            Err(inner.return_data)
                        }
                    }
                }
            }
            Some(Deployed::External(contract)) => {
                let mut env = CallEnv::new(from, to, value, now, &mut self.world.balances);
                contract.call(&mut env, data)
            }
            // Governance contracts accept plain value transfers only.
            Some(other) => {
                if data.is_empty() {
                    Ok(Bytes::new())
                } else {
                    Err(encode_revert(format!("{} does not accept calls", other.name())))
                }
            }
        }
    }
}

impl VotingGate for LocalChain {
    fn now(&self) -> Timestamp {
        LocalChain::now(self)
    }

    fn open_vote(
        &mut self,
        voting_machine: Address,
        scheme: Address,
        organization: Address,
        params_hash: B256,
        proposer: Address,
    ) -> Result<ProposalId, GovernanceError> {
        let now = LocalChain::now(self);
        match self.world.contracts.get_mut(&voting_machine) {
            Some(Deployed::VotingMachine(vm)) => Ok(vm.propose(scheme, organization, params_hash, proposer, now)?),
            _ => Err(GovernanceError::Other(format!("no voting machine at {voting_machine}"))),
        }
    }
}

impl CallDispatcher for LocalChain {
    fn now(&self) -> Timestamp {
        LocalChain::now(self)
    }

    fn check_permission(
        &self,
        registry: Address,
        caller: Address,
        target: Address,
        selector: Selector,
        value: U256,
    ) -> PermissionCheck {
        match self.world.contracts.get(&registry) {
            Some(Deployed::PermissionRegistry(r)) => {
                r.check_permission(&caller, &target, &selector, value, LocalChain::now(self))
            }
            _ => PermissionCheck::not_granted(),
        }
    }

    fn dispatch(&mut self, call: OutboundCall) -> CallResult {
        match call.route {
            CallRoute::Direct => self.call(call.from, call.to, &call.data, call.value, 0),
            CallRoute::ViaController(controller) => {
                let avatar = match self.world.contracts.get(&controller) {
                    Some(Deployed::Controller(c)) => c.avatar(),
                    _ => return CallResult::reverted(encode_revert(format!("no controller at {controller}"))),
                };
                let data = dxgov_abi::calls::generic_call(call.to, call.data, avatar, call.value);
                let outer = self.call(call.from, controller, &data, U256::ZERO, 0);
                if !outer.success {
                    return outer;
                }
                match decode_generic_call_result(&outer.return_data) {
                    Ok((_, returned)) => CallResult::ok(returned),
                    Err(e) => CallResult::reverted(encode_revert(e.to_string())),
                }
            }
        }
    }
}
