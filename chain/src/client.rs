//! Async client over a shared [`LocalChain`].
//!
//! Every request waits for the ledger lock at most `confirmation_timeout_ms`
//! and then runs to confirmation. A request that cannot get the ledger in
//! time fails with [`ChainError::Timeout`] and changes nothing.

use std::sync::Arc;
use std::time::Duration;

use dxgov_controller::{SchemePermissions, SchemeRecord};
use dxgov_governance::{Proposal, ProposalState};
use dxgov_permissions::PermissionRecord;
use dxgov_types::{Address, Bytes, ProposalId, Selector, B256, U256};
use tokio::sync::Mutex;

use crate::chain::LocalChain;
use crate::receipt::Receipt;
use crate::ChainError;

#[derive(Clone)]
pub struct ChainClient {
    chain: Arc<Mutex<LocalChain>>,
    timeout: Duration,
}

impl ChainClient {
    /// Take ownership of `chain`, using its configured confirmation timeout.
    pub fn new(chain: LocalChain) -> Self {
        let timeout = Duration::from_millis(chain.config().confirmation_timeout_ms);
        Self {
            chain: Arc::new(Mutex::new(chain)),
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The ledger behind this client, shared with every clone of it.
    pub fn shared(&self) -> Arc<Mutex<LocalChain>> {
        Arc::clone(&self.chain)
    }

    async fn with_chain<T>(&self, f: impl FnOnce(&mut LocalChain) -> Result<T, ChainError>) -> Result<T, ChainError> {
        let mut chain = tokio::time::timeout(self.timeout, self.chain.lock())
            .await
            .map_err(|_| ChainError::Timeout(self.timeout.as_millis() as u64))?;
        f(&mut chain)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn propose_calls(
        &self,
        sender: Address,
        scheme: Address,
        to: Vec<Address>,
        call_data: Vec<Bytes>,
        value: Vec<U256>,
        title: String,
        description_hash: B256,
    ) -> Result<(ProposalId, Receipt), ChainError> {
        self.with_chain(|chain| chain.propose_calls(sender, scheme, to, call_data, value, title, description_hash))
            .await
    }

    pub async fn vote(
        &self,
        sender: Address,
        voting_machine: Address,
        id: ProposalId,
        option: u8,
        amount: U256,
        delegator: Address,
    ) -> Result<Receipt, ChainError> {
        self.with_chain(|chain| chain.vote(sender, voting_machine, id, option, amount, delegator))
            .await
    }

    pub async fn execute(&self, sender: Address, voting_machine: Address, id: ProposalId) -> Result<Receipt, ChainError> {
        self.with_chain(|chain| chain.execute(sender, voting_machine, id)).await
    }

    pub async fn get_proposal(&self, scheme: Address, id: ProposalId) -> Result<Proposal, ChainError> {
        self.with_chain(|chain| chain.get_proposal(scheme, id)).await
    }

    pub async fn proposal_state(&self, scheme: Address, id: ProposalId) -> Result<ProposalState, ChainError> {
        self.with_chain(|chain| chain.proposal_state(scheme, id)).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn set_permission(
        &self,
        sender: Address,
        registry: Address,
        target: Address,
        selector: Selector,
        value_allowed: U256,
        delay_secs: u64,
        allowed: bool,
    ) -> Result<PermissionRecord, ChainError> {
        self.with_chain(|chain| {
            chain
                .set_permission(sender, registry, target, selector, value_allowed, delay_secs, allowed)
                .map(|(record, _)| record)
        })
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn set_admin_permission(
        &self,
        sender: Address,
        registry: Address,
        caller: Address,
        target: Address,
        selector: Selector,
        value_allowed: U256,
        allowed: bool,
    ) -> Result<PermissionRecord, ChainError> {
        self.with_chain(|chain| {
            chain
                .set_admin_permission(sender, registry, caller, target, selector, value_allowed, allowed)
                .map(|(record, _)| record)
        })
        .await
    }

    pub async fn get_permission(
        &self,
        registry: Address,
        caller: Address,
        target: Address,
        selector: Selector,
    ) -> Result<PermissionRecord, ChainError> {
        self.with_chain(|chain| chain.get_permission(registry, caller, target, selector)).await
    }

    pub async fn register_scheme(
        &self,
        sender: Address,
        controller: Address,
        scheme: Address,
        params_hash: B256,
        permissions: SchemePermissions,
    ) -> Result<Receipt, ChainError> {
        self.with_chain(|chain| chain.register_scheme(sender, controller, scheme, params_hash, permissions))
            .await
    }

    pub async fn unregister_scheme(&self, sender: Address, controller: Address, scheme: Address) -> Result<bool, ChainError> {
        self.with_chain(|chain| chain.unregister_scheme(sender, controller, scheme)).await
    }

    pub async fn scheme(&self, controller: Address, scheme: Address) -> Result<SchemeRecord, ChainError> {
        self.with_chain(|chain| chain.scheme(controller, scheme)).await
    }

    pub async fn send_transaction(&self, from: Address, to: Address, data: Bytes, value: U256) -> Result<(Bytes, Receipt), ChainError> {
        self.with_chain(|chain| chain.send_transaction(from, to, data, value)).await
    }

    pub async fn increase_time(&self, secs: u64) -> Result<(), ChainError> {
        self.with_chain(|chain| {
            chain.increase_time(secs);
            Ok(())
        })
        .await
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, ChainError> {
        self.with_chain(|chain| Ok(chain.balance_of(&account))).await
    }

    pub async fn reputation_of(&self, controller: Address, holder: Address) -> Result<U256, ChainError> {
        self.with_chain(|chain| chain.reputation_of(controller, holder)).await
    }
}
