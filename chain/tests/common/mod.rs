//! Shared fixture: an organization with a master and a quick wallet scheme.
//!
//! Three members hold 20, 10 and 70 reputation, so member 2 decides any vote
//! alone. Both acting accounts (the avatar for the master scheme, the quick
//! scheme itself) hold an admin wildcard permission. The master scheme is
//! registered with every controller permission, the quick one with none
//! beyond being registered.

#![allow(dead_code)]

use std::sync::Arc;

use dxgov_chain::{deploy_dao, ChainConfig, DaoConfig, LocalChain, NetworkContracts, Receipt, ReputationHolder, WalletSchemeSpec};
use dxgov_governance::{Proposal, ProposalState};
use dxgov_nullables::{ActionMock, NullClock, Wallet};
use dxgov_types::{Address, Bytes, ProposalId, B256, NULL_ADDRESS, U256};

pub const TEST_VALUE: u64 = 123;
pub const TEST_TITLE: &str = "Test Title";
pub const GENESIS_TIME: u64 = 1_700_000_000;
pub const YES: u8 = 1;
pub const NO: u8 = 2;

pub fn test_hash() -> B256 {
    B256::repeat_byte(0x11)
}

pub fn account(i: u8) -> Address {
    Address::with_last_byte(0x10 + i)
}

pub struct TestDao {
    pub chain: LocalChain,
    pub clock: Arc<NullClock>,
    pub contracts: NetworkContracts,
    pub avatar: Address,
    pub controller: Address,
    pub registry: Address,
    pub voting_machine: Address,
    pub master: Address,
    pub quick: Address,
    pub action_mock: Address,
}

pub fn dao_config() -> DaoConfig {
    DaoConfig {
        founder: account(0),
        registry_owner: None,
        upgrade_scheme: false,
        reputation: [20u64, 10, 70]
            .iter()
            .enumerate()
            .map(|(i, amount)| ReputationHolder {
                address: account(i as u8),
                amount: *amount,
            })
            .collect(),
        wallet_schemes: vec![
            WalletSchemeSpec {
                name: "MasterWalletScheme".to_string(),
                master: true,
                permissions: 0x1f,
                allow_all_calls: true,
            },
            WalletSchemeSpec {
                name: "QuickWalletScheme".to_string(),
                master: false,
                permissions: 0x01,
                allow_all_calls: true,
            },
        ],
    }
}

pub fn setup() -> TestDao {
    setup_with(dao_config())
}

pub fn setup_with(config: DaoConfig) -> TestDao {
    let clock = Arc::new(NullClock::new(GENESIS_TIME));
    let mut chain = LocalChain::new(ChainConfig::default(), clock.clone());
    for i in 0..5 {
        chain.set_balance(account(i), U256::from(1_000_000_000u64));
    }

    let contracts = deploy_dao(&mut chain, &config).expect("deploy dao");
    let action_mock = chain
        .deploy_contract(account(0), Box::new(ActionMock::new()))
        .expect("deploy action mock");
    chain.increase_time(10);

    TestDao {
        avatar: contracts.avatar,
        controller: contracts.controller,
        registry: contracts.permission_registry,
        voting_machine: contracts.voting_machine().expect("voting machine"),
        master: contracts.scheme("MasterWalletScheme").unwrap_or(NULL_ADDRESS),
        quick: contracts.scheme("QuickWalletScheme").unwrap_or(NULL_ADDRESS),
        action_mock,
        contracts,
        chain,
        clock,
    }
}

impl TestDao {
    pub fn propose(&mut self, scheme: Address, to: Vec<Address>, call_data: Vec<Bytes>, value: Vec<u64>) -> ProposalId {
        let value = value.into_iter().map(U256::from).collect();
        let (id, receipt) = self
            .chain
            .propose_calls(account(0), scheme, to, call_data, value, TEST_TITLE, test_hash())
            .expect("propose");
        assert_eq!(receipt.proposal_id(), Some(id));
        id
    }

    /// Vote with member 2, whose 70% decides.
    pub fn decide(&mut self, id: ProposalId, option: u8) -> Receipt {
        self.chain
            .vote(account(2), self.voting_machine, id, option, U256::ZERO, NULL_ADDRESS)
            .expect("vote")
    }

    pub fn proposal(&self, scheme: Address, id: ProposalId) -> Proposal {
        self.chain.get_proposal(scheme, id).expect("proposal")
    }

    pub fn state(&self, scheme: Address, id: ProposalId) -> ProposalState {
        self.proposal(scheme, id).state()
    }

    /// A wallet owned by `owner`, deployed by member 0.
    pub fn deploy_wallet(&mut self, owner: Address) -> Address {
        let wallet = self
            .chain
            .deploy_contract(account(0), Box::new(Wallet::new(account(0))))
            .expect("deploy wallet");
        self.chain
            .send_transaction(account(0), wallet, Wallet::transfer_ownership_call(owner), U256::ZERO)
            .expect("transfer ownership");
        wallet
    }

    pub fn fund(&mut self, to: Address, amount: u64) {
        self.chain
            .send_transaction(account(0), to, Bytes::new(), U256::from(amount))
            .expect("fund");
    }

    pub fn balance(&self, account: Address) -> U256 {
        self.chain.balance_of(&account)
    }

    pub fn reputation(&self, holder: Address) -> U256 {
        self.chain.reputation_of(self.controller, holder).expect("reputation")
    }
}
