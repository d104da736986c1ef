//! In-memory gate and ledger shared by the scheme tests.

use crate::binding::VotingGate;
use crate::error::GovernanceError;
use crate::executor::{CallDispatcher, OutboundCall};
use crate::proposal::CallResult;
use dxgov_abi::encode_revert;
use dxgov_permissions::{PermissionCheck, PermissionRegistry};
use dxgov_types::{keccak256, Address, Bytes, ProposalId, Selector, Timestamp, B256, U256};

pub fn addr(n: u8) -> Address {
    Address::with_last_byte(n)
}

pub const VOTING_MACHINE: u8 = 0x70;
pub const AVATAR: u8 = 0xa0;
pub const CONTROLLER: u8 = 0xc0;
pub const REGISTRY: u8 = 0xe0;
pub const OWNER: u8 = 0x01;

/// Hands out sequential ids and records who opened a vote.
#[derive(Default)]
pub struct FakeGate {
    pub opened: Vec<(Address, Address, B256)>,
}

impl VotingGate for FakeGate {
    fn now(&self) -> Timestamp {
        Timestamp::new(1_000)
    }

    fn open_vote(
        &mut self,
        _voting_machine: Address,
        scheme: Address,
        organization: Address,
        params_hash: B256,
        _proposer: Address,
    ) -> Result<ProposalId, GovernanceError> {
        self.opened.push((scheme, organization, params_hash));
        let counter = (self.opened.len() as u64).to_be_bytes();
        Ok(ProposalId::from(keccak256(counter)))
    }
}

/// Permission registry plus a log of dispatched calls. Calls to `reverting`
/// targets fail with "nope".
pub struct FakeLedger {
    pub now: Timestamp,
    pub registry: PermissionRegistry,
    pub dispatched: Vec<OutboundCall>,
    pub reverting: Vec<Address>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self {
            now: Timestamp::new(1_000),
            registry: PermissionRegistry::new(addr(REGISTRY), addr(OWNER), 10).expect("nonzero delay"),
            dispatched: Vec::new(),
            reverting: Vec::new(),
        }
    }

    pub fn allow_all(&mut self, caller: Address) {
        self.registry
            .set_admin_permission(
                &addr(OWNER),
                caller,
                dxgov_types::ANY_ADDRESS,
                dxgov_types::ANY_FUNC_SIGNATURE,
                U256::MAX,
                true,
                self.now,
            )
            .unwrap();
    }
}

impl CallDispatcher for FakeLedger {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn check_permission(
        &self,
        _registry: Address,
        caller: Address,
        target: Address,
        selector: Selector,
        value: U256,
    ) -> PermissionCheck {
        self.registry.check_permission(&caller, &target, &selector, value, self.now)
    }

    fn dispatch(&mut self, call: OutboundCall) -> CallResult {
        let reverts = self.reverting.contains(&call.to);
        self.dispatched.push(call);
        if reverts {
            CallResult::reverted(encode_revert("nope"))
        } else {
            CallResult::ok(Bytes::new())
        }
    }
}
