//! A contract that only answers calls from one expected account.
//!
//! Proposals use it to check which account a call arrived from: the avatar
//! when routed through the controller, the scheme itself otherwise.

use alloy_sol_types::{sol, SolInterface};
use dxgov_abi::{encode_bool, encode_revert};
use dxgov_chain::{CallEnv, Contract};
use dxgov_types::{Address, Bytes};

sol! {
    interface IActionMock {
        function test(address _addr) returns (bool);
        function testWithoutReturnValue(address _addr);
    }
}

pub use IActionMock::IActionMockCalls;

pub const WRONG_CALLER: &str = "the caller must be equal to _addr";

#[derive(Clone, Debug, Default)]
pub struct ActionMock {
    calls: u64,
}

impl ActionMock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful calls served so far.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Payload of `test(addr)`: succeeds only when sent by `addr`.
    pub fn test_call_from(addr: Address) -> Bytes {
        IActionMockCalls::test(IActionMock::testCall { _addr: addr })
            .abi_encode()
            .into()
    }

    /// Payload of `testWithoutReturnValue(addr)`.
    pub fn test_call_without_return_value_from(addr: Address) -> Bytes {
        IActionMockCalls::testWithoutReturnValue(IActionMock::testWithoutReturnValueCall { _addr: addr })
            .abi_encode()
            .into()
    }
}

impl Contract for ActionMock {
    fn name(&self) -> &'static str {
        "ActionMock"
    }

    fn call(&mut self, env: &mut CallEnv<'_>, data: &[u8]) -> Result<Bytes, Bytes> {
        let call = IActionMockCalls::abi_decode(data, true).map_err(|_| encode_revert("ActionMock: unknown function"))?;
        let (expected, returns) = match call {
            IActionMockCalls::test(c) => (c._addr, true),
            IActionMockCalls::testWithoutReturnValue(c) => (c._addr, false),
        };
        if env.sender != expected {
            return Err(encode_revert(WRONG_CALLER));
        }
        self.calls += 1;
        Ok(if returns { encode_bool(true) } else { Bytes::new() })
    }

    fn box_clone(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
}
