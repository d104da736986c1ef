//! An owned wallet: accepts value from anyone, pays out only to its owner's order.

use alloy_sol_types::{sol, SolInterface};
use dxgov_abi::encode_revert;
use dxgov_chain::{CallEnv, Contract};
use dxgov_types::{Address, Bytes};

sol! {
    interface IWallet {
        function pay(address to);
        function transferOwnership(address newOwner);
    }
}

pub use IWallet::IWalletCalls;

pub const NOT_OWNER: &str = "Ownable: caller is not the owner";

#[derive(Clone, Debug)]
pub struct Wallet {
    owner: Address,
}

impl Wallet {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Payload of `pay(to)`: send the whole balance to `to`.
    pub fn pay_call(to: Address) -> Bytes {
        IWalletCalls::pay(IWallet::payCall { to }).abi_encode().into()
    }

    pub fn transfer_ownership_call(new_owner: Address) -> Bytes {
        IWalletCalls::transferOwnership(IWallet::transferOwnershipCall { newOwner: new_owner })
            .abi_encode()
            .into()
    }
}

impl Contract for Wallet {
    fn name(&self) -> &'static str {
        "Wallet"
    }

    fn call(&mut self, env: &mut CallEnv<'_>, data: &[u8]) -> Result<Bytes, Bytes> {
        // Anything that is not one of our functions is a deposit.
        let Ok(call) = IWalletCalls::abi_decode(data, true) else {
            return Ok(Bytes::new());
        };
        if env.sender != self.owner {
            return Err(encode_revert(NOT_OWNER));
        }
        match call {
            IWalletCalls::pay(c) => {
                let balance = env.balance_of(&env.this);
                env.transfer(c.to, balance)?;
            }
            IWalletCalls::transferOwnership(c) => self.owner = c.newOwner,
        }
        Ok(Bytes::new())
    }

    fn box_clone(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
}
