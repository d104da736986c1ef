//! User contracts deployed next to the governance contracts.

use dxgov_abi::encode_revert;
use dxgov_types::{Address, Bytes, Timestamp, U256};
use std::collections::HashMap;

/// What a contract sees of the ledger during one call.
pub struct CallEnv<'a> {
    /// Immediate caller.
    pub sender: Address,
    /// The contract being called.
    pub this: Address,
    /// Value attached to the call, already credited to `this`.
    pub value: U256,
    pub now: Timestamp,
    balances: &'a mut HashMap<Address, U256>,
}

impl<'a> CallEnv<'a> {
    pub fn new(
        sender: Address,
        this: Address,
        value: U256,
        now: Timestamp,
        balances: &'a mut HashMap<Address, U256>,
    ) -> Self {
        Self {
            sender,
            this,
            value,
            now,
            balances,
        }
    }

    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Send `amount` of this contract's balance to `to`. The recipient's code
    /// is not run.
    pub fn transfer(&mut self, to: Address, amount: U256) -> Result<(), Bytes> {
        let available = self.balance_of(&self.this);
        if available < amount {
            return Err(encode_revert("insufficient balance for transfer"));
        }
        self.balances.insert(self.this, available - amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }
}

/// A contract with its own state, called with raw ABI data.
///
/// `Err` carries the revert data. Every change the call made is rolled back
/// by the ledger when it reverts.
pub trait Contract: Send {
    fn name(&self) -> &'static str;

    fn call(&mut self, env: &mut CallEnv<'_>, data: &[u8]) -> Result<Bytes, Bytes>;

    fn box_clone(&self) -> Box<dyn Contract>;
}

impl Clone for Box<dyn Contract> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}
