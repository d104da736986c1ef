//! Non-transferable voting weight.

use dxgov_types::{Address, U256};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct Reputation {
    balances: HashMap<Address, U256>,
    total_supply: U256,
}

impl Reputation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, holder: &Address) -> U256 {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn mint(&mut self, to: &Address, amount: U256) {
        let balance = self.balances.entry(*to).or_default();
        *balance = balance.saturating_add(amount);
        self.total_supply = self.total_supply.saturating_add(amount);
    }

    /// Burn up to `amount` from `from`; burning more than the balance empties it.
    /// Returns the amount actually burned.
    pub fn burn(&mut self, from: &Address, amount: U256) -> U256 {
        let balance = self.balance_of(from);
        let burned = balance.min(amount);
        if burned.is_zero() {
            return burned;
        }
        let remaining = balance - burned;
        if remaining.is_zero() {
            self.balances.remove(from);
        } else {
            self.balances.insert(*from, remaining);
        }
        self.total_supply -= burned;
        burned
    }
}
