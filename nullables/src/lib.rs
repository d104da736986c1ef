//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano: the ledger's
//! outside world (its clock, the contracts a proposal calls) sits behind
//! traits, and this crate provides implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: hand a [`NullClock`] to `LocalChain::new` and deploy the mock
//! contracts with `LocalChain::deploy_contract`.

pub mod action_mock;
pub mod clock;
pub mod wallet;

pub use action_mock::ActionMock;
pub use clock::NullClock;
pub use wallet::Wallet;
