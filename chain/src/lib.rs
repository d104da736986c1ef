//! A local ledger that runs the DAO governance contracts.
//!
//! [`LocalChain`] keeps balances, deployed contracts and an ordered log of
//! receipts. Clients see the lifecycle of a proposal through its methods:
//! submit a batch of calls, vote, and read back the recorded per-call
//! results. [`deploy_dao`] builds a whole organization from a [`DaoConfig`];
//! [`ChainClient`] wraps a ledger for async callers.

pub mod chain;
pub mod client;
pub mod clock;
pub mod config;
pub mod contract;
pub mod deployment;
pub mod error;
pub mod logging;
pub mod receipt;

pub use chain::LocalChain;
pub use client::ChainClient;
pub use clock::{Clock, SystemClock};
pub use config::{ChainConfig, DaoConfig, ReputationHolder, WalletSchemeSpec};
pub use contract::{CallEnv, Contract};
pub use deployment::{deploy_dao, NetworkContracts};
pub use error::ChainError;
pub use logging::{init_logging, LogFormat};
pub use receipt::{ChainEvent, Receipt};
