//! Fundamental types for the dxgov workspace.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! addresses and their well-known sentinels, proposal identifiers, function selectors
//! and timestamps. Ethereum primitives are re-exported from `alloy-primitives` so the
//! rest of the workspace depends on a single definition.

pub mod address;
pub mod error;
pub mod hash;
pub mod time;

pub use address::{
    contract_address, selector_of, Selector, ANY_ADDRESS, ANY_FUNC_SIGNATURE, NULL_ADDRESS,
    NULL_HASH,
};
pub use alloy_primitives::{keccak256, Address, Bytes, FixedBytes, B256, U256};
pub use error::TypesError;
pub use hash::ProposalId;
pub use time::Timestamp;
