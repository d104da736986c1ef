//! Standard `Error(string)` revert payloads.
//!
//! A reverted call inside a proposal is not an error of the proposal itself: its
//! reason is recorded as the call's return data and decoded here on demand.

use alloy_primitives::Bytes;
use alloy_sol_types::{Revert, SolError};

/// Encode `reason` as `Error(string)` revert data.
pub fn encode_revert(reason: impl Into<String>) -> Bytes {
    Revert {
        reason: reason.into(),
    }
    .abi_encode()
    .into()
}

/// Decode `Error(string)` revert data. Returns `None` for any other payload,
/// including empty return data.
pub fn decode_revert(data: &[u8]) -> Option<String> {
    Revert::abi_decode(data, true).ok().map(|r| r.reason)
}
