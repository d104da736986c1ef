//! ABI glue for the governance contracts.
//!
//! Proposals carry opaque call payloads. This crate builds those payloads for the
//! functions a proposal usually targets (permission registry, controller), decodes
//! them on the receiving side, and encodes/decodes the standard `Error(string)`
//! revert data that failed calls return.

pub mod calls;
pub mod error;
pub mod revert;

pub use calls::{IController, IPermissionRegistry};
pub use error::AbiError;
pub use revert::{decode_revert, encode_revert};

use alloy_primitives::Bytes;
use alloy_sol_types::SolValue;

/// ABI-encode a single `bool` return value (one 32-byte word).
pub fn encode_bool(value: bool) -> Bytes {
    Bytes::from(value.abi_encode())
}

/// Decode a `(bool success, bytes returnValue)` pair, the return of a generic call.
pub fn decode_generic_call_result(data: &[u8]) -> Result<(bool, Bytes), AbiError> {
    <(bool, Bytes)>::abi_decode_params(data, true).map_err(AbiError::from)
}

/// Encode a `(bool success, bytes returnValue)` pair.
pub fn encode_generic_call_result(success: bool, data: Bytes) -> Bytes {
    Bytes::from((success, data).abi_encode_params())
}
