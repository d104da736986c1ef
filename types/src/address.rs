//! Addresses, selectors and the sentinel values the permission registry understands.

use alloy_primitives::{keccak256, Address, FixedBytes, B256};

/// A 4-byte function selector (first four bytes of a call payload).
pub type Selector = FixedBytes<4>;

/// The zero address. Used for "no controller" and "no delegator".
pub const NULL_ADDRESS: Address = Address::ZERO;

/// Wildcard target address for permission records.
pub const ANY_ADDRESS: Address = Address::new([0xaa; 20]);

/// Wildcard function selector for permission records.
pub const ANY_FUNC_SIGNATURE: Selector = FixedBytes::new([0xaa; 4]);

/// The zero hash (empty description / unregistered scheme parameters).
pub const NULL_HASH: B256 = B256::ZERO;

/// Extract the function selector from a call payload.
///
/// Payloads shorter than four bytes (plain value transfers such as `0x00`)
/// are zero-padded on the right.
pub fn selector_of(call_data: &[u8]) -> Selector {
    let mut out = [0u8; 4];
    let n = call_data.len().min(4);
    out[..n].copy_from_slice(&call_data[..n]);
    FixedBytes::new(out)
}

/// Deterministic address of the `nonce`-th contract deployed by `deployer`.
///
/// Not the RLP-based CREATE derivation; only uniqueness matters for the
/// local ledger.
pub fn contract_address(deployer: &Address, nonce: u64) -> Address {
    let mut preimage = Vec::with_capacity(28);
    preimage.extend_from_slice(deployer.as_slice());
    preimage.extend_from_slice(&nonce.to_be_bytes());
    let digest = keccak256(&preimage);
    Address::from_slice(&digest[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_match_registry_constants() {
        assert_eq!(
            ANY_ADDRESS.to_string().to_lowercase(),
            "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
        );
        assert_eq!(ANY_FUNC_SIGNATURE.as_slice(), &[0xaa, 0xaa, 0xaa, 0xaa]);
    }

    #[test]
    fn selector_of_short_payload_is_padded() {
        assert_eq!(selector_of(&[0x00]).as_slice(), &[0, 0, 0, 0]);
        assert_eq!(selector_of(&[]).as_slice(), &[0, 0, 0, 0]);
        assert_eq!(selector_of(&[1, 2]).as_slice(), &[1, 2, 0, 0]);
    }

    #[test]
    fn selector_of_takes_first_four_bytes() {
        assert_eq!(selector_of(&[1, 2, 3, 4, 5, 6]).as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn contract_addresses_are_unique_per_nonce() {
        let deployer = Address::with_last_byte(1);
        let a = contract_address(&deployer, 0);
        let b = contract_address(&deployer, 1);
        assert_ne!(a, b);
        assert_eq!(a, contract_address(&deployer, 0));
    }
}
