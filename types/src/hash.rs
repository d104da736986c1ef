//! Proposal identifiers.

use crate::error::TypesError;
use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 32-byte proposal identifier, assigned by the voting machine at submission.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProposalId(B256);

impl ProposalId {
    pub const ZERO: Self = Self(B256::ZERO);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(B256::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }

    pub fn as_b256(&self) -> B256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == B256::ZERO
    }
}

impl From<B256> for ProposalId {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl fmt::Debug for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProposalId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for ProposalId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypesError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            });
        }
        Ok(Self(B256::from_slice(&bytes)))
    }
}
