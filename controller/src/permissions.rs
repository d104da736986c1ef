//! Scheme permission bitmask.

use dxgov_types::FixedBytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Permissions of a scheme registered in the controller.
///
/// Bit layout (as encoded in the `bytes4 permissions` argument):
/// - `0x01` registered (implicit for every registered scheme)
/// - `0x02` may register/unregister other schemes
/// - `0x04` may add/remove global constraints
/// - `0x08` may upgrade the controller
/// - `0x10` may make generic calls from the avatar
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemePermissions(u32);

impl SchemePermissions {
    pub const NONE: Self = Self(0);
    pub const REGISTERED: Self = Self(0x01);
    pub const REGISTER_SCHEMES: Self = Self(0x02);
    pub const GLOBAL_CONSTRAINTS: Self = Self(0x04);
    pub const UPGRADE_CONTROLLER: Self = Self(0x08);
    pub const GENERIC_CALL: Self = Self(0x10);
    pub const ALL: Self = Self(0x1f);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub fn from_bytes4(bytes: FixedBytes<4>) -> Self {
        Self::from_bits(u32::from_be_bytes(bytes.0))
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn to_bytes4(&self) -> FixedBytes<4> {
        FixedBytes::new(self.0.to_be_bytes())
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_registered(&self) -> bool {
        self.contains(Self::REGISTERED)
    }
}

impl fmt::Debug for SchemePermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemePermissions({:#010x})", self.0)
    }
}

impl fmt::Display for SchemePermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_bytes4_notation() {
        assert_eq!(SchemePermissions::ALL.to_string(), "0x0000001f");
        assert_eq!(SchemePermissions::from_bits(0x0f).to_string(), "0x0000000f");
    }

    #[test]
    fn unknown_bits_are_dropped() {
        assert_eq!(SchemePermissions::from_bits(0xff).bits(), 0x1f);
    }

    #[test]
    fn bytes4_roundtrip() {
        let perms = SchemePermissions::from_bits(0x09);
        assert_eq!(SchemePermissions::from_bytes4(perms.to_bytes4()), perms);
        assert!(perms.contains(SchemePermissions::UPGRADE_CONTROLLER));
        assert!(!perms.contains(SchemePermissions::GENERIC_CALL));
    }
}
