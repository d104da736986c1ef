//! Permission records and the result of a permission check.

use crate::error::PermissionDenied;
use dxgov_types::{Address, Selector, Timestamp, ANY_ADDRESS, ANY_FUNC_SIGNATURE, U256};
use serde::{Deserialize, Serialize};

/// Lookup key of a permission record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
    /// The account making the call (avatar or scheme).
    pub caller: Address,
    pub target: Address,
    pub selector: Selector,
}

impl PermissionKey {
    pub fn new(caller: Address, target: Address, selector: Selector) -> Self {
        Self {
            caller,
            target,
            selector,
        }
    }

    /// The fallback key of the same caller.
    pub fn wildcard(caller: Address) -> Self {
        Self::new(caller, ANY_ADDRESS, ANY_FUNC_SIGNATURE)
    }

    pub fn is_wildcard(&self) -> bool {
        self.target == ANY_ADDRESS && self.selector == ANY_FUNC_SIGNATURE
    }
}

/// A stored grant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    /// Maximum native value a single call may carry.
    pub value_allowed: U256,
    /// Activation time. `EPOCH` means never granted (or revoked).
    pub from_time: Timestamp,
}

impl PermissionRecord {
    pub fn is_granted(&self) -> bool {
        !self.from_time.is_epoch()
    }

    pub fn is_active(&self, now: Timestamp) -> bool {
        self.is_granted() && now >= self.from_time
    }
}

/// A self-service grant request, as issued by the caller itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermissionGrant {
    pub target: Address,
    pub selector: Selector,
    pub value_allowed: U256,
    /// Requested activation delay. The registry never uses less than its own
    /// minimum delay.
    pub delay_secs: u64,
    /// `false` revokes the record, including a pending grant.
    pub allowed: bool,
}

/// Which record decided a check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionSource {
    Exact,
    Wildcard,
    None,
}

/// Outcome of [`crate::PermissionRegistry::check_permission`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionCheck {
    pub allowed: bool,
    /// Activation time of the deciding record (`EPOCH` if nothing was ever granted).
    pub active_from: Timestamp,
    pub source: PermissionSource,
    pub denied: Option<PermissionDenied>,
}

impl PermissionCheck {
    pub(crate) fn allow(record: &PermissionRecord, source: PermissionSource) -> Self {
        Self {
            allowed: true,
            active_from: record.from_time,
            source,
            denied: None,
        }
    }

    pub(crate) fn deny(active_from: Timestamp, source: PermissionSource, reason: PermissionDenied) -> Self {
        Self {
            allowed: false,
            active_from,
            source,
            denied: Some(reason),
        }
    }

    /// A refusal with no record behind it, e.g. when the registry is missing.
    pub fn not_granted() -> Self {
        Self::deny(Timestamp::EPOCH, PermissionSource::None, PermissionDenied::NotGranted)
    }

    /// An unconditional pass, used for calls the registry does not gate.
    pub fn bypass() -> Self {
        Self {
            allowed: true,
            active_from: Timestamp::EPOCH,
            source: PermissionSource::None,
            denied: None,
        }
    }
}
