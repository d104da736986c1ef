use dxgov_types::{Address, Timestamp, U256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("PermissionRegistry: only owner can set admin permissions (sender {0})")]
    NotOwner(Address),

    #[error("PermissionRegistry: cannot set a specific selector on ANY_ADDRESS")]
    WildcardTargetWithSelector,

    #[error("PermissionRegistry: time delay must be at least one second")]
    ZeroTimeDelay,
}

/// Why a call was refused by the registry. Recorded on the proposal, never thrown.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PermissionDenied {
    #[error("PermissionRegistry: Call not allowed")]
    NotGranted,

    #[error("PermissionRegistry: Call not allowed yet (active from {active_from})")]
    NotYetActive { active_from: Timestamp },

    #[error("PermissionRegistry: Value limit reached ({requested} > {allowed})")]
    ValueExceeded { allowed: U256, requested: U256 },
}
