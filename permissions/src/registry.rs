//! The permission registry: stores grants and answers permission checks.

use crate::error::{PermissionDenied, PermissionError};
use crate::record::{PermissionCheck, PermissionGrant, PermissionKey, PermissionRecord, PermissionSource};
use dxgov_types::{Address, Selector, Timestamp, ANY_ADDRESS, ANY_FUNC_SIGNATURE, U256};
use std::collections::HashMap;

/// Default minimum activation delay for self-service grants, in seconds.
pub const DEFAULT_TIME_DELAY_SECS: u64 = 10;

/// Earliest time a grant can activate. Second zero is the never-granted marker.
const FIRST_GRANT_TIME: Timestamp = Timestamp::new(1);

#[derive(Clone, Debug)]
pub struct PermissionRegistry {
    address: Address,
    owner: Address,
    /// Minimum delay between a self-service grant and its activation.
    time_delay: u64,
    permissions: HashMap<PermissionKey, PermissionRecord>,
}

impl PermissionRegistry {
    /// A registry whose self-service grants wait at least `time_delay`
    /// seconds. A zero delay is refused.
    pub fn new(address: Address, owner: Address, time_delay: u64) -> Result<Self, PermissionError> {
        if time_delay == 0 {
            return Err(PermissionError::ZeroTimeDelay);
        }
        Ok(Self {
            address,
            owner,
            time_delay,
            permissions: HashMap::new(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn time_delay(&self) -> u64 {
        self.time_delay
    }

    /// Owner-only grant or revocation on behalf of any caller. Takes effect at
    /// `now`, or at second one when `now` is the epoch.
    #[allow(clippy::too_many_arguments)]
    pub fn set_admin_permission(
        &mut self,
        sender: &Address,
        caller: Address,
        target: Address,
        selector: Selector,
        value_allowed: U256,
        allowed: bool,
        now: Timestamp,
    ) -> Result<PermissionRecord, PermissionError> {
        if *sender != self.owner {
            return Err(PermissionError::NotOwner(*sender));
        }
        let key = Self::validated_key(caller, target, selector)?;
        let record = if allowed {
            PermissionRecord {
                value_allowed,
                from_time: now.max(FIRST_GRANT_TIME),
            }
        } else {
            PermissionRecord::default()
        };
        self.permissions.insert(key, record);
        tracing::info!(
            registry = %self.address,
            caller = %caller,
            target = %target,
            selector = %selector,
            allowed,
            "admin permission set"
        );
        Ok(record)
    }

    /// Self-service grant: the record is stored under `sender`.
    ///
    /// Activation is `now + max(time_delay, grant.delay_secs)`. A revocation
    /// clears the record immediately, including a grant that is still pending.
    pub fn set_permission(
        &mut self,
        sender: Address,
        grant: PermissionGrant,
        now: Timestamp,
    ) -> Result<PermissionRecord, PermissionError> {
        let key = Self::validated_key(sender, grant.target, grant.selector)?;
        let record = if grant.allowed {
            PermissionRecord {
                value_allowed: grant.value_allowed,
                from_time: now
                    .saturating_add(grant.delay_secs.max(self.time_delay))
                    .max(FIRST_GRANT_TIME),
            }
        } else {
            PermissionRecord::default()
        };
        self.permissions.insert(key, record);
        tracing::debug!(
            registry = %self.address,
            caller = %sender,
            target = %grant.target,
            selector = %grant.selector,
            from_time = %record.from_time,
            allowed = grant.allowed,
            "permission set"
        );
        Ok(record)
    }

    /// The raw record stored under the exact key.
    pub fn permission(&self, caller: &Address, target: &Address, selector: &Selector) -> PermissionRecord {
        self.permissions
            .get(&PermissionKey::new(*caller, *target, *selector))
            .copied()
            .unwrap_or_default()
    }

    /// The record that governs `(caller, target, selector)`: the exact record if
    /// it was ever granted, otherwise the caller's wildcard record.
    pub fn get_permission(&self, caller: &Address, target: &Address, selector: &Selector) -> PermissionRecord {
        let exact = self.permission(caller, target, selector);
        if exact.is_granted() {
            exact
        } else {
            self.permission(caller, &ANY_ADDRESS, &ANY_FUNC_SIGNATURE)
        }
    }

    /// Decide whether `caller` may call `selector` on `target` carrying `value`.
    ///
    /// The exact record wins when it is active; otherwise the wildcard record
    /// of the same caller is consulted.
    pub fn check_permission(
        &self,
        caller: &Address,
        target: &Address,
        selector: &Selector,
        value: U256,
        now: Timestamp,
    ) -> PermissionCheck {
        let exact = self.permission(caller, target, selector);
        let wildcard = self.permission(caller, &ANY_ADDRESS, &ANY_FUNC_SIGNATURE);

        let (record, source) = if exact.is_active(now) {
            (exact, PermissionSource::Exact)
        } else if wildcard.is_active(now) {
            (wildcard, PermissionSource::Wildcard)
        } else if exact.is_granted() {
            return PermissionCheck::deny(
                exact.from_time,
                PermissionSource::Exact,
                PermissionDenied::NotYetActive {
                    active_from: exact.from_time,
                },
            );
        } else if wildcard.is_granted() {
            return PermissionCheck::deny(
                wildcard.from_time,
                PermissionSource::Wildcard,
                PermissionDenied::NotYetActive {
                    active_from: wildcard.from_time,
                },
            );
        } else {
            return PermissionCheck::deny(
                Timestamp::EPOCH,
                PermissionSource::None,
                PermissionDenied::NotGranted,
            );
        };

        if value > record.value_allowed {
            return PermissionCheck::deny(
                record.from_time,
                source,
                PermissionDenied::ValueExceeded {
                    allowed: record.value_allowed,
                    requested: value,
                },
            );
        }
        PermissionCheck::allow(&record, source)
    }

    fn validated_key(caller: Address, target: Address, selector: Selector) -> Result<PermissionKey, PermissionError> {
        if target == ANY_ADDRESS && selector != ANY_FUNC_SIGNATURE {
            return Err(PermissionError::WildcardTargetWithSelector);
        }
        Ok(PermissionKey::new(caller, target, selector))
    }
}
