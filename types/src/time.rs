//! Block time.
//!
//! The ledger measures time in whole Unix seconds, like a block timestamp.
//! Permission activation and voting periods are both expressed against it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Second zero. A permission record activating at zero was never set.
    pub const EPOCH: Self = Self(0);

    pub const fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Wall-clock time; a clock set before 1970 reads as [`Timestamp::EPOCH`].
    pub fn now() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => Self(since.as_secs()),
            Err(_) => Self::EPOCH,
        }
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    pub const fn is_epoch(self) -> bool {
        self.0 == Self::EPOCH.0
    }

    pub fn saturating_add(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// True once `now` has reached `self + period`. A zero period is over
    /// as soon as it starts.
    pub fn has_expired(self, period: u64, now: Timestamp) -> bool {
        now >= self.saturating_add(period)
    }
}

impl From<u64> for Timestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
