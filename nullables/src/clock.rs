//! A [`Clock`] that only moves when told to.

use dxgov_chain::Clock;
use dxgov_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};

/// Pinned block time. Keep an `Arc` to it after handing it to a
/// [`LocalChain`](dxgov_chain::LocalChain) to steer the ledger's clock from
/// the outside.
#[derive(Debug, Default)]
pub struct NullClock {
    secs: AtomicU64,
}

impl NullClock {
    pub fn new(genesis: u64) -> Self {
        Self {
            secs: AtomicU64::new(genesis),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.secs.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to an absolute time, backwards included.
    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.secs.load(Ordering::SeqCst))
    }
}
