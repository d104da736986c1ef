//! Permission registry for wallet schemes.
//!
//! Every call a scheme executes is gated by a record keyed on
//! `(caller, target, selector)`. Records become active at `from_time`; a
//! `(ANY_ADDRESS, ANY_FUNC_SIGNATURE)` record of the same caller is the fallback
//! when no specific record is active.
//!
//! Self-service grants always wait at least the registry's `time_delay` before
//! activating, so a scheme can never grant itself an instant permission.
//! Owner (admin) grants activate immediately.

pub mod error;
pub mod record;
pub mod registry;

pub use error::{PermissionDenied, PermissionError};
pub use record::{PermissionCheck, PermissionGrant, PermissionKey, PermissionRecord, PermissionSource};
pub use registry::PermissionRegistry;
