//! The DAO controller.
//!
//! The controller owns the avatar (the DAO's treasury and identity) and decides
//! which schemes may act on its behalf. Each registered scheme carries a
//! permission bitmask; reputation, the non-transferable voting weight, is minted
//! and burned here on request of registered schemes.

pub mod controller;
pub mod error;
pub mod permissions;
pub mod reputation;

pub use controller::{Controller, ControllerOutcome, SchemeRecord};
pub use error::ControllerError;
pub use permissions::SchemePermissions;
pub use reputation::Reputation;
