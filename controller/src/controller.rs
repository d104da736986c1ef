//! Controller state and the operations schemes call on it.

use crate::error::ControllerError;
use crate::permissions::SchemePermissions;
use crate::reputation::Reputation;
use alloy_sol_types::SolInterface;
use dxgov_abi::calls::IController::IControllerCalls;
use dxgov_abi::{encode_bool, AbiError};
use dxgov_types::{selector_of, Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A scheme's registration entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeRecord {
    pub params_hash: B256,
    pub permissions: SchemePermissions,
}

/// What the caller of [`Controller::handle_call`] has to do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerOutcome {
    /// The call completed with this return data.
    Returned(Bytes),
    /// The scheme is allowed to make the avatar call `target`; the ledger
    /// performs that call and reports its `(success, data)` back.
    GenericCall {
        avatar: Address,
        target: Address,
        data: Bytes,
        value: U256,
    },
}

#[derive(Clone, Debug)]
pub struct Controller {
    address: Address,
    avatar: Address,
    schemes: HashMap<Address, SchemeRecord>,
    reputation: Reputation,
    upgraded_to: Option<Address>,
}

impl Controller {
    /// A fresh controller for `avatar`. `founder` is registered with every
    /// permission so it can install the initial schemes and then leave.
    pub fn new(address: Address, avatar: Address, founder: Address) -> Self {
        let mut schemes = HashMap::new();
        schemes.insert(
            founder,
            SchemeRecord {
                params_hash: B256::ZERO,
                permissions: SchemePermissions::ALL,
            },
        );
        Self {
            address,
            avatar,
            schemes,
            reputation: Reputation::new(),
            upgraded_to: None,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn avatar(&self) -> Address {
        self.avatar
    }

    pub fn reputation(&self) -> &Reputation {
        &self.reputation
    }

    pub fn upgraded_to(&self) -> Option<Address> {
        self.upgraded_to
    }

    /// Registration entry of `scheme`; all-zero when not registered.
    pub fn scheme(&self, scheme: &Address) -> SchemeRecord {
        self.schemes.get(scheme).copied().unwrap_or_default()
    }

    pub fn is_scheme_registered(&self, scheme: &Address) -> bool {
        self.scheme(scheme).permissions.is_registered()
    }

    pub fn register_scheme(
        &mut self,
        sender: &Address,
        scheme: Address,
        params_hash: B256,
        permissions: SchemePermissions,
    ) -> Result<(), ControllerError> {
        let sender_perms = self.require(sender, SchemePermissions::REGISTER_SCHEMES)?;
        let requested = permissions.union(SchemePermissions::REGISTERED);
        // The sender must hold every bit it grants, and every bit it would take away.
        let existing = self.scheme(&scheme).permissions;
        if !sender_perms.contains(requested) || !sender_perms.contains(existing) {
            return Err(ControllerError::PermissionEscalation { requested });
        }
        self.schemes.insert(
            scheme,
            SchemeRecord {
                params_hash,
                permissions: requested,
            },
        );
        tracing::info!(controller = %self.address, %scheme, permissions = %requested, "scheme registered");
        Ok(())
    }

    /// Returns `false` when `scheme` was not registered.
    pub fn unregister_scheme(&mut self, sender: &Address, scheme: &Address) -> Result<bool, ControllerError> {
        let sender_perms = self.require(sender, SchemePermissions::REGISTER_SCHEMES)?;
        let existing = self.scheme(scheme);
        if !existing.permissions.is_registered() {
            return Ok(false);
        }
        if !sender_perms.contains(existing.permissions) {
            return Err(ControllerError::PermissionEscalation {
                requested: existing.permissions,
            });
        }
        self.schemes.remove(scheme);
        tracing::info!(controller = %self.address, %scheme, "scheme unregistered");
        Ok(true)
    }

    /// A registered scheme removes itself; no further permission needed.
    pub fn unregister_self(&mut self, sender: &Address) -> Result<bool, ControllerError> {
        self.ensure_active()?;
        Ok(self.schemes.remove(sender).is_some())
    }

    pub fn mint_reputation(&mut self, sender: &Address, amount: U256, to: &Address) -> Result<(), ControllerError> {
        self.require(sender, SchemePermissions::REGISTERED)?;
        self.reputation.mint(to, amount);
        tracing::debug!(controller = %self.address, %to, %amount, "reputation minted");
        Ok(())
    }

    pub fn burn_reputation(&mut self, sender: &Address, amount: U256, from: &Address) -> Result<U256, ControllerError> {
        self.require(sender, SchemePermissions::REGISTERED)?;
        let burned = self.reputation.burn(from, amount);
        tracing::debug!(controller = %self.address, %from, %burned, "reputation burned");
        Ok(burned)
    }

    /// Check that `sender` may make generic calls from the avatar.
    pub fn authorize_generic_call(&self, sender: &Address) -> Result<(), ControllerError> {
        self.require(sender, SchemePermissions::GENERIC_CALL).map(|_| ())
    }

    pub fn upgrade_controller(&mut self, sender: &Address, new_controller: Address) -> Result<(), ControllerError> {
        self.require(sender, SchemePermissions::UPGRADE_CONTROLLER)?;
        self.upgraded_to = Some(new_controller);
        tracing::info!(controller = %self.address, %new_controller, "controller upgraded");
        Ok(())
    }

    /// Execute an ABI-encoded controller call made by `sender`.
    pub fn handle_call(&mut self, sender: &Address, data: &[u8]) -> Result<ControllerOutcome, ControllerError> {
        let call = IControllerCalls::abi_decode(data, true)
            .map_err(|_| AbiError::UnknownSelector(selector_of(data).to_string()))?;
        let returned = match call {
            IControllerCalls::registerScheme(c) => {
                self.check_avatar(&c.avatar)?;
                self.register_scheme(
                    sender,
                    c.scheme,
                    c.paramsHash,
                    SchemePermissions::from_bytes4(c.permissions),
                )?;
                encode_bool(true)
            }
            IControllerCalls::unregisterScheme(c) => {
                self.check_avatar(&c.avatar)?;
                encode_bool(self.unregister_scheme(sender, &c.scheme)?)
            }
            IControllerCalls::unregisterSelf(c) => {
                self.check_avatar(&c.avatar)?;
                encode_bool(self.unregister_self(sender)?)
            }
            IControllerCalls::mintReputation(c) => {
                self.check_avatar(&c.avatar)?;
                self.mint_reputation(sender, c.amount, &c.to)?;
                encode_bool(true)
            }
            IControllerCalls::burnReputation(c) => {
                self.check_avatar(&c.avatar)?;
                self.burn_reputation(sender, c.amount, &c.from)?;
                encode_bool(true)
            }
            IControllerCalls::genericCall(c) => {
                self.check_avatar(&c.avatar)?;
                self.authorize_generic_call(sender)?;
                return Ok(ControllerOutcome::GenericCall {
                    avatar: self.avatar,
                    target: c.target,
                    data: c.data,
                    value: c.value,
                });
            }
            IControllerCalls::upgradeController(c) => {
                self.check_avatar(&c.avatar)?;
                self.upgrade_controller(sender, c.newController)?;
                encode_bool(true)
            }
        };
        Ok(ControllerOutcome::Returned(returned))
    }

    fn require(&self, sender: &Address, required: SchemePermissions) -> Result<SchemePermissions, ControllerError> {
        self.ensure_active()?;
        let perms = self.scheme(sender).permissions;
        if !perms.is_registered() {
            return Err(ControllerError::SchemeNotRegistered(*sender));
        }
        if !perms.contains(required) {
            return Err(ControllerError::MissingPermission {
                scheme: *sender,
                required,
            });
        }
        Ok(perms)
    }

    fn ensure_active(&self) -> Result<(), ControllerError> {
        match self.upgraded_to {
            Some(next) => Err(ControllerError::Upgraded(next)),
            None => Ok(()),
        }
    }

    fn check_avatar(&self, avatar: &Address) -> Result<(), ControllerError> {
        if *avatar != self.avatar {
            return Err(ControllerError::WrongAvatar {
                given: *avatar,
                expected: self.avatar,
            });
        }
        Ok(())
    }
}
