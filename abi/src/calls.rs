//! Call payloads for the permission registry and the controller.

use alloy_primitives::{Address, Bytes, FixedBytes, B256, U256};
use alloy_sol_types::{sol, SolCall};
use dxgov_types::Selector;

sol! {
    /// Self-service side of the permission registry. The sender of the call is
    /// the caller the record is stored under.
    interface IPermissionRegistry {
        function setPermission(
            address to,
            bytes4 functionSignature,
            uint256 valueAllowed,
            bool allowed
        );
    }

    /// Operations a registered scheme may ask of the controller.
    interface IController {
        function registerScheme(
            address scheme,
            bytes32 paramsHash,
            bytes4 permissions,
            address avatar
        ) returns (bool);

        function unregisterScheme(address scheme, address avatar) returns (bool);

        function unregisterSelf(address avatar) returns (bool);

        function mintReputation(uint256 amount, address to, address avatar) returns (bool);

        function burnReputation(uint256 amount, address from, address avatar) returns (bool);

        function genericCall(
            address target,
            bytes data,
            address avatar,
            uint256 value
        ) returns (bool success, bytes returnValue);

        function upgradeController(address newController, address avatar) returns (bool);
    }
}

pub fn set_permission(to: Address, selector: Selector, value_allowed: U256, allowed: bool) -> Bytes {
    IPermissionRegistry::setPermissionCall {
        to,
        functionSignature: selector,
        valueAllowed: value_allowed,
        allowed,
    }
    .abi_encode()
    .into()
}

pub fn register_scheme(scheme: Address, params_hash: B256, permissions: u32, avatar: Address) -> Bytes {
    IController::registerSchemeCall {
        scheme,
        paramsHash: params_hash,
        permissions: FixedBytes::new(permissions.to_be_bytes()),
        avatar,
    }
    .abi_encode()
    .into()
}

pub fn unregister_scheme(scheme: Address, avatar: Address) -> Bytes {
    IController::unregisterSchemeCall { scheme, avatar }
        .abi_encode()
        .into()
}

pub fn unregister_self(avatar: Address) -> Bytes {
    IController::unregisterSelfCall { avatar }.abi_encode().into()
}

pub fn mint_reputation(amount: U256, to: Address, avatar: Address) -> Bytes {
    IController::mintReputationCall { amount, to, avatar }
        .abi_encode()
        .into()
}

pub fn burn_reputation(amount: U256, from: Address, avatar: Address) -> Bytes {
    IController::burnReputationCall { amount, from, avatar }
        .abi_encode()
        .into()
}

/// Payload asking the controller to make `avatar` call `target`.
pub fn generic_call(target: Address, data: Bytes, avatar: Address, value: U256) -> Bytes {
    IController::genericCallCall {
        target,
        data,
        avatar,
        value,
    }
    .abi_encode()
    .into()
}

pub fn upgrade_controller(new_controller: Address, avatar: Address) -> Bytes {
    IController::upgradeControllerCall {
        newController: new_controller,
        avatar,
    }
    .abi_encode()
    .into()
}
