use crate::permissions::SchemePermissions;
use dxgov_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Controller: scheme {0} is not registered")]
    SchemeNotRegistered(Address),

    #[error("Controller: scheme {scheme} lacks permission {required}")]
    MissingPermission {
        scheme: Address,
        required: SchemePermissions,
    },

    #[error("Controller: cannot grant permissions {requested} the sender does not hold")]
    PermissionEscalation { requested: SchemePermissions },

    #[error("Controller: avatar {given} does not belong to this controller ({expected})")]
    WrongAvatar { given: Address, expected: Address },

    #[error("Controller: upgraded to {0}")]
    Upgraded(Address),

    #[error("Controller: {0}")]
    Abi(#[from] dxgov_abi::AbiError),
}
