use dxgov_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("governance error: {0}")]
    Governance(#[from] dxgov_governance::GovernanceError),

    #[error("voting error: {0}")]
    Voting(#[from] dxgov_voting::VotingError),

    #[error("permission error: {0}")]
    Permission(#[from] dxgov_permissions::PermissionError),

    #[error("controller error: {0}")]
    Controller(#[from] dxgov_controller::ControllerError),

    #[error("abi error: {0}")]
    Abi(#[from] dxgov_abi::AbiError),

    #[error("no contract at {0}")]
    UnknownContract(Address),

    #[error("contract at {address} is not a {expected}")]
    WrongContract { address: Address, expected: &'static str },

    #[error("insufficient balance: {account} has {available}, needs {required}")]
    InsufficientBalance {
        account: Address,
        available: dxgov_types::U256,
        required: dxgov_types::U256,
    },

    #[error("transaction reverted: {0}")]
    Reverted(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("timed out after {0} ms waiting for confirmation")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
