use thiserror::Error;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("unknown function selector {0}")]
    UnknownSelector(String),

    #[error("ABI decode failed: {0}")]
    Decode(String),
}

impl From<alloy_sol_types::Error> for AbiError {
    fn from(e: alloy_sol_types::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
