//! Ledger and DAO configuration with TOML file support.

use dxgov_types::Address;
use dxgov_voting::VotingParams;
use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;
use crate::ChainError;

/// Configuration of a local ledger.
///
/// Can be loaded from a TOML file via [`ChainConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Minimum activation delay of self-service permission grants.
    #[serde(default = "default_permission_delay_secs")]
    pub permission_delay_secs: u64,

    /// How long the async client waits for a transaction to be confirmed.
    #[serde(default = "default_confirmation_timeout_ms")]
    pub confirmation_timeout_ms: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Nesting limit for contract calls (controller generic calls add a level).
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,

    /// Voting parameters registered on every voting machine the ledger deploys.
    #[serde(default)]
    pub voting: VotingParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_permission_delay_secs() -> u64 {
    dxgov_permissions::registry::DEFAULT_TIME_DELAY_SECS
}

fn default_confirmation_timeout_ms() -> u64 {
    5_000
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_call_depth() -> usize {
    8
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ChainConfig {
    pub fn from_toml_file(path: &str) -> Result<Self, ChainError> {
        let content = std::fs::read_to_string(path).map_err(|e| ChainError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ChainError> {
        let config: Self = toml::from_str(s).map_err(|e| ChainError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the ledger cannot run with.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.permission_delay_secs == 0 {
            return Err(ChainError::Config("permission_delay_secs must be at least 1".to_string()));
        }
        self.log_format()?;
        self.voting.validate()?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ChainError> {
        toml::to_string_pretty(self).map_err(|e| ChainError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, ChainError> {
        self.log_format.parse()
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            permission_delay_secs: default_permission_delay_secs(),
            confirmation_timeout_ms: default_confirmation_timeout_ms(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            max_call_depth: default_max_call_depth(),
            voting: VotingParams::default(),
        }
    }
}

/// An initial reputation holder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationHolder {
    pub address: Address,
    pub amount: u64,
}

/// A wallet scheme to install at deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSchemeSpec {
    pub name: String,

    /// Bind to the controller and act as the avatar ("master" scheme).
    #[serde(default)]
    pub master: bool,

    /// Controller permission bits, e.g. `0x1f`. The registered bit is always added.
    #[serde(default = "default_scheme_permissions")]
    pub permissions: u32,

    /// Grant the acting account an immediate wildcard permission.
    #[serde(default = "default_true")]
    pub allow_all_calls: bool,
}

fn default_scheme_permissions() -> u32 {
    0x01
}

/// What [`crate::deploy_dao`] builds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoConfig {
    /// Deploys everything and is the controller's founding scheme until it
    /// leaves at the end of the deployment.
    pub founder: Address,

    /// Owner of the permission registry; the founder when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_owner: Option<Address>,

    /// Also install an upgrade scheme.
    #[serde(default)]
    pub upgrade_scheme: bool,

    #[serde(default)]
    pub reputation: Vec<ReputationHolder>,

    #[serde(default)]
    pub wallet_schemes: Vec<WalletSchemeSpec>,
}

impl DaoConfig {
    pub fn from_toml_file(path: &str) -> Result<Self, ChainError> {
        let content = std::fs::read_to_string(path).map_err(|e| ChainError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ChainError> {
        toml::from_str(s).map_err(|e| ChainError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ChainError> {
        toml::to_string_pretty(self).map_err(|e| ChainError::Config(e.to_string()))
    }

    pub fn registry_owner(&self) -> Address {
        self.registry_owner.unwrap_or(self.founder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ChainConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = ChainConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ChainConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.permission_delay_secs, 10);
        assert_eq!(config.confirmation_timeout_ms, 5_000);
        assert_eq!(config.max_call_depth, 8);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.voting.required_percentage, 50);
        assert_eq!(config.voting.vote_period_limit_secs, 86_400);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            permission_delay_secs = 60
            log_level = "debug"

            [voting]
            required_percentage = 66
        "#;
        let config = ChainConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.permission_delay_secs, 60);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.voting.required_percentage, 66);
        assert_eq!(config.voting.vote_period_limit_secs, 86_400); // default
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn invalid_voting_parameters_are_rejected() {
        let err = ChainConfig::from_toml_str("[voting]\nrequired_percentage = 0\n").unwrap_err();
        assert!(matches!(err, ChainError::Voting(_)));
    }

    #[test]
    fn zero_permission_delay_is_rejected() {
        let err = ChainConfig::from_toml_str("permission_delay_secs = 0\n").unwrap_err();
        assert!(matches!(err, ChainError::Config(msg) if msg.contains("permission_delay_secs")));
    }

    #[test]
    fn unknown_log_format_is_rejected_at_load() {
        let err = ChainConfig::from_toml_str("log_format = \"xml\"\n").unwrap_err();
        assert!(matches!(err, ChainError::Config(msg) if msg.contains("xml")));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ChainConfig::from_toml_file("/nonexistent/dxgov.toml");
        assert!(matches!(result, Err(ChainError::Config(_))));
    }

    #[test]
    fn dao_config_loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"
            founder = "0x00000000000000000000000000000000000000f0"

            [[reputation]]
            address = "0x0000000000000000000000000000000000000001"
            amount = 20

            [[wallet_schemes]]
            name = "master"
            master = true
            permissions = 31

            [[wallet_schemes]]
            name = "quick"
            "#
        )
        .expect("write");

        let config = DaoConfig::from_toml_file(file.path().to_str().expect("utf-8 path")).expect("should parse");
        assert_eq!(config.founder, Address::with_last_byte(0xf0));
        assert_eq!(config.registry_owner(), config.founder);
        assert_eq!(config.reputation[0].amount, 20);
        assert_eq!(config.wallet_schemes.len(), 2);
        assert!(config.wallet_schemes[0].master);
        assert_eq!(config.wallet_schemes[1].permissions, 0x01);
        assert!(config.wallet_schemes[1].allow_all_calls);
        assert!(!config.upgrade_scheme);
    }
}
