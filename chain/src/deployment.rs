//! One-shot DAO deployment from a [`DaoConfig`].

use std::collections::BTreeMap;

use dxgov_controller::SchemePermissions;
use dxgov_governance::{upgrade_scheme::DEFAULT_PERMISSIONS, SchemeConfig};
use dxgov_types::{Address, B256, ANY_ADDRESS, ANY_FUNC_SIGNATURE, U256};
use serde::{Deserialize, Serialize};

use crate::chain::LocalChain;
use crate::config::DaoConfig;
use crate::ChainError;

/// Everything a client needs to find the deployed DAO.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkContracts {
    /// First transaction index of the deployment.
    pub from_block: u64,
    pub avatar: Address,
    pub controller: Address,
    pub permission_registry: Address,
    /// Parameters hash every scheme votes with.
    pub vote_params: B256,
    pub voting_machines: BTreeMap<String, Address>,
    pub schemes: BTreeMap<String, Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_scheme: Option<Address>,
    /// Flat name → address view of all of the above.
    pub addresses: BTreeMap<String, Address>,
}

impl NetworkContracts {
    pub fn voting_machine(&self) -> Option<Address> {
        self.voting_machines.values().next().copied()
    }

    pub fn scheme(&self, name: &str) -> Option<Address> {
        self.schemes.get(name).copied()
    }

    pub fn to_json(&self) -> Result<String, ChainError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, ChainError> {
        Ok(serde_json::from_str(s)?)
    }
}

/// Deploy a DAO as described by `config`.
///
/// The founder deploys every contract and is the controller's founding
/// scheme until the end, when it unregisters itself. Each wallet scheme is
/// initialized, optionally granted an immediate wildcard permission for its
/// acting account, then registered with its permission bits.
pub fn deploy_dao(chain: &mut LocalChain, config: &DaoConfig) -> Result<NetworkContracts, ChainError> {
    let founder = config.founder;
    let owner = config.registry_owner();
    let mut contracts = NetworkContracts {
        from_block: chain.block_number(),
        ..NetworkContracts::default()
    };

    let delay = chain.config().permission_delay_secs;
    let registry = chain.deploy_permission_registry(founder, owner, delay)?;
    let (avatar, controller) = chain.deploy_organization(founder)?;
    for holder in &config.reputation {
        chain.mint_reputation(founder, controller, holder.address, U256::from(holder.amount))?;
    }

    let voting_machine = chain.deploy_voting_machine(founder)?;
    let params = chain.config().voting.clone();
    let vote_params = chain.set_voting_parameters(founder, voting_machine, params)?;

    contracts.avatar = avatar;
    contracts.controller = controller;
    contracts.permission_registry = registry;
    contracts.vote_params = vote_params;
    contracts.voting_machines.insert("VotingMachine".to_string(), voting_machine);

    for spec in &config.wallet_schemes {
        if contracts.schemes.contains_key(&spec.name) {
            return Err(ChainError::Config(format!("duplicate scheme name {:?}", spec.name)));
        }
        let scheme = chain.deploy_wallet_scheme(founder)?;
        let scheme_config = SchemeConfig {
            avatar,
            voting_machine,
            vote_params,
            controller: spec.master.then_some(controller),
            permission_registry: Some(registry),
        };
        chain.initialize_scheme(founder, scheme, scheme_config)?;

        if spec.allow_all_calls {
            let acting = if spec.master { avatar } else { scheme };
            chain.set_admin_permission(owner, registry, acting, ANY_ADDRESS, ANY_FUNC_SIGNATURE, U256::MAX, true)?;
        }
        chain.register_scheme(founder, controller, scheme, vote_params, SchemePermissions::from_bits(spec.permissions))?;
        tracing::info!(name = %spec.name, %scheme, master = spec.master, "wallet scheme installed");
        contracts.schemes.insert(spec.name.clone(), scheme);
    }

    if config.upgrade_scheme {
        let scheme = chain.deploy_upgrade_scheme(founder, DEFAULT_PERMISSIONS)?;
        chain.initialize_scheme(
            founder,
            scheme,
            SchemeConfig {
                avatar,
                voting_machine,
                vote_params,
                controller: Some(controller),
                permission_registry: None,
            },
        )?;
        chain.register_scheme(founder, controller, scheme, vote_params, DEFAULT_PERMISSIONS)?;
        contracts.upgrade_scheme = Some(scheme);
    }

    chain.unregister_self(founder, controller)?;

    contracts.addresses = collect_addresses(&contracts);
    tracing::info!(%avatar, %controller, schemes = contracts.schemes.len(), "dao deployed");
    Ok(contracts)
}

fn collect_addresses(contracts: &NetworkContracts) -> BTreeMap<String, Address> {
    let mut addresses = BTreeMap::new();
    addresses.insert("Avatar".to_string(), contracts.avatar);
    addresses.insert("Controller".to_string(), contracts.controller);
    addresses.insert("PermissionRegistry".to_string(), contracts.permission_registry);
    addresses.extend(contracts.voting_machines.iter().map(|(k, v)| (k.clone(), *v)));
    addresses.extend(contracts.schemes.iter().map(|(k, v)| (k.clone(), *v)));
    if let Some(scheme) = contracts.upgrade_scheme {
        addresses.insert("UpgradeScheme".to_string(), scheme);
    }
    addresses
}
