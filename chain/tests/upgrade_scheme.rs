//! Controller upgrades and scheme replacement through the upgrade scheme.

mod common;

use common::*;
use dxgov_chain::ChainError;
use dxgov_controller::SchemeRecord;
use dxgov_governance::{
    upgrade_scheme::DEFAULT_PERMISSIONS, GovernanceError, ProposalState, ProposeControllerOptions,
    ProposeUpgradingSchemeOptions, UpgradeAction,
};
use dxgov_types::{Address, B256, U256};

fn upgrade_dao() -> TestDao {
    let mut config = dao_config();
    config.upgrade_scheme = true;
    setup_with(config)
}

fn upgrade_scheme(dao: &TestDao) -> Address {
    dao.contracts.upgrade_scheme.expect("upgrade scheme deployed")
}

#[test]
fn upgrade_scheme_is_registered_with_default_permissions() {
    let dao = upgrade_dao();
    let record = dao.chain.scheme(dao.controller, upgrade_scheme(&dao)).unwrap();
    assert_eq!(record.permissions, DEFAULT_PERMISSIONS);
    assert_eq!(record.params_hash, dao.contracts.vote_params);
}

#[test]
fn replaces_itself_with_a_new_scheme() {
    let mut dao = upgrade_dao();
    let scheme = upgrade_scheme(&dao);
    let new_scheme = Address::with_last_byte(0x77);
    let params = B256::repeat_byte(0x42);

    let (id, _) = dao
        .chain
        .propose_upgrading_scheme(
            account(0),
            scheme,
            ProposeUpgradingSchemeOptions {
                avatar: Some(dao.avatar),
                scheme: Some(new_scheme),
                scheme_parameters_hash: Some(params),
            },
        )
        .unwrap();
    let proposal = dao.chain.get_upgrade_proposal(scheme, id).unwrap();
    assert!(matches!(proposal.action, UpgradeAction::UpgradingScheme { scheme, .. } if scheme == new_scheme));

    dao.decide(id, YES);

    assert_eq!(dao.chain.proposal_state(scheme, id).unwrap(), ProposalState::ExecutionSucceeded);
    let registered = dao.chain.scheme(dao.controller, new_scheme).unwrap();
    assert_eq!(registered.params_hash, params);
    assert_eq!(registered.permissions, DEFAULT_PERMISSIONS);
    assert_eq!(dao.chain.scheme(dao.controller, scheme).unwrap(), SchemeRecord::default());
}

#[test]
fn upgrades_the_controller() {
    let mut dao = upgrade_dao();
    let scheme = upgrade_scheme(&dao);
    let new_controller = Address::with_last_byte(0xc1);

    let (id, _) = dao
        .chain
        .propose_controller(
            account(0),
            scheme,
            ProposeControllerOptions {
                avatar: Some(dao.avatar),
                controller: Some(new_controller),
            },
        )
        .unwrap();
    dao.decide(id, YES);

    assert_eq!(dao.chain.proposal_state(scheme, id).unwrap(), ProposalState::ExecutionSucceeded);
    assert_eq!(dao.chain.controller(dao.controller).unwrap().upgraded_to(), Some(new_controller));

    // The old controller refuses every further scheme request.
    let err = dao
        .chain
        .mint_reputation(dao.master, dao.controller, account(4), U256::from(1u64))
        .unwrap_err();
    assert!(matches!(err, ChainError::Controller(_)));
}

#[test]
fn rejected_upgrade_changes_nothing() {
    let mut dao = upgrade_dao();
    let scheme = upgrade_scheme(&dao);

    let (id, _) = dao
        .chain
        .propose_controller(
            account(0),
            scheme,
            ProposeControllerOptions {
                avatar: Some(dao.avatar),
                controller: Some(Address::with_last_byte(0xc1)),
            },
        )
        .unwrap();
    dao.decide(id, NO);

    assert_eq!(dao.chain.proposal_state(scheme, id).unwrap(), ProposalState::Rejected);
    assert_eq!(dao.chain.controller(dao.controller).unwrap().upgraded_to(), None);
}

#[test]
fn missing_options_are_refused_before_submission() {
    let mut dao = upgrade_dao();
    let scheme = upgrade_scheme(&dao);
    let before = dao.chain.receipts().len();

    let err = dao
        .chain
        .propose_controller(account(0), scheme, ProposeControllerOptions::default())
        .unwrap_err();
    assert_eq!(err.to_string(), "governance error: avatar address is not defined");

    let err = dao
        .chain
        .propose_upgrading_scheme(
            account(0),
            scheme,
            ProposeUpgradingSchemeOptions {
                avatar: Some(dao.avatar),
                scheme: Some(Address::with_last_byte(0x77)),
                scheme_parameters_hash: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ChainError::Governance(GovernanceError::MissingField(_))));
    assert_eq!(dao.chain.receipts().len(), before);
}

#[test]
fn wrong_avatar_is_refused() {
    let mut dao = upgrade_dao();
    let scheme = upgrade_scheme(&dao);

    let err = dao
        .chain
        .propose_controller(
            account(0),
            scheme,
            ProposeControllerOptions {
                avatar: Some(account(3)),
                controller: Some(Address::with_last_byte(0xc1)),
            },
        )
        .unwrap_err();

    assert!(matches!(err, ChainError::Governance(GovernanceError::WrongAvatar { .. })));
}
