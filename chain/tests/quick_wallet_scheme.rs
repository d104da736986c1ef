//! End-to-end lifecycle of proposals on a wallet scheme without a
//! controller: calls are made by the scheme itself, from its own balance.

mod common;

use common::*;
use dxgov_abi::{calls, decode_revert, encode_bool};
use dxgov_chain::ChainEvent;
use dxgov_controller::SchemeRecord;
use dxgov_governance::ProposalState;
use dxgov_nullables::{action_mock::WRONG_CALLER, ActionMock, Wallet};
use dxgov_types::{selector_of, Address, Bytes, Timestamp, ANY_ADDRESS, ANY_FUNC_SIGNATURE, U256};

#[test]
fn negative_decision_rejects_the_proposal() {
    let mut dao = setup();
    let call_data = ActionMock::test_call_from(dao.quick);
    let id = dao.propose(dao.quick, vec![dao.action_mock], vec![call_data.clone()], vec![0]);

    let receipt = dao.decide(id, NO);

    assert!(matches!(receipt.execution_event(), Some(ChainEvent::ProposalRejected { .. })));
    let proposal = dao.proposal(dao.quick, id);
    assert_eq!(proposal.state(), ProposalState::Rejected);
    assert_eq!(proposal.call_data(), vec![call_data]);
    assert_eq!(proposal.to(), vec![dao.action_mock]);
    assert_eq!(proposal.value(), vec![U256::ZERO]);
}

#[test]
fn positive_decision_calls_from_the_scheme() {
    let mut dao = setup();
    let call_data = ActionMock::test_call_from(dao.quick);
    let id = dao.propose(dao.quick, vec![dao.action_mock], vec![call_data], vec![0]);

    let receipt = dao.decide(id, YES);

    let (successes, return_data) = receipt.execution_results().expect("executed");
    assert_eq!(successes, &[true]);
    assert_eq!(return_data[0], encode_bool(true));
    assert_eq!(dao.state(dao.quick, id), ProposalState::ExecutionSucceeded);
}

#[test]
fn a_call_expecting_the_avatar_reverts() {
    let mut dao = setup();
    let id = dao.propose(
        dao.quick,
        vec![dao.action_mock],
        vec![ActionMock::test_call_from(dao.avatar)],
        vec![0],
    );

    dao.decide(id, YES);

    assert_eq!(dao.state(dao.quick, id), ProposalState::ExecutionFailed);
}

#[test]
fn multiple_calls_move_value_from_the_scheme() {
    let mut dao = setup();
    let wallet = dao.deploy_wallet(dao.quick);
    dao.fund(dao.quick, TEST_VALUE);
    let pay = Wallet::pay_call(account(1));

    let id = dao.propose(
        dao.quick,
        vec![wallet, wallet],
        vec![Bytes::from(vec![0u8]), pay.clone()],
        vec![TEST_VALUE, 0],
    );
    assert_eq!(dao.balance(dao.quick), U256::from(TEST_VALUE));
    assert_eq!(dao.balance(wallet), U256::ZERO);
    let before = dao.balance(account(1));

    dao.decide(id, YES);

    assert_eq!(dao.balance(dao.quick), U256::ZERO);
    assert_eq!(dao.balance(wallet), U256::ZERO);
    assert_eq!(dao.balance(account(1)), before + U256::from(TEST_VALUE));
    let proposal = dao.proposal(dao.quick, id);
    assert_eq!(proposal.state(), ProposalState::ExecutionSucceeded);
    assert_eq!(proposal.call_data(), vec![Bytes::from(vec![0u8]), pay]);
    assert_eq!(proposal.value(), vec![U256::from(TEST_VALUE), U256::ZERO]);
}

#[test]
fn reverted_call_is_recorded_with_its_reason() {
    let mut dao = setup();
    let id = dao.propose(
        dao.quick,
        vec![dao.action_mock],
        vec![ActionMock::test_call_from(Address::ZERO)],
        vec![0],
    );

    let receipt = dao.decide(id, YES);

    let (successes, return_data) = receipt.execution_results().expect("executed");
    assert_eq!(successes, &[false]);
    assert_eq!(decode_revert(&return_data[0]).as_deref(), Some(WRONG_CALLER));
    assert_eq!(dao.state(dao.quick, id), ProposalState::ExecutionFailed);
}

#[test]
fn call_without_return_value_succeeds_with_empty_data() {
    let mut dao = setup();
    let id = dao.propose(
        dao.quick,
        vec![dao.action_mock],
        vec![ActionMock::test_call_without_return_value_from(dao.quick)],
        vec![0],
    );

    let receipt = dao.decide(id, YES);

    let (_, return_data) = receipt.execution_results().expect("executed");
    assert!(return_data[0].is_empty());
    assert_eq!(dao.state(dao.quick, id), ProposalState::ExecutionSucceeded);
}

#[test]
fn mints_and_burns_reputation() {
    let mut dao = setup();
    let amount = U256::from(TEST_VALUE);
    let mint_id = dao.propose(
        dao.quick,
        vec![dao.controller],
        vec![calls::mint_reputation(amount, account(4), dao.avatar)],
        vec![0],
    );
    let burn_id = dao.propose(
        dao.quick,
        vec![dao.controller],
        vec![calls::burn_reputation(amount, account(4), dao.avatar)],
        vec![0],
    );

    dao.decide(mint_id, YES);
    assert_eq!(dao.reputation(account(4)), amount);

    dao.decide(burn_id, YES);
    assert_eq!(dao.reputation(account(4)), U256::ZERO);
}

#[test]
fn cannot_register_or_remove_schemes() {
    let mut dao = setup();
    let some_address = Address::with_last_byte(0x5e);
    let add_id = dao.propose(
        dao.quick,
        vec![dao.controller],
        vec![calls::register_scheme(some_address, test_hash(), 0x0000_000f, dao.avatar)],
        vec![0],
    );
    let remove_id = dao.propose(
        dao.quick,
        vec![dao.controller],
        vec![calls::unregister_scheme(dao.master, dao.avatar)],
        vec![0],
    );

    dao.decide(add_id, YES);
    assert_eq!(dao.chain.scheme(dao.controller, some_address).unwrap(), SchemeRecord::default());
    assert_eq!(dao.state(dao.quick, add_id), ProposalState::ExecutionFailed);

    dao.decide(remove_id, YES);
    let master = dao.chain.scheme(dao.controller, dao.master).unwrap();
    assert_eq!(master.params_hash, dao.contracts.vote_params);
    assert_eq!(master.permissions.bits(), 0x1f);
    assert_eq!(dao.state(dao.quick, remove_id), ProposalState::ExecutionFailed);
}

#[test]
fn wildcard_granted_by_the_scheme_activates_after_the_delay() {
    let mut dao = setup();
    let call_data = ActionMock::test_call_from(dao.quick);
    let selector = selector_of(&call_data);

    dao.chain
        .set_admin_permission(account(0), dao.registry, dao.quick, ANY_ADDRESS, ANY_FUNC_SIGNATURE, U256::MAX, false)
        .unwrap();
    assert_eq!(
        dao.chain.get_permission(dao.registry, dao.quick, dao.action_mock, selector).unwrap().from_time,
        Timestamp::EPOCH
    );

    // Calls to the registry are never gated, so the scheme can re-grant itself.
    let set_permission = calls::set_permission(ANY_ADDRESS, ANY_FUNC_SIGNATURE, U256::MAX, true);
    let id = dao.propose(dao.quick, vec![dao.registry], vec![set_permission], vec![0]);
    dao.decide(id, YES);
    let set_at = dao.chain.now();

    assert_eq!(
        dao.chain.get_permission(dao.registry, dao.quick, dao.action_mock, selector).unwrap().from_time,
        set_at.saturating_add(10)
    );
    assert_eq!(
        dao.chain.permission(dao.registry, dao.quick, ANY_ADDRESS, ANY_FUNC_SIGNATURE).unwrap().from_time,
        set_at.saturating_add(10)
    );

    dao.chain.increase_time(10);

    let id = dao.propose(dao.quick, vec![dao.action_mock], vec![call_data.clone()], vec![0]);
    dao.decide(id, YES);

    let proposal = dao.proposal(dao.quick, id);
    assert_eq!(proposal.state(), ProposalState::ExecutionSucceeded);
    assert_eq!(proposal.call_data(), vec![call_data]);
}

#[test]
fn transfer_pay_and_mint_in_one_proposal() {
    let mut dao = setup();
    let wallet = dao.deploy_wallet(dao.quick);
    dao.fund(dao.quick, 100_000_000);
    let pay = Wallet::pay_call(account(1));
    let mint = calls::mint_reputation(U256::from(TEST_VALUE), account(4), dao.avatar);

    let id = dao.propose(
        dao.quick,
        vec![wallet, wallet, dao.controller],
        vec![Bytes::from(vec![0u8]), pay, mint],
        vec![TEST_VALUE, 0, 0],
    );
    assert_eq!(dao.balance(dao.quick), U256::from(100_000_000u64));
    let before = dao.balance(account(1));

    let receipt = dao.decide(id, YES);

    let (successes, return_data) = receipt.execution_results().expect("executed");
    assert_eq!(successes, &[true, true, true]);
    assert!(return_data[0].is_empty());
    assert!(return_data[1].is_empty());
    assert_eq!(return_data[2], encode_bool(true));

    assert_eq!(dao.balance(dao.avatar), U256::ZERO);
    assert_eq!(dao.balance(wallet), U256::ZERO);
    assert_eq!(dao.balance(account(1)), before + U256::from(TEST_VALUE));
    assert_eq!(dao.balance(dao.quick), U256::from(100_000_000u64 - TEST_VALUE));
    assert_eq!(dao.reputation(account(4)), U256::from(TEST_VALUE));
    assert_eq!(dao.state(dao.quick, id), ProposalState::ExecutionSucceeded);
}
