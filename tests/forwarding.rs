//! End-to-end forwarding flows over the sandbox ledger.

use relaygate::{
    Coins, DeployConfig, Ledger, MessageBody, Receipt, OP_FORWARD_FUNDS, OP_LOCK, OP_UNLOCK,
};

struct Setup {
    ledger: Ledger,
    contract: relaygate::Address,
    receiver: relaygate::Address,
    admin: relaygate::Address,
    user: relaygate::Address,
}

fn setup() -> Setup {
    let mut ledger = Ledger::new();
    let receiver = ledger.treasury("receiver");
    let admin = ledger.treasury("admin");
    let user = ledger.treasury("user");
    let deployer = ledger.treasury("deployer");

    let config = DeployConfig { receiver, admin };
    let (contract, receipt) = ledger
        .deploy(&config, deployer, Coins::from_nanos(50_000_000))
        .unwrap();
    assert!(receipt.success);
    assert!(receipt.deployed);
    assert_eq!(receipt.from, deployer);
    assert_eq!(receipt.to, contract);

    Setup {
        ledger,
        contract,
        receiver,
        admin,
        user,
    }
}

fn find<'a>(receipts: &'a [Receipt], pred: impl Fn(&Receipt) -> bool) -> &'a Receipt {
    receipts
        .iter()
        .find(|&r| pred(r))
        .expect("no matching receipt")
}

#[test]
fn sends_funds_to_receiver() {
    let mut s = setup();
    let user_before = s.ledger.balance(s.user);
    let receiver_before = s.ledger.balance(s.receiver);

    let receipts = s
        .ledger
        .send(
            s.user,
            s.contract,
            Coins::from_tokens(1),
            MessageBody::forward_funds(),
            true,
        )
        .unwrap();

    let inbound = find(&receipts, |r| r.from == s.user && r.to == s.contract);
    assert!(inbound.success);
    assert_eq!(inbound.op, Some(OP_FORWARD_FUNDS));
    assert_eq!(inbound.value, Coins::from_tokens(1));
    assert_eq!(inbound.out_messages, 1);

    let outbound = find(&receipts, |r| r.from == s.contract && r.to == s.receiver);
    assert!(outbound.success);
    assert_eq!(outbound.value, Coins::from_tokens(1));

    assert!(s.ledger.balance(s.user) < user_before);
    assert!(s.ledger.balance(s.receiver) > receiver_before);
    // The receiver gets the forwarded value net of the transfer fee.
    assert_eq!(
        s.ledger.balance(s.receiver),
        receiver_before.saturating_add(Coins::from_tokens(1).saturating_sub(s.ledger.fee()))
    );
}

#[test]
fn throws_100_when_value_below_one_token() {
    let mut s = setup();
    let receiver_before = s.ledger.balance(s.receiver);
    let user_before = s.ledger.balance(s.user);
    let value = Coins::from_nanos(100_000_000); // 0.1 tokens

    let receipts = s
        .ledger
        .send(
            s.user,
            s.contract,
            value,
            MessageBody::forward_funds(),
            true,
        )
        .unwrap();

    let inbound = find(&receipts, |r| r.from == s.user && r.to == s.contract);
    assert!(!inbound.success);
    assert_eq!(inbound.op, Some(OP_FORWARD_FUNDS));
    assert_eq!(inbound.value, value);
    assert_eq!(inbound.exit_code, 100);

    // The runtime bounces the value back to the sender, minus fees.
    let bounce = find(&receipts, |r| r.from == s.contract && r.to == s.user);
    assert!(bounce.bounced);
    assert_eq!(bounce.value, value.saturating_sub(s.ledger.fee()));

    assert_eq!(s.ledger.balance(s.receiver), receiver_before);
    // Net cost to the user: the send fee plus the bounce fee.
    assert_eq!(
        s.ledger.balance(s.user),
        user_before
            .saturating_sub(s.ledger.fee())
            .saturating_sub(s.ledger.fee())
    );
}

#[test]
fn exact_minimum_is_inclusive() {
    let mut s = setup();

    let receipts = s
        .ledger
        .send(
            s.user,
            s.contract,
            Coins::ONE_TOKEN,
            MessageBody::forward_funds(),
            true,
        )
        .unwrap();
    assert!(find(&receipts, |r| r.to == s.contract).success);

    let just_below = Coins::ONE_TOKEN.saturating_sub(Coins::from_nanos(1));
    let receipts = s
        .ledger
        .send(
            s.user,
            s.contract,
            just_below,
            MessageBody::forward_funds(),
            true,
        )
        .unwrap();
    let inbound = find(&receipts, |r| r.to == s.contract);
    assert!(!inbound.success);
    assert_eq!(inbound.exit_code, 100);
}

#[test]
fn locks_and_unlocks() {
    let mut s = setup();
    assert_eq!(s.ledger.get_is_locked(s.contract).unwrap(), 0);

    // Admin locks.
    let receipts = s
        .ledger
        .send(s.admin, s.contract, Coins::ZERO, MessageBody::lock(), true)
        .unwrap();
    let lock = find(&receipts, |r| r.from == s.admin && r.to == s.contract);
    assert!(lock.success);
    assert_eq!(lock.op, Some(OP_LOCK));
    assert_eq!(s.ledger.get_is_locked(s.contract).unwrap(), 1);

    // Forward below the minimum while locked: the lock abort wins.
    let receipts = s
        .ledger
        .send(
            s.user,
            s.contract,
            Coins::from_nanos(100_000_000),
            MessageBody::forward_funds(),
            true,
        )
        .unwrap();
    let inbound = find(&receipts, |r| r.from == s.user && r.to == s.contract);
    assert!(!inbound.success);
    assert_eq!(inbound.exit_code, 99);

    // Non-admin unlock is rejected and changes nothing.
    let receipts = s
        .ledger
        .send(s.user, s.contract, Coins::ZERO, MessageBody::unlock(), true)
        .unwrap();
    let inbound = find(&receipts, |r| r.from == s.user && r.to == s.contract);
    assert!(!inbound.success);
    assert_eq!(inbound.exit_code, 101);
    assert_eq!(s.ledger.get_is_locked(s.contract).unwrap(), 1);

    // Admin unlock restores forwarding.
    let receipts = s
        .ledger
        .send(s.admin, s.contract, Coins::ZERO, MessageBody::unlock(), true)
        .unwrap();
    let unlock = find(&receipts, |r| r.from == s.admin && r.to == s.contract);
    assert!(unlock.success);
    assert_eq!(unlock.op, Some(OP_UNLOCK));
    assert_eq!(s.ledger.get_is_locked(s.contract).unwrap(), 0);
}

#[test]
fn unknown_op_aborts_and_bounces() {
    let mut s = setup();
    let state_before = s.ledger.contract_state(s.contract).unwrap();

    let receipts = s
        .ledger
        .send(
            s.user,
            s.contract,
            Coins::from_tokens(1),
            MessageBody::encode_op(0xdead_beef),
            true,
        )
        .unwrap();

    let inbound = find(&receipts, |r| r.from == s.user && r.to == s.contract);
    assert!(!inbound.success);
    assert_eq!(inbound.exit_code, 0xffff);

    let bounce = find(&receipts, |r| r.from == s.contract && r.to == s.user);
    assert!(bounce.bounced);

    assert_eq!(s.ledger.contract_state(s.contract).unwrap(), state_before);
}

#[test]
fn empty_body_is_accepted_as_plain_transfer() {
    let mut s = setup();
    let contract_before = s.ledger.balance(s.contract);

    let receipts = s
        .ledger
        .send(
            s.user,
            s.contract,
            Coins::from_tokens(2),
            MessageBody::empty(),
            true,
        )
        .unwrap();

    assert_eq!(receipts.len(), 1);
    assert!(receipts[0].success);
    assert_eq!(receipts[0].op, None);
    assert_eq!(receipts[0].out_messages, 0);
    assert_eq!(
        s.ledger.balance(s.contract),
        contract_before.saturating_add(Coins::from_tokens(2))
    );
}

#[test]
fn forwarding_resumes_after_unlock() {
    let mut s = setup();

    s.ledger
        .send(s.admin, s.contract, Coins::ZERO, MessageBody::lock(), true)
        .unwrap();
    s.ledger
        .send(s.admin, s.contract, Coins::ZERO, MessageBody::unlock(), true)
        .unwrap();

    let receiver_before = s.ledger.balance(s.receiver);
    let receipts = s
        .ledger
        .send(
            s.user,
            s.contract,
            Coins::from_tokens(3),
            MessageBody::forward_funds(),
            true,
        )
        .unwrap();

    assert!(find(&receipts, |r| r.to == s.contract).success);
    assert_eq!(
        s.ledger.balance(s.receiver),
        receiver_before.saturating_add(Coins::from_tokens(3).saturating_sub(s.ledger.fee()))
    );
}
