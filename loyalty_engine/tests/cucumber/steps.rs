use cucumber::{given, then, when};
use loyalty_engine::{
    db_types::{NewOrder, OrderNumber, OrderStatusType, Points, UserId},
    helpers::with_luhn_check_digit,
    BalanceApiError,
    BalanceLedger,
    OrderFlowError,
    OrderStore,
    SubmitResult,
};

use crate::cucumber::LoyaltyWorld;

#[given(expr = "the accrual service will award {int} points for the next order")]
async fn award_next(world: &mut LoyaltyWorld, points: i64) {
    let _ = world.system().oracle.clone().then_processed(Points::from_points(points));
}

#[given(expr = "user {int} has been credited {int} points")]
async fn seed_credit(world: &mut LoyaltyWorld, user: i64, points: i64) {
    let db = &world.system().db;
    let seed = format!("{}", 900_000 + rand::random::<u16>() as u32);
    let number = with_luhn_check_digit(&seed).and_then(|n| OrderNumber::parse(&n).ok()).expect("Invalid seed");
    db.insert_order(NewOrder::new(number.clone(), UserId(user))).await.expect("Error inserting order");
    db.complete_order(&number, Points::from_points(points)).await.expect("Error completing order");
}

#[when(expr = "user {int} submits order {string}")]
async fn submit_order(world: &mut LoyaltyWorld, user: i64, number: String) {
    let result = world.system().orders.submit_order(UserId(user), &number).await;
    world.last_submission = Some(result);
}

#[when("reconciliation settles")]
async fn settle(world: &mut LoyaltyWorld) {
    world.system().orders.reconciler().drain().await;
}

#[when(expr = "user {int} withdraws {int} points against order {string}")]
async fn withdraw(world: &mut LoyaltyWorld, user: i64, points: i64, reference: String) {
    let result = world.system().balances.withdraw(UserId(user), &reference, Points::from_points(points)).await;
    world.last_withdrawal = Some(result);
}

#[then("the submission is accepted")]
async fn submission_accepted(world: &mut LoyaltyWorld) {
    let result = world.last_submission.as_ref().expect("Nothing was submitted");
    assert!(matches!(result, Ok(SubmitResult::Accepted(_))), "{result:?}");
}

#[then("the submission is already mine")]
async fn submission_already_mine(world: &mut LoyaltyWorld) {
    let result = world.last_submission.as_ref().expect("Nothing was submitted");
    assert!(matches!(result, Ok(SubmitResult::AlreadyMine(_))), "{result:?}");
}

#[then("the submission is a conflict")]
async fn submission_conflict(world: &mut LoyaltyWorld) {
    let result = world.last_submission.as_ref().expect("Nothing was submitted");
    assert!(matches!(result, Err(OrderFlowError::OrderBelongsToAnotherUser(_))), "{result:?}");
}

#[then("the submission is rejected as an invalid order number")]
async fn submission_invalid(world: &mut LoyaltyWorld) {
    let result = world.last_submission.as_ref().expect("Nothing was submitted");
    assert!(matches!(result, Err(OrderFlowError::InvalidOrderNumber(_))), "{result:?}");
}

#[then(expr = "order {string} is {word}")]
async fn order_status(world: &mut LoyaltyWorld, number: String, status: String) {
    let number = OrderNumber::parse(&number).expect("Invalid order number");
    let order = world.system().db.fetch_order(&number).await.expect("Error fetching order").expect("No such order");
    let expected = status.parse::<OrderStatusType>().expect("Invalid status");
    assert_eq!(order.status, expected);
}

#[then(expr = "order {string} is PROCESSED with an accrual of {int} points")]
async fn order_processed(world: &mut LoyaltyWorld, number: String, points: i64) {
    let number = OrderNumber::parse(&number).expect("Invalid order number");
    let order = world.system().db.fetch_order(&number).await.expect("Error fetching order").expect("No such order");
    assert_eq!(order.status, OrderStatusType::Processed);
    assert_eq!(order.accrual, Points::from_points(points));
}

#[then(expr = "user {int} has no orders")]
async fn no_orders(world: &mut LoyaltyWorld, user: i64) {
    let orders = world.system().orders.orders_for_user(UserId(user)).await.expect("Error fetching orders");
    assert!(orders.is_empty(), "{orders:?}");
}

#[then(expr = "user {int} has a balance of {int} points with {int} points withdrawn")]
async fn check_balance(world: &mut LoyaltyWorld, user: i64, current: i64, withdrawn: i64) {
    let balance = world.system().balances.balance(UserId(user)).await.expect("Error fetching balance");
    assert_eq!(balance.current, Points::from_points(current), "Current balance is incorrect");
    assert_eq!(balance.withdrawn, Points::from_points(withdrawn), "Withdrawn total is incorrect");
}

#[then(expr = "user {int} has {int} withdrawal(s)")]
async fn count_withdrawals(world: &mut LoyaltyWorld, user: i64, count: usize) {
    let withdrawals = world.system().balances.withdrawals(UserId(user)).await.expect("Error fetching withdrawals");
    assert_eq!(withdrawals.len(), count);
}

#[then("the withdrawal succeeds")]
async fn withdrawal_succeeds(world: &mut LoyaltyWorld) {
    let result = world.last_withdrawal.as_ref().expect("Nothing was withdrawn");
    assert!(result.is_ok(), "{result:?}");
}

#[then("the withdrawal is refused for insufficient funds")]
async fn withdrawal_refused(world: &mut LoyaltyWorld) {
    let result = world.last_withdrawal.as_ref().expect("Nothing was withdrawn");
    assert!(matches!(result, Err(BalanceApiError::InsufficientFunds { .. })), "{result:?}");
}

#[then(expr = "the accrual service was asked {int} times")]
async fn oracle_calls(world: &mut LoyaltyWorld, calls: u32) {
    assert_eq!(world.system().oracle.calls(), calls);
}
