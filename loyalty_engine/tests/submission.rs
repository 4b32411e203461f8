use futures_util::future::join_all;
use loyalty_engine::{
    db_types::{OrderNumberError, OrderStatusType, Points, UserId},
    test_utils::{ScriptedOracle, ScriptedResponse},
    BalanceLedger,
    OrderFlowError,
    SubmitResult,
};
use support::{order_number, TestSystem};

mod support;

#[tokio::test]
async fn new_order_is_accepted_once() {
    let sys = TestSystem::new(ScriptedOracle::default().with_max_attempts(2)).await;
    let alice = UserId(1);
    let bob = UserId(2);
    sys.db.open_account(alice).await.unwrap();
    sys.db.open_account(bob).await.unwrap();

    let result = sys.orders.submit_order(alice, "79927398713").await.unwrap();
    let order = match result {
        SubmitResult::Accepted(order) => order,
        other => panic!("Expected the order to be accepted. Got {other:?}"),
    };
    assert_eq!(order.number.as_str(), "79927398713");
    assert_eq!(order.user_id, alice);
    assert_eq!(order.status, OrderStatusType::New);
    assert!(order.accrual.is_zero());

    let again = sys.orders.submit_order(alice, " 0079927398713\n").await.unwrap();
    assert!(matches!(again, SubmitResult::AlreadyMine(_)));

    let err = sys.orders.submit_order(bob, "79927398713").await.unwrap_err();
    assert!(matches!(err, OrderFlowError::OrderBelongsToAnotherUser(_)));

    sys.settle().await;
    // Only the accepted submission started a reconciliation
    assert_eq!(sys.oracle.calls(), 2);
    assert_eq!(sys.orders.orders_for_user(alice).await.unwrap().len(), 1);
    assert!(sys.orders.orders_for_user(bob).await.unwrap().is_empty());
    sys.tear_down().await;
}

#[tokio::test]
async fn invalid_order_numbers_are_rejected() {
    let sys = TestSystem::new(ScriptedOracle::default()).await;
    let alice = UserId(1);
    sys.db.open_account(alice).await.unwrap();

    for (raw, expected) in [
        ("1234567812345678", OrderNumberError::ChecksumFailed("1234567812345678".into())),
        ("", OrderNumberError::Empty),
        ("7992739871x", OrderNumberError::NotANumber),
        ("-79927398713", OrderNumberError::NotANumber),
    ] {
        let err = sys.orders.submit_order(alice, raw).await.unwrap_err();
        assert_eq!(err, OrderFlowError::InvalidOrderNumber(expected));
    }
    assert!(sys.orders.orders_for_user(alice).await.unwrap().is_empty());
    assert_eq!(sys.reconciler().in_flight(), 0);
    assert_eq!(sys.oracle.calls(), 0);
    sys.tear_down().await;
}

#[tokio::test]
async fn orders_need_an_account() {
    let sys = TestSystem::new(ScriptedOracle::default()).await;
    let err = sys.orders.submit_order(UserId(42), "79927398713").await.unwrap_err();
    assert_eq!(err, OrderFlowError::AccountNotFound(UserId(42)));
    sys.tear_down().await;
}

#[tokio::test]
async fn concurrent_submissions_start_one_reconciliation() {
    let oracle = ScriptedOracle::new(ScriptedResponse::Processed(Points::from_points(500)));
    let sys = TestSystem::new(oracle).await;
    let alice = UserId(1);
    let bob = UserId(2);
    sys.db.open_account(alice).await.unwrap();
    sys.db.open_account(bob).await.unwrap();

    let submissions = (0..20).map(|i| {
        let user = if i % 2 == 0 { alice } else { bob };
        sys.orders.submit_order(user, "79927398713")
    });
    let results = join_all(submissions).await;
    let accepted = results.iter().filter(|r| matches!(r, Ok(SubmitResult::Accepted(_)))).count();
    assert_eq!(accepted, 1);
    let owner = results
        .iter()
        .find_map(|r| match r {
            Ok(SubmitResult::Accepted(o)) => Some(o.user_id),
            _ => None,
        })
        .unwrap();
    for result in &results {
        match result {
            Ok(SubmitResult::Accepted(_)) => {},
            Ok(SubmitResult::AlreadyMine(o)) => assert_eq!(o.user_id, owner),
            Err(OrderFlowError::OrderBelongsToAnotherUser(_)) => {},
            Err(e) => panic!("Unexpected error: {e}"),
        }
    }

    sys.settle().await;
    assert_eq!(sys.oracle.calls(), 1);
    let balance = sys.balances.balance(owner).await.unwrap();
    assert_eq!(balance.current, Points::from_points(500));
    sys.tear_down().await;
}

#[tokio::test]
async fn orders_are_listed_most_recent_first() {
    let sys = TestSystem::new(ScriptedOracle::default().with_max_attempts(1)).await;
    let alice = UserId(1);
    sys.db.open_account(alice).await.unwrap();
    let numbers = [order_number(1001), order_number(1002), order_number(1003)];
    for n in &numbers {
        let result = sys.orders.submit_order(alice, n).await.unwrap();
        assert!(matches!(result, SubmitResult::Accepted(_)));
    }
    sys.settle().await;
    let listed = sys.orders.orders_for_user(alice).await.unwrap();
    let listed = listed.iter().map(|o| o.number.as_str().to_string()).collect::<Vec<_>>();
    assert_eq!(listed, numbers.iter().rev().cloned().collect::<Vec<_>>());
    sys.tear_down().await;
}
