#![allow(dead_code)]

use loyalty_engine::{
    db_types::{NewOrder, OrderNumber, Points, UserId},
    events::EventProducers,
    helpers::with_luhn_check_digit,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        ScriptedOracle,
    },
    BalanceApi,
    BalanceLedger,
    FinalizeResult,
    OrderFlowApi,
    OrderStore,
    Reconciler,
    SqliteDatabase,
};

pub struct TestSystem {
    pub db: SqliteDatabase,
    pub oracle: ScriptedOracle,
    pub orders: OrderFlowApi<SqliteDatabase, ScriptedOracle>,
    pub balances: BalanceApi<SqliteDatabase>,
}

impl TestSystem {
    pub async fn new(oracle: ScriptedOracle) -> Self {
        Self::with_producers(oracle, EventProducers::default()).await
    }

    pub async fn with_producers(oracle: ScriptedOracle, producers: EventProducers) -> Self {
        let db = prepare_test_env(&random_db_path()).await;
        let reconciler = Reconciler::new(db.clone(), oracle.clone(), producers);
        let orders = OrderFlowApi::new(db.clone(), reconciler);
        let balances = BalanceApi::new(db.clone());
        Self { db, oracle, orders, balances }
    }

    pub fn reconciler(&self) -> &Reconciler<SqliteDatabase, ScriptedOracle> {
        self.orders.reconciler()
    }

    pub async fn settle(&self) {
        self.reconciler().drain().await;
    }

    pub async fn tear_down(self) {
        self.reconciler().shutdown().await;
        loyalty_engine::test_utils::prepare_env::destroy_database(self.db).await;
    }
}

/// A Luhn-valid order number derived from `seed`.
pub fn order_number(seed: u64) -> String {
    with_luhn_check_digit(&seed.to_string()).expect("seed is all digits")
}

/// Credits `points` to the user's balance by storing and completing a throw-away order.
pub async fn credit(db: &SqliteDatabase, user_id: UserId, points: i64) {
    let number = OrderNumber::parse(&order_number(rand::random::<u32>() as u64 + 1_000_000)).unwrap();
    db.insert_order(NewOrder::new(number.clone(), user_id)).await.expect("Error inserting order");
    let result = db.complete_order(&number, Points::from_points(points)).await.expect("Error completing order");
    assert!(matches!(result, FinalizeResult::Finalized(_)));
}
