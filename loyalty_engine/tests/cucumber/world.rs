use cucumber::World;
use loyalty_engine::{
    db_types::UserBalance,
    test_utils::{
        prepare_env::{prepare_test_env, random_db_path},
        ScriptedOracle,
    },
    BalanceApi,
    BalanceApiError,
    OrderFlowApi,
    OrderFlowError,
    Reconciler,
    SqliteDatabase,
    SubmitResult,
    events::EventProducers,
};

#[derive(Default, Debug, World)]
pub struct LoyaltyWorld {
    pub system: Option<LoyaltySystem>,
    pub last_submission: Option<Result<SubmitResult, OrderFlowError>>,
    pub last_withdrawal: Option<Result<UserBalance, BalanceApiError>>,
}

#[derive(Debug)]
pub struct LoyaltySystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub oracle: ScriptedOracle,
    pub orders: OrderFlowApi<SqliteDatabase, ScriptedOracle>,
    pub balances: BalanceApi<SqliteDatabase>,
}

impl LoyaltyWorld {
    pub fn system(&self) -> &LoyaltySystem {
        self.system.as_ref().expect("Loyalty system not initialised")
    }
}

impl LoyaltySystem {
    pub async fn new(oracle: ScriptedOracle) -> Self {
        let db_path = random_db_path();
        let db = prepare_test_env(&db_path).await;
        let reconciler = Reconciler::new(db.clone(), oracle.clone(), EventProducers::default());
        let orders = OrderFlowApi::new(db.clone(), reconciler);
        let balances = BalanceApi::new(db.clone());
        Self { db_path, db, oracle, orders, balances }
    }
}
