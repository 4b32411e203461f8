use actix_web::{body::MessageBody, dev::ServiceResponse, http::StatusCode, test, web, web::ServiceConfig};
use loyalty_engine::{
    db_types::{NewOrder, OrderNumber, Points, UserId},
    events::EventProducers,
    test_utils::{
        prepare_env::{destroy_database, prepare_test_env, random_db_path},
        ScriptedOracle,
    },
    BalanceApi,
    BalanceLedger,
    OrderFlowApi,
    OrderStore,
    Reconciler,
    SqliteDatabase,
};

use crate::{
    auth::USER_ID_HEADER,
    routes::health,
    server::{json_config, user_scope},
};

pub const VALID_ORDER: &str = "79927398713";

pub struct TestBackend {
    pub db: SqliteDatabase,
    pub oracle: ScriptedOracle,
    pub reconciler: Reconciler<SqliteDatabase, ScriptedOracle>,
}

impl TestBackend {
    pub async fn new(oracle: ScriptedOracle) -> Self {
        let db = prepare_test_env(&random_db_path()).await;
        let reconciler = Reconciler::new(db.clone(), oracle.clone(), EventProducers::default());
        Self { db, oracle, reconciler }
    }

    pub async fn with_accounts(oracle: ScriptedOracle, users: &[i64]) -> Self {
        let backend = Self::new(oracle).await;
        for &id in users {
            backend.db.open_account(UserId(id)).await.expect("Error opening account");
        }
        backend
    }

    pub fn configure(&self) -> impl FnOnce(&mut ServiceConfig) {
        let orders_api = OrderFlowApi::new(self.db.clone(), self.reconciler.clone());
        let balance_api = BalanceApi::new(self.db.clone());
        move |cfg| {
            cfg.app_data(web::Data::new(orders_api))
                .app_data(web::Data::new(balance_api))
                .app_data(json_config())
                .service(health)
                .service(user_scope::<SqliteDatabase, ScriptedOracle>());
        }
    }

    /// Adds `points` to the user's balance through a completed order.
    pub async fn credit(&self, user_id: i64, order: &str, points: i64) {
        let number = OrderNumber::parse(order).expect("Invalid order number");
        self.db.insert_order(NewOrder::new(number.clone(), UserId(user_id))).await.expect("Error inserting order");
        self.db.complete_order(&number, Points::from_points(points)).await.expect("Error completing order");
    }

    pub async fn tear_down(self) {
        self.reconciler.shutdown().await;
        destroy_database(self.db).await;
    }
}

pub fn as_user(req: test::TestRequest, user_id: i64) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, user_id.to_string()))
}

pub async fn read_response<B: MessageBody>(res: ServiceResponse<B>) -> (StatusCode, String) {
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}
