use std::time::Duration;

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
    Scope,
};
use log::*;
use loyalty_engine::{
    accrual::{AccrualClient, AccrualOracle},
    traits::LoyaltyDatabase,
    BalanceApi,
    OrderFlowApi,
    Reconciler,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    hooks::create_event_handlers,
    routes::{health, MyBalanceRoute, MyOrdersRoute, MyWithdrawalsRoute, SubmitOrderRoute, WithdrawRoute},
};

/// Starts the loyalty server and runs it until it receives a termination signal.
///
/// Start up happens in this order: connect to the database (running migrations if configured), start the event
/// handlers, build the reconciler, relaunch reconciliation for unfinished orders, then start accepting requests. Once
/// the HTTP server stops, every running reconciliation is cancelled and awaited before returning.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.database_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
        info!("🗃️ Database migrations are up to date");
    }
    let handlers = create_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;

    let oracle = AccrualClient::new(config.accrual.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    // Reconciliations run on this runtime, whichever HTTP worker accepted the order
    let reconciler = Reconciler::new(db.clone(), oracle, producers);
    if config.resume_pending_orders {
        match reconciler.resume_pending().await {
            Ok(n) => info!("🚀️ {n} unfinished orders are being reconciled"),
            Err(e) => error!("🚀️ Could not resume unfinished orders. {e}"),
        }
    }

    let srv = create_server_instance(&config, db.clone(), reconciler.clone())?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🚀️ HTTP server has stopped. Waiting for reconciliation tasks to wind down.");
    reconciler.shutdown().await;
    db.close().await;
    result
}

pub fn create_server_instance<A: AccrualOracle>(
    config: &ServerConfig,
    db: SqliteDatabase,
    reconciler: Reconciler<SqliteDatabase, A>,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), reconciler.clone());
        let balance_api = BalanceApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("lps::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(balance_api))
            .app_data(json_config())
            .service(health)
            .service(user_scope::<SqliteDatabase, A>())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// The `/api/user` routes, generic over the storage backend and the accrual oracle.
pub fn user_scope<B: LoyaltyDatabase, A: AccrualOracle>() -> Scope {
    web::scope("/api/user")
        .service(SubmitOrderRoute::<B, A>::new())
        .service(MyOrdersRoute::<B, A>::new())
        .service(MyBalanceRoute::<B>::new())
        .service(WithdrawRoute::<B>::new())
        .service(MyWithdrawalsRoute::<B>::new())
}

/// Reports unreadable JSON bodies in the same format as every other error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!("💻️ Could not deserialize request body. {err}");
        ServerError::CouldNotDeserializePayload(err.to_string()).into()
    })
}
