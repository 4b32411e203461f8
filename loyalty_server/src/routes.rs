//! Request handler definitions
//!
//! Define each route and its handler here. Handlers only translate between HTTP and the engine APIs. Anything more
//! involved belongs in the engine.
//!
//! Every user route takes an [`AuthenticatedUser`] argument, so requests without a valid `X-User-Id` header are
//! rejected with 401 before the handler runs.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use loyalty_engine::{
    accrual::AccrualOracle,
    traits::{BalanceLedger, LoyaltyDatabase},
    BalanceApi,
    OrderFlowApi,
    SubmitResult,
};

use crate::{
    auth::AuthenticatedUser,
    data_objects::{BalanceResponse, WithdrawalRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(submit_order => Post "/orders" impl LoyaltyDatabase, AccrualOracle);
/// Route handler for uploading an order number.
///
/// The body is the order number as plain text. Responses:
/// * 202 if the order was accepted and reconciliation has started,
/// * 200 if the caller had already uploaded this order,
/// * 409 if another user owns the order,
/// * 422 if the order number is malformed or fails the checksum.
pub async fn submit_order<B, A>(
    user: AuthenticatedUser,
    body: String,
    api: web::Data<OrderFlowApi<B, A>>,
) -> Result<HttpResponse, ServerError>
where
    B: LoyaltyDatabase,
    A: AccrualOracle,
{
    debug!("💻️ POST order {} for {}", body.trim(), user.id());
    let result = api.submit_order(user.id(), &body).await?;
    let response = match result {
        SubmitResult::Accepted(order) => HttpResponse::Accepted().json(order),
        SubmitResult::AlreadyMine(order) => HttpResponse::Ok().json(order),
    };
    Ok(response)
}

route!(my_orders => Get "/orders" impl LoyaltyDatabase, AccrualOracle);
/// The caller's orders, most recent first. 204 if there are none.
pub async fn my_orders<B, A>(
    user: AuthenticatedUser,
    api: web::Data<OrderFlowApi<B, A>>,
) -> Result<HttpResponse, ServerError>
where
    B: LoyaltyDatabase,
    A: AccrualOracle,
{
    debug!("💻️ GET my_orders for {}", user.id());
    let orders = api.orders_for_user(user.id()).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Balance  ----------------------------------------------------
route!(my_balance => Get "/balance" impl BalanceLedger);
pub async fn my_balance<B: BalanceLedger>(
    user: AuthenticatedUser,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_balance for {}", user.id());
    let balance = api.balance(user.id()).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse::from(balance)))
}

route!(withdraw => Post "/balance/withdraw" impl BalanceLedger);
/// Spends `sum` points from the caller's balance against the `order` reference.
///
/// Returns 200 with the new balance, or 402 if the balance does not cover the sum. A refused withdrawal leaves no
/// trace.
pub async fn withdraw<B: BalanceLedger>(
    user: AuthenticatedUser,
    body: web::Json<WithdrawalRequest>,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let WithdrawalRequest { order, sum } = body.into_inner();
    debug!("💻️ POST withdraw {sum} against '{order}' for {}", user.id());
    let balance = api.withdraw(user.id(), &order, sum).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse::from(balance)))
}

route!(my_withdrawals => Get "/withdrawals" impl BalanceLedger);
/// The caller's withdrawals, most recent first. 204 if there are none.
pub async fn my_withdrawals<B: BalanceLedger>(
    user: AuthenticatedUser,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_withdrawals for {}", user.id());
    let withdrawals = api.withdrawals(user.id()).await?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    Ok(HttpResponse::Ok().json(withdrawals))
}
