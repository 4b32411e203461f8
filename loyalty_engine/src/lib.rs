//! Loyalty Engine
//!
//! The loyalty engine keeps track of purchase orders that users upload, asks an external accrual service how many
//! points each order earns, and maintains each user's spendable points balance.
//!
//! The library is divided into these main sections:
//! 1. Storage contracts ([`mod@traits`]) and their SQLite implementation ([`SqliteDatabase`]). You should never need to
//!    access the database directly. Instead, use the public API provided by the engine. The exception is the data
//!    types stored in the database, which are defined in [`mod@db_types`] and are public.
//! 2. The accrual oracle adapter ([`mod@accrual`]), which fetches verdicts for orders from the external accrual
//!    service.
//! 3. The reconciler ([`mod@reconciler`]), which drives every submitted order to a final status in the background and
//!    credits the owner's balance when points are awarded.
//! 4. The public API ([`OrderFlowApi`] and [`BalanceApi`]), used by request handlers to submit orders, query balances
//!    and withdraw points.
//!
//! The engine also emits events when an order is settled or when reconciliation gives up on an order. Any number of
//! async hooks can subscribe to these ([`mod@events`]).
mod db;

pub mod accrual;
pub mod db_types;
pub mod events;
pub mod helpers;
mod lpe_api;
pub mod reconciler;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use lpe_api::{
    balance_api::BalanceApi,
    errors::{BalanceApiError, OrderFlowError},
    order_flow_api::{OrderFlowApi, SubmitResult},
};
pub use reconciler::Reconciler;
pub use traits::{BalanceLedger, FinalizeResult, InsertOrderResult, LoyaltyDatabase, OrderStore, StoreError};
