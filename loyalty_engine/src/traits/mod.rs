//! # Storage contracts
//!
//! This module defines the interface contracts that loyalty engine storage *backends* must honour.
//!
//! * [`OrderStore`] keeps order records keyed by their order number. Order status only ever moves forward, and the
//!   backend must enforce uniqueness of the order number.
//! * [`BalanceLedger`] keeps each user's spendable balance and the withdrawal audit log. Crediting an order and
//!   withdrawing points are each atomic with respect to every other balance mutation.
//! * [`LoyaltyDatabase`] is the union of the two, and is what the engine APIs are generic over.
//!
//! Every method returns a future that is `Send`, so that reconciliation tasks built on top of these traits can be
//! spawned onto the tokio runtime.
mod balance_ledger;
mod data_objects;
mod order_store;

pub use balance_ledger::BalanceLedger;
pub use data_objects::{FinalizeResult, InsertOrderResult, StoreError};
pub use order_store::OrderStore;

/// The complete storage backend required by the loyalty engine.
pub trait LoyaltyDatabase: OrderStore + BalanceLedger {
    /// The URL of the database
    fn url(&self) -> &str;
}
