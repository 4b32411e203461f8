use std::future::Future;

use crate::{
    db_types::{NewOrder, Order, OrderNumber, UserId},
    traits::{FinalizeResult, InsertOrderResult, StoreError},
};

/// Persistent storage of order records, keyed by order number.
pub trait OrderStore: Clone + Send + Sync + 'static {
    /// Fetches the order with the given number. A missing order is `Ok(None)`, and is never confused with a failed
    /// read.
    fn fetch_order(&self, number: &OrderNumber) -> impl Future<Output = Result<Option<Order>, StoreError>> + Send;

    /// Stores a new order with status `NEW` and zero accrual.
    ///
    /// The order number is unique. If another row already holds the number (possibly inserted a moment ago by a
    /// concurrent request), nothing is written and that row is returned as [`InsertOrderResult::AlreadyExists`].
    ///
    /// If the owner has no account, [`StoreError::AccountNotFound`] is returned.
    fn insert_order(&self, order: NewOrder) -> impl Future<Output = Result<InsertOrderResult, StoreError>> + Send;

    /// All of the user's orders, most recently uploaded first.
    fn fetch_orders_for_user(&self, user_id: UserId) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    /// Every order that is still `NEW` or `PROCESSING`, oldest first.
    fn fetch_unfinished_orders(&self) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    /// Moves a `NEW` order to `PROCESSING`. Returns `true` if the status changed, and `false` if the order was
    /// already `PROCESSING` or final.
    fn mark_processing(&self, number: &OrderNumber) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Marks the order as `INVALID`. Orders that are already final are left untouched and returned as
    /// [`FinalizeResult::AlreadyFinal`].
    fn mark_invalid(&self, number: &OrderNumber) -> impl Future<Output = Result<FinalizeResult, StoreError>> + Send;
}
