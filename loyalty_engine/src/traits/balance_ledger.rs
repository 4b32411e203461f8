use std::future::Future;

use crate::{
    db_types::{NewWithdrawal, OrderNumber, Points, UserBalance, UserId, Withdrawal},
    traits::{FinalizeResult, StoreError},
};

/// Per-user balances and the withdrawal audit log.
///
/// `current` only increases when an order is completed, and only decreases when points are withdrawn. Neither
/// operation may ever leave `current` negative, and both must be atomic at the storage level. Implementations must not
/// rely on in-process locks for this.
pub trait BalanceLedger: Clone + Send + Sync + 'static {
    /// Creates a zero balance for the user if one does not exist yet. Calling this for an existing user is a no-op.
    fn open_account(&self, user_id: UserId) -> impl Future<Output = Result<UserBalance, StoreError>> + Send;

    /// The user's balance, or `None` if the user has no account.
    fn fetch_balance(&self, user_id: UserId) -> impl Future<Output = Result<Option<UserBalance>, StoreError>> + Send;

    /// In a single atomic transaction:
    /// * marks the order as `PROCESSED` and records its accrual,
    /// * credits the accrual to the order owner's balance.
    ///
    /// If the order is already final, nothing changes and [`FinalizeResult::AlreadyFinal`] is returned, so applying the
    /// same verdict twice never credits twice.
    fn complete_order(
        &self,
        number: &OrderNumber,
        accrual: Points,
    ) -> impl Future<Output = Result<FinalizeResult, StoreError>> + Send;

    /// Withdraws `withdrawal.sum` from the user's balance and appends a row to the withdrawal log, atomically.
    ///
    /// If the balance does not cover the sum, [`StoreError::InsufficientFunds`] is returned and nothing is changed.
    /// On success the updated balance is returned.
    fn withdraw(&self, withdrawal: NewWithdrawal) -> impl Future<Output = Result<UserBalance, StoreError>> + Send;

    /// The user's withdrawals, most recent first.
    fn fetch_withdrawals(&self, user_id: UserId) -> impl Future<Output = Result<Vec<Withdrawal>, StoreError>> + Send;
}
