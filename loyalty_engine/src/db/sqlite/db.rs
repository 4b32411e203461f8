use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::{balances, db_url, new_pool, orders, withdrawals, SqliteDatabaseError};
use crate::{
    db_types::{NewOrder, NewWithdrawal, Order, OrderNumber, Points, UserBalance, UserId, Withdrawal},
    traits::{BalanceLedger, FinalizeResult, InsertOrderResult, LoyaltyDatabase, OrderStore, StoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `LPS_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Migrations that have already been applied are skipped.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// After a conditional update matched nothing, works out whether the order is missing or already final.
    async fn existing_final_order(&self, number: &OrderNumber) -> Result<FinalizeResult, SqliteDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        match orders::fetch_order(number, &mut conn).await? {
            Some(order) if order.status.is_final() => Ok(FinalizeResult::AlreadyFinal(order)),
            Some(order) => Err(SqliteDatabaseError::QueryError(format!(
                "Order {number} is {} but could not be finalized",
                order.status
            ))),
            None => Err(SqliteDatabaseError::OrderNotFound(number.clone())),
        }
    }

    async fn insert_order_inner(&self, order: NewOrder) -> Result<InsertOrderResult, SqliteDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let number = order.number.clone();
        if let Some(inserted) = orders::insert_if_absent(order, &mut conn).await? {
            return Ok(InsertOrderResult::Inserted(inserted));
        }
        let existing = orders::fetch_order(&number, &mut conn).await?.ok_or_else(|| {
            SqliteDatabaseError::QueryError(format!("Order {number} conflicted on insert, but cannot be found"))
        })?;
        debug!("🗃️ Order {number} already exists. It belongs to {}", existing.user_id);
        Ok(InsertOrderResult::AlreadyExists(existing))
    }

    async fn mark_invalid_inner(&self, number: &OrderNumber) -> Result<FinalizeResult, SqliteDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        match orders::mark_invalid(number, &mut conn).await? {
            Some(order) => {
                debug!("🗃️ Order {number} marked as INVALID");
                Ok(FinalizeResult::Finalized(order))
            },
            None => {
                drop(conn);
                self.existing_final_order(number).await
            },
        }
    }

    /// The status change and the credit happen in one transaction. The first statement in the transaction is a write,
    /// so SQLite takes the write lock immediately and concurrent writers queue behind it.
    async fn complete_order_inner(
        &self,
        number: &OrderNumber,
        accrual: Points,
    ) -> Result<FinalizeResult, SqliteDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let Some(order) = orders::mark_processed(number, accrual, &mut tx).await? else {
            tx.rollback().await?;
            return self.existing_final_order(number).await;
        };
        let balance = balances::credit(order.user_id, accrual, &mut tx).await?;
        tx.commit().await?;
        info!(
            "🗃️ Order {number} is PROCESSED. {accrual} points credited to {}. New balance: {}",
            order.user_id, balance.current
        );
        Ok(FinalizeResult::Finalized(order))
    }

    async fn open_account_inner(&self, user_id: UserId) -> Result<UserBalance, SqliteDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        if balances::open_account(user_id, &mut conn).await? {
            debug!("🗃️ Opened a new account for {user_id}");
        }
        balances::fetch_balance(user_id, &mut conn).await?.ok_or(SqliteDatabaseError::AccountNotFound(user_id))
    }

    async fn withdraw_inner(&self, withdrawal: NewWithdrawal) -> Result<UserBalance, StoreError> {
        let user_id = withdrawal.user_id;
        let sum = withdrawal.sum;
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let Some(balance) = balances::debit_if_covered(user_id, sum, &mut tx).await? else {
            tx.rollback().await.map_err(SqliteDatabaseError::from)?;
            let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
            return match balances::fetch_balance(user_id, &mut conn).await? {
                Some(b) => {
                    debug!("🗃️ {user_id} tried to withdraw {sum}, but only has {}", b.current);
                    Err(StoreError::InsufficientFunds { available: b.current, requested: sum })
                },
                None => Err(StoreError::AccountNotFound(user_id)),
            };
        };
        let record = withdrawals::insert_withdrawal(withdrawal, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        info!(
            "🗃️ {user_id} withdrew {sum} against '{}'. Balance: {}, withdrawn: {}",
            record.order_reference, balance.current, balance.withdrawn
        );
        Ok(balance)
    }
}

impl OrderStore for SqliteDatabase {
    async fn fetch_order(&self, number: &OrderNumber) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::fetch_order(number, &mut conn).await?)
    }

    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, StoreError> {
        Ok(self.insert_order_inner(order).await?)
    }

    async fn fetch_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::fetch_orders_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_unfinished_orders(&self) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::fetch_unfinished_orders(&mut conn).await?)
    }

    async fn mark_processing(&self, number: &OrderNumber) -> Result<bool, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let changed = orders::mark_processing(number, &mut conn).await?;
        if changed {
            debug!("🗃️ Order {number} marked as PROCESSING");
        }
        Ok(changed)
    }

    async fn mark_invalid(&self, number: &OrderNumber) -> Result<FinalizeResult, StoreError> {
        Ok(self.mark_invalid_inner(number).await?)
    }
}

impl BalanceLedger for SqliteDatabase {
    async fn open_account(&self, user_id: UserId) -> Result<UserBalance, StoreError> {
        Ok(self.open_account_inner(user_id).await?)
    }

    async fn fetch_balance(&self, user_id: UserId) -> Result<Option<UserBalance>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(balances::fetch_balance(user_id, &mut conn).await?)
    }

    async fn complete_order(&self, number: &OrderNumber, accrual: Points) -> Result<FinalizeResult, StoreError> {
        Ok(self.complete_order_inner(number, accrual).await?)
    }

    async fn withdraw(&self, withdrawal: NewWithdrawal) -> Result<UserBalance, StoreError> {
        self.withdraw_inner(withdrawal).await
    }

    async fn fetch_withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(withdrawals::fetch_withdrawals(user_id, &mut conn).await?)
    }
}

impl LoyaltyDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}
