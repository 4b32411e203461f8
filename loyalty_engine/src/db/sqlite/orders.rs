use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::{now, SqliteDatabaseError},
    db_types::{NewOrder, Order, OrderNumber, UserId},
};

const ORDER_COLUMNS: &str = "number, user_id, status, accrual, uploaded_at";

/// Inserts a new order with status `NEW`. If an order with the same number already exists, nothing is written and
/// `None` is returned.
///
/// Uniqueness is enforced by the primary key, so two concurrent inserts of the same number cannot both succeed.
pub async fn insert_if_absent(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!(
        r#"
        INSERT INTO orders (number, user_id, status, accrual, uploaded_at, updated_at)
        VALUES ($1, $2, 'NEW', 0, $3, $3)
        ON CONFLICT (number) DO NOTHING
        RETURNING {ORDER_COLUMNS};
        "#
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(&order.number)
        .bind(order.user_id)
        .bind(order.uploaded_at)
        .fetch_optional(conn)
        .await
        .map_err(SqliteDatabaseError::from)
        .map_err(|e| match e.is_foreign_key_violation() {
            true => SqliteDatabaseError::AccountNotFound(order.user_id),
            false => e,
        })?;
    if let Some(o) = &order {
        debug!("🗃️ Order {} saved for {}", o.number, o.user_id);
    }
    Ok(order)
}

pub async fn fetch_order(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE number = $1");
    let order = sqlx::query_as::<_, Order>(&sql).bind(number).fetch_one(conn).await;
    match order {
        Err(sqlx::Error::RowNotFound) => Ok(None),
        Err(e) => Err(e.into()),
        Ok(o) => Ok(Some(o)),
    }
}

pub async fn fetch_orders_for_user(user_id: UserId, conn: &mut SqliteConnection) -> Result<Vec<Order>, SqliteDatabaseError> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY uploaded_at DESC, rowid DESC"
    );
    let orders = sqlx::query_as::<_, Order>(&sql).bind(user_id).fetch_all(conn).await?;
    trace!("🗃️ Fetched {} orders for {user_id}", orders.len());
    Ok(orders)
}

pub async fn fetch_unfinished_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, SqliteDatabaseError> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status IN ('NEW', 'PROCESSING') ORDER BY uploaded_at ASC, rowid ASC"
    );
    let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(conn).await?;
    Ok(orders)
}

/// Moves a `NEW` order to `PROCESSING`. Returns `true` if a row changed.
pub async fn mark_processing(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query(
        "UPDATE orders SET status = 'PROCESSING', updated_at = $2 WHERE number = $1 AND status = 'NEW'",
    )
    .bind(number)
    .bind(now())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Marks a non-final order as `INVALID`, zeroing its accrual. Returns the updated order, or `None` if the order does
/// not exist or is already final.
pub async fn mark_invalid(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!(
        r#"
        UPDATE orders SET status = 'INVALID', accrual = 0, updated_at = $2
        WHERE number = $1 AND status IN ('NEW', 'PROCESSING')
        RETURNING {ORDER_COLUMNS};
        "#
    );
    let order = sqlx::query_as::<_, Order>(&sql).bind(number).bind(now()).fetch_optional(conn).await?;
    Ok(order)
}

/// Marks a non-final order as `PROCESSED` and records its accrual. Returns the updated order, or `None` if the order
/// does not exist or is already final.
///
/// This does not credit the owner. Call it inside a transaction together with [`super::balances::credit`].
pub async fn mark_processed(
    number: &OrderNumber,
    accrual: crate::db_types::Points,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let sql = format!(
        r#"
        UPDATE orders SET status = 'PROCESSED', accrual = $2, updated_at = $3
        WHERE number = $1 AND status IN ('NEW', 'PROCESSING')
        RETURNING {ORDER_COLUMNS};
        "#
    );
    let order = sqlx::query_as::<_, Order>(&sql).bind(number).bind(accrual).bind(now()).fetch_optional(conn).await?;
    Ok(order)
}
