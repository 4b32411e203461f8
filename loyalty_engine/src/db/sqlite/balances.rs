use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::{now, SqliteDatabaseError},
    db_types::{Points, UserBalance, UserId},
};

pub async fn open_account(user_id: UserId, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (id, balance, withdrawn, created_at, updated_at) VALUES ($1, 0, 0, $2, $2)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(now())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn fetch_balance(user_id: UserId, conn: &mut SqliteConnection) -> Result<Option<UserBalance>, SqliteDatabaseError> {
    let balance = sqlx::query_as::<_, UserBalance>(
        "SELECT id AS user_id, balance AS current, withdrawn FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(balance)
}

/// Adds `amount` to the user's balance.
pub async fn credit(user_id: UserId, amount: Points, conn: &mut SqliteConnection) -> Result<UserBalance, SqliteDatabaseError> {
    let balance = sqlx::query_as::<_, UserBalance>(
        r#"
        UPDATE users SET balance = balance + $2, updated_at = $3
        WHERE id = $1
        RETURNING id AS user_id, balance AS current, withdrawn
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(now())
    .fetch_optional(conn)
    .await?
    .ok_or(SqliteDatabaseError::AccountNotFound(user_id))?;
    trace!("🗃️ Credited {amount} to {user_id}. Balance is now {}", balance.current);
    Ok(balance)
}

/// Moves `amount` from the user's balance to their withdrawn total, in one conditional statement.
///
/// Returns `None` if the user does not exist or the balance is less than `amount`. In that case nothing changes.
pub async fn debit_if_covered(
    user_id: UserId,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<Option<UserBalance>, SqliteDatabaseError> {
    let balance = sqlx::query_as::<_, UserBalance>(
        r#"
        UPDATE users SET balance = balance - $2, withdrawn = withdrawn + $2, updated_at = $3
        WHERE id = $1 AND balance >= $2
        RETURNING id AS user_id, balance AS current, withdrawn
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(now())
    .fetch_optional(conn)
    .await?;
    Ok(balance)
}
