use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewWithdrawal, UserId, Withdrawal},
};

const WITHDRAWAL_COLUMNS: &str = "id, user_id, order_reference, sum, processed_at";

/// Appends a row to the withdrawal log. This does not touch the balance. Use it in the same transaction as
/// [`super::balances::debit_if_covered`].
pub async fn insert_withdrawal(
    withdrawal: NewWithdrawal,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, SqliteDatabaseError> {
    let sql = format!(
        r#"
        INSERT INTO withdrawals (user_id, order_reference, sum, processed_at) VALUES ($1, $2, $3, $4)
        RETURNING {WITHDRAWAL_COLUMNS};
        "#
    );
    let withdrawal = sqlx::query_as::<_, Withdrawal>(&sql)
        .bind(withdrawal.user_id)
        .bind(withdrawal.order_reference)
        .bind(withdrawal.sum)
        .bind(withdrawal.processed_at)
        .fetch_one(conn)
        .await?;
    Ok(withdrawal)
}

pub async fn fetch_withdrawals(
    user_id: UserId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, SqliteDatabaseError> {
    let sql = format!(
        "SELECT {WITHDRAWAL_COLUMNS} FROM withdrawals WHERE user_id = $1 ORDER BY processed_at DESC, id DESC"
    );
    let withdrawals = sqlx::query_as::<_, Withdrawal>(&sql).bind(user_id).fetch_all(conn).await?;
    Ok(withdrawals)
}
