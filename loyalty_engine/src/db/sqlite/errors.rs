use sqlx::error::ErrorKind;
use thiserror::Error;

use crate::{
    db_types::{OrderNumber, UserId},
    traits::StoreError,
};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Could not run database migrations: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Database query error: {0}")]
    QueryError(String),
    #[error("Account not found: {0}")]
    AccountNotFound(UserId),
    #[error("Order not found: {0}")]
    OrderNotFound(OrderNumber),
}

impl SqliteDatabaseError {
    /// True if the error was raised because a row refers to a user that does not exist.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            Self::DriverError(sqlx::Error::Database(e)) => matches!(e.kind(), ErrorKind::ForeignKeyViolation),
            _ => false,
        }
    }
}

impl From<SqliteDatabaseError> for StoreError {
    fn from(e: SqliteDatabaseError) -> Self {
        match e {
            SqliteDatabaseError::AccountNotFound(id) => StoreError::AccountNotFound(id),
            SqliteDatabaseError::OrderNotFound(n) => StoreError::OrderNotFound(n),
            e => StoreError::DatabaseError(e.to_string()),
        }
    }
}
