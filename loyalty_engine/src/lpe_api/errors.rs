use thiserror::Error;

use crate::{
    db_types::{OrderNumber, OrderNumberError, Points, UserId},
    traits::StoreError,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderFlowError {
    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(#[from] OrderNumberError),
    #[error("Order {0} has already been submitted by another user")]
    OrderBelongsToAnotherUser(OrderNumber),
    #[error("No account exists for {0}")]
    AccountNotFound(UserId),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for OrderFlowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AccountNotFound(id) => Self::AccountNotFound(id),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BalanceApiError {
    #[error("No account exists for {0}")]
    AccountNotFound(UserId),
    #[error("Insufficient funds. Requested {requested}, but only {available} is available")]
    InsufficientFunds { available: Points, requested: Points },
    #[error("Withdrawal amount must be positive, not {0}")]
    InvalidAmount(Points),
    #[error("A withdrawal must reference an order")]
    InvalidReference,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for BalanceApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AccountNotFound(id) => Self::AccountNotFound(id),
            StoreError::InsufficientFunds { available, requested } => Self::InsufficientFunds { available, requested },
            e => Self::DatabaseError(e.to_string()),
        }
    }
}
