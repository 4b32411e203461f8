use thiserror::Error;

use crate::db_types::{Order, OrderNumber, Points, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOrderResult {
    Inserted(Order),
    /// The order number was already taken. The existing row is returned so that the caller can tell whether it
    /// belongs to the same user.
    AlreadyExists(Order),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeResult {
    /// The order was moved to a final status by this call.
    Finalized(Order),
    /// The order already had a final status. Nothing was changed.
    AlreadyFinal(Order),
}

impl FinalizeResult {
    pub fn order(&self) -> &Order {
        match self {
            Self::Finalized(o) | Self::AlreadyFinal(o) => o,
        }
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Finalized(_))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No account exists for {0}")]
    AccountNotFound(UserId),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("Insufficient funds. Requested {requested}, but only {available} is available")]
    InsufficientFunds { available: Points, requested: Points },
}
