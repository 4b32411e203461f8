use crate::db_types::{Order, OrderNumber, OrderStatusType, Points, UserId};

/// An order was marked `PROCESSED` and its accrual was credited to the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderProcessedEvent {
    pub order: Order,
}

impl OrderProcessedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }

    pub fn accrual(&self) -> Points {
        self.order.accrual
    }
}

/// The accrual service rejected the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInvalidatedEvent {
    pub order: Order,
}

impl OrderInvalidatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Reconciliation gave up on an order after using its whole retry budget. The order keeps its last non-final status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationAbandonedEvent {
    pub number: OrderNumber,
    pub user_id: UserId,
    pub status: OrderStatusType,
    pub attempts: u32,
}

