use std::fmt::Debug;

use log::*;

use crate::{
    accrual::AccrualOracle,
    db_types::{NewOrder, Order, OrderNumber, UserId},
    lpe_api::errors::OrderFlowError,
    reconciler::Reconciler,
    traits::{InsertOrderResult, LoyaltyDatabase},
};

/// The successful outcomes of [`OrderFlowApi::submit_order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// The order is new. It has been stored and reconciliation has started.
    Accepted(Order),
    /// The user has already submitted this order. Nothing was done.
    AlreadyMine(Order),
}

impl SubmitResult {
    pub fn order(&self) -> &Order {
        match self {
            Self::Accepted(o) | Self::AlreadyMine(o) => o,
        }
    }
}

/// `OrderFlowApi` is the entry point for users submitting purchase orders for points.
pub struct OrderFlowApi<B, A> {
    db: B,
    reconciler: Reconciler<B, A>,
}

impl<B, A> Debug for OrderFlowApi<B, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, A> OrderFlowApi<B, A> {
    pub fn new(db: B, reconciler: Reconciler<B, A>) -> Self {
        Self { db, reconciler }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn reconciler(&self) -> &Reconciler<B, A> {
        &self.reconciler
    }
}

impl<B, A> OrderFlowApi<B, A>
where
    B: LoyaltyDatabase,
    A: AccrualOracle,
{
    /// Submits an order number on behalf of `user_id`.
    ///
    /// * The number must consist of decimal digits and pass the Luhn check, otherwise
    ///   [`OrderFlowError::InvalidOrderNumber`] is returned.
    /// * A number nobody has submitted before is stored as a `NEW` order, reconciliation starts in the background, and
    ///   [`SubmitResult::Accepted`] is returned.
    /// * If the user already submitted the number, [`SubmitResult::AlreadyMine`] is returned and nothing else happens.
    /// * If another user owns the number, [`OrderFlowError::OrderBelongsToAnotherUser`] is returned.
    ///
    /// Concurrent submissions of the same number are safe: the store only accepts the first, and every other caller
    /// gets the existing order back, so exactly one reconciliation task is started.
    pub async fn submit_order(&self, user_id: UserId, raw_number: &str) -> Result<SubmitResult, OrderFlowError> {
        let number = OrderNumber::parse(raw_number).map_err(|e| {
            debug!("📦️ {user_id} submitted an invalid order number '{}': {e}", raw_number.trim());
            e
        })?;
        if let Some(existing) = self.db.fetch_order(&number).await? {
            return Self::resolve_existing(user_id, existing);
        }
        match self.db.insert_order(NewOrder::new(number, user_id)).await? {
            InsertOrderResult::Inserted(order) => {
                info!("📦️ Order {} accepted for {user_id}", order.number);
                if !self.reconciler.launch(&order) {
                    warn!(
                        "📦️ Reconciliation for order {} could not be started. It will be picked up on the next restart",
                        order.number
                    );
                }
                Ok(SubmitResult::Accepted(order))
            },
            InsertOrderResult::AlreadyExists(existing) => {
                debug!("📦️ Order {} was submitted concurrently by {}", existing.number, existing.user_id);
                Self::resolve_existing(user_id, existing)
            },
        }
    }

    fn resolve_existing(user_id: UserId, existing: Order) -> Result<SubmitResult, OrderFlowError> {
        if existing.user_id == user_id {
            debug!("📦️ {user_id} resubmitted order {}", existing.number);
            Ok(SubmitResult::AlreadyMine(existing))
        } else {
            info!("📦️ {user_id} tried to submit order {}, which belongs to {}", existing.number, existing.user_id);
            Err(OrderFlowError::OrderBelongsToAnotherUser(existing.number))
        }
    }

    /// The user's orders, most recently uploaded first.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        Ok(orders)
    }
}
