use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewWithdrawal, Points, UserBalance, UserId, Withdrawal},
    lpe_api::errors::BalanceApiError,
    traits::BalanceLedger,
};

/// Balance queries and withdrawals.
///
/// Withdrawals are a single conditional update in the ledger, so concurrent withdrawals can never overdraw a
/// balance, and a rejected withdrawal leaves no trace.
pub struct BalanceApi<B> {
    db: B,
}

impl<B> Debug for BalanceApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BalanceApi")
    }
}

impl<B> BalanceApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> BalanceApi<B>
where B: BalanceLedger
{
    /// Creates a zero balance for a newly registered user. Safe to call more than once.
    pub async fn open_account(&self, user_id: UserId) -> Result<UserBalance, BalanceApiError> {
        let balance = self.db.open_account(user_id).await?;
        Ok(balance)
    }

    pub async fn balance(&self, user_id: UserId) -> Result<UserBalance, BalanceApiError> {
        self.db.fetch_balance(user_id).await?.ok_or(BalanceApiError::AccountNotFound(user_id))
    }

    /// Withdraws `sum` points from the user's balance against `reference`, and returns the new balance.
    pub async fn withdraw(&self, user_id: UserId, reference: &str, sum: Points) -> Result<UserBalance, BalanceApiError> {
        if !sum.is_positive() {
            return Err(BalanceApiError::InvalidAmount(sum));
        }
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(BalanceApiError::InvalidReference);
        }
        let result = self.db.withdraw(NewWithdrawal::new(user_id, reference, sum)).await;
        match &result {
            Ok(balance) => info!("💰️ {user_id} withdrew {sum}. {} remaining", balance.current),
            Err(e) => debug!("💰️ Withdrawal of {sum} for {user_id} failed: {e}"),
        }
        Ok(result?)
    }

    /// The user's withdrawals, most recent first.
    pub async fn withdrawals(&self, user_id: UserId) -> Result<Vec<Withdrawal>, BalanceApiError> {
        let withdrawals = self.db.fetch_withdrawals(user_id).await?;
        trace!("💰️ {user_id} has {} withdrawals", withdrawals.len());
        Ok(withdrawals)
    }
}
