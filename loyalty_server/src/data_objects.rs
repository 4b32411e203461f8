use loyalty_engine::db_types::{Points, UserBalance};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/user/balance/withdraw`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// The reference the points are spent against.
    pub order: String,
    pub sum: Points,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceResponse {
    pub current: Points,
    pub withdrawn: Points,
}

impl From<UserBalance> for BalanceResponse {
    fn from(balance: UserBalance) -> Self {
        Self { current: balance.current, withdrawn: balance.withdrawn }
    }
}
