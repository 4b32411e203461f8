use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
pub use lps_common::Points;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::helpers::luhn_valid;

//--------------------------------------        UserId         ---------------------------------------------------------
/// The identifier of a user, as issued by the (external) registration service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct UserId(pub i64);

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user #{}", self.0)
    }
}

//--------------------------------------      OrderNumber      ---------------------------------------------------------
/// A purchase order number. Order numbers are strings of decimal digits that pass the Luhn checksum.
///
/// The only way to build an `OrderNumber` from user input is [`OrderNumber::parse`], which normalises and validates
/// it. Values loaded from the database are trusted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderNumber(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("The order number is empty")]
    Empty,
    #[error("The order number must contain only decimal digits")]
    NotANumber,
    #[error("The order number {0} failed the checksum test")]
    ChecksumFailed(String),
}

impl OrderNumber {
    /// Parses a raw order number, as submitted by a user.
    ///
    /// Surrounding whitespace is ignored, and leading zeros are dropped so that `"0079927398713"` and `"79927398713"`
    /// refer to the same order.
    pub fn parse(raw: &str) -> Result<Self, OrderNumberError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(OrderNumberError::Empty);
        }
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderNumberError::NotANumber);
        }
        let digits = match raw.trim_start_matches('0') {
            "" => "0",
            d => d,
        };
        if !luhn_valid(digits) {
            return Err(OrderNumberError::ChecksumFailed(digits.to_string()));
        }
        Ok(Self(digits.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle status of an order.
///
/// Orders only ever move forward: `New → Processing → {Processed | Invalid}`. `Processed` and `Invalid` are final.
/// The accrual service uses the same vocabulary for its verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatusType {
    /// The order has been uploaded, but the accrual service has not started looking at it. The accrual service calls
    /// this status `REGISTERED`.
    #[serde(alias = "REGISTERED")]
    New,
    /// The accrual service is still deciding on the order.
    Processing,
    /// The accrual service rejected the order. No points are awarded.
    Invalid,
    /// The accrual service awarded points for the order, and they have been credited to the owner.
    Processed,
}

impl OrderStatusType {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Invalid | Self::Processed)
    }

    /// The position of the status along the order lifecycle. Final statuses share the highest rank.
    fn rank(&self) -> u8 {
        match self {
            Self::New => 0,
            Self::Processing => 1,
            Self::Invalid | Self::Processed => 2,
        }
    }

    /// Returns true if an order with this status may move to `next`.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        !self.is_final() && next.rank() > self.rank()
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "NEW"),
            OrderStatusType::Processing => write!(f, "PROCESSING"),
            OrderStatusType::Invalid => write!(f, "INVALID"),
            OrderStatusType::Processed => write!(f, "PROCESSED"),
        }
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to NEW");
            OrderStatusType::New
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            _ => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Order {
    pub number: OrderNumber,
    #[serde(skip)]
    pub user_id: UserId,
    pub status: OrderStatusType,
    /// Only non-zero once the order is `PROCESSED`.
    #[serde(skip_serializing_if = "Points::is_zero")]
    pub accrual: Points,
    pub uploaded_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub number: OrderNumber,
    pub user_id: UserId,
    pub uploaded_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(number: OrderNumber, user_id: UserId) -> Self {
        Self { number, user_id, uploaded_at: Utc::now() }
    }
}

//--------------------------------------     UserBalance       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct UserBalance {
    #[serde(skip)]
    pub user_id: UserId,
    /// Spendable points.
    pub current: Points,
    /// Total points ever withdrawn.
    pub withdrawn: Points,
}

//--------------------------------------      Withdrawal       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Withdrawal {
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub user_id: UserId,
    /// An opaque reference supplied by the user. It is not necessarily a loyalty order number.
    #[serde(rename = "order")]
    pub order_reference: String,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    pub user_id: UserId,
    pub order_reference: String,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

impl NewWithdrawal {
    pub fn new(user_id: UserId, order_reference: impl Into<String>, sum: Points) -> Self {
        Self { user_id, order_reference: order_reference.into(), sum, processed_at: Utc::now() }
    }
}
