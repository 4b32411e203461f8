use serde::{Deserialize, Serialize};

use crate::{
    accrual::AccrualError,
    db_types::{OrderNumber, OrderStatusType, Points},
};

/// The largest accrual accepted for a single order, in hundredths of a point. Balances stay far below `i64::MAX`.
pub const MAX_ACCRUAL: i64 = i64::MAX / lps_common::POINTS_SCALE / 2;

/// The accrual service's current decision about an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualVerdict {
    pub order: String,
    pub status: OrderStatusType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
}

impl AccrualVerdict {
    pub fn new(order: &OrderNumber, status: OrderStatusType) -> Self {
        Self { order: order.as_str().to_string(), status, accrual: None }
    }

    pub fn processed(order: &OrderNumber, accrual: Points) -> Self {
        Self { order: order.as_str().to_string(), status: OrderStatusType::Processed, accrual: Some(accrual) }
    }

    /// The awarded points. A `PROCESSED` verdict without an accrual awards nothing.
    pub fn accrual(&self) -> Points {
        self.accrual.unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct RawVerdict {
    order: String,
    status: OrderStatusType,
    #[serde(default)]
    accrual: Option<f64>,
}

/// Decodes and sanity-checks the body of a successful accrual service response for the order `expected`.
///
/// The response is rejected if it is not valid JSON or if it is about a different order. The accrual must lie between
/// zero and [`MAX_ACCRUAL`].
pub fn decode_verdict(expected: &OrderNumber, body: &[u8]) -> Result<AccrualVerdict, AccrualError> {
    let raw = serde_json::from_slice::<RawVerdict>(body).map_err(|e| AccrualError::MalformedResponse(e.to_string()))?;
    match OrderNumber::parse(&raw.order) {
        Ok(n) if &n == expected => {},
        _ => {
            return Err(AccrualError::MalformedResponse(format!(
                "Asked about order {expected}, but the answer is for order '{}'",
                raw.order
            )))
        },
    }
    let accrual = match raw.accrual {
        Some(a) if a < 0.0 => {
            return Err(AccrualError::MalformedResponse(format!("Accrual cannot be negative: {a}")));
        },
        Some(a) => Some(Points::try_from(a).map_err(|e| AccrualError::MalformedResponse(e.to_string()))?),
        None => None,
    };
    if let Some(a) = accrual.filter(|a| a.value() > MAX_ACCRUAL) {
        return Err(AccrualError::MalformedResponse(format!("Accrual of {a} points is implausibly large")));
    }
    Ok(AccrualVerdict { order: expected.as_str().to_string(), status: raw.status, accrual })
}
