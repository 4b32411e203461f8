use std::fmt::Display;

use crate::db_types::{OrderStatusType, Points};

/// What a single poll of the accrual oracle achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The oracle could not be reached, timed out, or sent something unreadable.
    OracleUnavailable,
    /// The oracle answered, but the resulting write to the store failed.
    StoreFailed,
    /// The oracle has not decided yet. Carries the order's stored status after this poll.
    Pending(OrderStatusType),
    /// The order is `PROCESSED` with the given accrual.
    Processed(Points),
    /// The order is `INVALID`.
    Invalid,
    /// The process is shutting down.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileState {
    /// Still waiting for a final verdict. `status` is the order's stored status.
    Polling { attempts: u32, status: OrderStatusType },
    Processed { accrual: Points },
    Invalid,
    /// The retry budget ran out. The order was left with `status`.
    Abandoned { attempts: u32, status: OrderStatusType },
    Cancelled { attempts: u32, status: OrderStatusType },
}

impl ReconcileState {
    /// The initial state for an order that currently has `status`.
    pub fn start(status: OrderStatusType, max_attempts: u32) -> Self {
        match status {
            OrderStatusType::Processed => Self::Processed { accrual: Points::default() },
            OrderStatusType::Invalid => Self::Invalid,
            status if max_attempts == 0 => Self::Abandoned { attempts: 0, status },
            status => Self::Polling { attempts: 0, status },
        }
    }

    /// Applies the outcome of one poll. Every poll counts against the budget, whatever its outcome. Final states
    /// absorb every outcome.
    pub fn next(self, outcome: PollOutcome, max_attempts: u32) -> Self {
        let Self::Polling { attempts, status } = self else {
            return self;
        };
        let attempts = attempts.saturating_add(1);
        let status = match outcome {
            PollOutcome::Processed(accrual) => return Self::Processed { accrual },
            PollOutcome::Invalid => return Self::Invalid,
            PollOutcome::Cancelled => return Self::Cancelled { attempts, status },
            PollOutcome::Pending(reported) if status.can_transition_to(reported) && !reported.is_final() => reported,
            PollOutcome::Pending(_) | PollOutcome::OracleUnavailable | PollOutcome::StoreFailed => status,
        };
        if attempts >= max_attempts {
            Self::Abandoned { attempts, status }
        } else {
            Self::Polling { attempts, status }
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Polling { .. })
    }

    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Polling { attempts, .. } | Self::Abandoned { attempts, .. } | Self::Cancelled { attempts, .. } => {
                Some(*attempts)
            },
            _ => None,
        }
    }
}

impl Display for ReconcileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Polling { attempts, status } => write!(f, "POLLING ({status}, {attempts} attempts)"),
            Self::Processed { accrual } => write!(f, "PROCESSED ({accrual})"),
            Self::Invalid => write!(f, "INVALID"),
            Self::Abandoned { attempts, status } => write!(f, "ABANDONED ({status}, after {attempts} attempts)"),
            Self::Cancelled { attempts, status } => write!(f, "CANCELLED ({status}, after {attempts} attempts)"),
        }
    }
}
