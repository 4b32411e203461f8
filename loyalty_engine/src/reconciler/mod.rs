//! # Order reconciliation
//!
//! Every accepted order gets its own background task that polls the accrual oracle until the order reaches a final
//! status, or the retry budget runs out.
//!
//! The per-order progress is modelled by the [`ReconcileState`] state machine. Each poll of the oracle produces a
//! [`PollOutcome`], and [`ReconcileState::next`] decides what happens next. The state machine is pure, so the retry
//! policy can be tested without a database or an oracle.
//!
//! The [`Reconciler`] owns the tasks. It makes sure that at most one task runs per order number, cancels every task
//! when the process shuts down, and publishes an event whenever an order is settled or abandoned.
mod state_machine;
mod supervisor;

pub use state_machine::{PollOutcome, ReconcileState};
pub use supervisor::Reconciler;
