//! # Accrual oracle
//!
//! The accrual service is the external authority that decides whether an order earns points, and how many. It is
//! queried with `GET {base_url}/api/orders/{number}`, and answers with a verdict using the same four statuses as the
//! engine's orders.
//!
//! [`AccrualOracle`] is the contract the reconciler relies on. [`AccrualClient`] is the HTTP implementation. Every
//! failure the client can encounter (transport errors, timeouts, non-2xx responses, unreadable payloads) is reported
//! as an [`AccrualError`], and the reconciler treats all of them as transient.
mod client;
mod config;
mod errors;
mod verdict;

use std::{future::Future, time::Duration};

pub use client::AccrualClient;
pub use config::AccrualConfig;
pub use errors::AccrualError;
pub use verdict::{decode_verdict, AccrualVerdict};

use crate::db_types::OrderNumber;

pub trait AccrualOracle: Clone + Send + Sync + 'static {
    /// Fetches the current verdict for the order. Implementations must give up after [`Self::request_timeout`].
    fn lookup(&self, number: &OrderNumber) -> impl Future<Output = Result<AccrualVerdict, AccrualError>> + Send;

    /// The maximum number of lookups made for a single order before reconciliation gives up.
    fn max_attempts(&self) -> u32;

    /// How long to wait between lookups.
    fn poll_interval(&self) -> Duration;

    fn request_timeout(&self) -> Duration;
}
