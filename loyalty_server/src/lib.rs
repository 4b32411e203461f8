//! # Loyalty points server
//! This crate hosts the HTTP front end of the loyalty points system. It is responsible for:
//! * Accepting order numbers uploaded by users, and handing them to the reconciler in the loyalty engine.
//! * Reporting order statuses, balances and withdrawal history.
//! * Withdrawing points from a user's balance.
//!
//! Users are authenticated upstream. The authenticated user id arrives in the `X-User-Id` header.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /api/user/orders`: Upload an order number (plain text body).
//! * `GET /api/user/orders`: The user's orders, most recent first.
//! * `GET /api/user/balance`: The user's current and withdrawn points.
//! * `POST /api/user/balance/withdraw`: Withdraw points against an order reference.
//! * `GET /api/user/withdrawals`: The user's withdrawals, most recent first.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod hooks;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
