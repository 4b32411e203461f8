//! # Loyalty engine public API
//!
//! The request handlers of the server talk to the engine exclusively through these APIs.
//!
//! * [`order_flow_api`] validates and deduplicates submitted order numbers, stores new orders, and hands them to the
//!   [`crate::Reconciler`]. It also lists a user's orders.
//! * [`balance_api`] reports balances, processes withdrawals, and lists past withdrawals.
//!
//! Every call takes the id of the user it acts for explicitly. Authenticating that user is the caller's job.
//!
//! ```rust,ignore
//! use loyalty_engine::{accrual::AccrualClient, events::EventProducers, OrderFlowApi, Reconciler, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/loyalty.db", 10).await?;
//! let oracle = AccrualClient::new(AccrualConfig::from_env_or_default())?;
//! let reconciler = Reconciler::new(db.clone(), oracle, EventProducers::default());
//! let api = OrderFlowApi::new(db, reconciler);
//! let result = api.submit_order(UserId(1), "79927398713").await?;
//! ```
pub mod balance_api;
pub mod errors;
pub mod order_flow_api;
