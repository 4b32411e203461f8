//! Server configuration
//!
//! All settings are read from `LPS_*` environment variables (see `cli-help.txt`). Unset variables fall back to their
//! defaults, and invalid values are logged and replaced by the default, so the server always starts.
use std::{env, str::FromStr};

use log::*;
use loyalty_engine::accrual::AccrualConfig;
use lps_common::helpers::{parse_boolean_flag, parse_env};

const DEFAULT_LPS_HOST: &str = "127.0.0.1";
const DEFAULT_LPS_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/loyalty.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Apply the embedded database migrations before accepting requests.
    pub run_migrations: bool,
    /// Relaunch reconciliation for orders that were still `NEW` or `PROCESSING` when the server last stopped.
    pub resume_pending_orders: bool,
    pub accrual: AccrualConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LPS_HOST.to_string(),
            port: DEFAULT_LPS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
            resume_pending_orders: true,
            accrual: AccrualConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("LPS_HOST").ok().unwrap_or_else(|| DEFAULT_LPS_HOST.into());
        let port = env_or_default("LPS_PORT", DEFAULT_LPS_PORT);
        let database_url = env::var("LPS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ LPS_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let database_max_connections = match env_or_default("LPS_DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS) {
            0 => {
                warn!("🪛️ LPS_DATABASE_MAX_CONNECTIONS must be at least 1. Using {DEFAULT_MAX_CONNECTIONS}");
                DEFAULT_MAX_CONNECTIONS
            },
            n => n,
        };
        let run_migrations = parse_boolean_flag(env::var("LPS_RUN_MIGRATIONS").ok(), true);
        let resume_pending_orders = parse_boolean_flag(env::var("LPS_RESUME_PENDING_ORDERS").ok(), true);
        let accrual = AccrualConfig::from_env_or_default();
        Self { host, port, database_url, database_max_connections, run_migrations, resume_pending_orders, accrual }
    }
}

fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match parse_env::<T>(name) {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            error!("🪛️ {e} Using the default, {default}, instead.");
            default
        },
        None => default,
    }
}
