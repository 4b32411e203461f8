use std::time::Duration;

use log::*;
use lps_common::helpers::{parse_env, parse_env_millis};

const DEFAULT_ACCRUAL_URL: &str = "http://localhost:8888";
const DEFAULT_MAX_ATTEMPTS: u32 = 100;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone)]
pub struct AccrualConfig {
    pub base_url: String,
    pub max_attempts: u32,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ACCRUAL_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AccrualConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let base_url = std::env::var("LPS_ACCRUAL_URL").unwrap_or_else(|_| {
            warn!("🪛️ LPS_ACCRUAL_URL is not set. Using {DEFAULT_ACCRUAL_URL}");
            defaults.base_url.clone()
        });
        let max_attempts = match parse_env::<u32>("LPS_ACCRUAL_MAX_ATTEMPTS") {
            Some(Ok(0)) => {
                warn!("🪛️ LPS_ACCRUAL_MAX_ATTEMPTS must be at least 1. Using {DEFAULT_MAX_ATTEMPTS}");
                defaults.max_attempts
            },
            Some(Ok(n)) => n,
            Some(Err(e)) => {
                warn!("🪛️ {e}. Using {DEFAULT_MAX_ATTEMPTS}");
                defaults.max_attempts
            },
            None => defaults.max_attempts,
        };
        let poll_interval = match parse_env_millis("LPS_ACCRUAL_POLL_INTERVAL_MS") {
            Some(Ok(d)) => d,
            Some(Err(e)) => {
                warn!("🪛️ {e}. Using {}ms", DEFAULT_POLL_INTERVAL.as_millis());
                defaults.poll_interval
            },
            None => defaults.poll_interval,
        };
        let request_timeout = match parse_env_millis("LPS_ACCRUAL_REQUEST_TIMEOUT_MS") {
            Some(Ok(d)) if !d.is_zero() => d,
            Some(Ok(_)) => {
                warn!("🪛️ LPS_ACCRUAL_REQUEST_TIMEOUT_MS cannot be zero. Using {}ms", DEFAULT_REQUEST_TIMEOUT.as_millis());
                defaults.request_timeout
            },
            Some(Err(e)) => {
                warn!("🪛️ {e}. Using {}ms", DEFAULT_REQUEST_TIMEOUT.as_millis());
                defaults.request_timeout
            },
            None => defaults.request_timeout,
        };
        Self { base_url, max_attempts, poll_interval, request_timeout }
    }
}
