use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{Client, StatusCode};

use crate::{
    accrual::{decode_verdict, AccrualConfig, AccrualError, AccrualOracle, AccrualVerdict},
    db_types::OrderNumber,
};

/// HTTP client for the accrual service.
#[derive(Clone)]
pub struct AccrualClient {
    config: AccrualConfig,
    client: Arc<Client>,
}

impl AccrualClient {
    pub fn new(config: AccrualConfig) -> Result<Self, AccrualError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AccrualError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &AccrualConfig {
        &self.config
    }

    pub fn url(&self, number: &OrderNumber) -> String {
        format!("{}/api/orders/{}", self.config.base_url.trim_end_matches('/'), number.as_str())
    }

    async fn fetch_verdict(&self, number: &OrderNumber) -> Result<AccrualVerdict, AccrualError> {
        let url = self.url(number);
        trace!("🔮️ Querying {url}");
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::OK => {
                let body = response.bytes().await?;
                let verdict = decode_verdict(number, &body)?;
                trace!("🔮️ Order {number} is {} according to the accrual service", verdict.status);
                Ok(verdict)
            },
            StatusCode::NO_CONTENT => Err(AccrualError::NotRegistered),
            status => {
                let message = response.text().await.unwrap_or_default();
                Err(AccrualError::UnexpectedStatus { status: status.as_u16(), message })
            },
        }
    }
}

impl AccrualOracle for AccrualClient {
    async fn lookup(&self, number: &OrderNumber) -> Result<AccrualVerdict, AccrualError> {
        // reqwest already enforces the timeout, but reading the body is covered here too
        match tokio::time::timeout(self.config.request_timeout, self.fetch_verdict(number)).await {
            Ok(result) => result,
            Err(_) => Err(AccrualError::Timeout),
        }
    }

    fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    fn request_timeout(&self) -> Duration {
        self.config.request_timeout
    }
}
