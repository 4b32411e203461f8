use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use crate::{
    accrual::{AccrualError, AccrualOracle, AccrualVerdict},
    db_types::{OrderNumber, OrderStatusType, Points},
};

#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Status(OrderStatusType),
    Processed(Points),
    Error(AccrualError),
    /// Never answers. The caller's timeout has to deal with it.
    Hang,
}

/// An in-process stand-in for the accrual service. Responses are served in the order they were scripted. Once the
/// script runs out, the fallback response is repeated forever.
///
/// The same script is shared by every order, and by every clone of the oracle.
#[derive(Debug, Clone)]
pub struct ScriptedOracle {
    script: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    fallback: ScriptedResponse,
    calls: Arc<AtomicU32>,
    max_attempts: u32,
    poll_interval: Duration,
    request_timeout: Duration,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        Self::new(ScriptedResponse::Status(OrderStatusType::New))
    }
}

impl ScriptedOracle {
    pub fn new(fallback: ScriptedResponse) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            calls: Arc::new(AtomicU32::new(0)),
            max_attempts: 10,
            poll_interval: Duration::from_millis(5),
            request_timeout: Duration::from_millis(100),
        }
    }

    /// An oracle that can never be reached.
    pub fn unreachable() -> Self {
        Self::new(ScriptedResponse::Error(AccrualError::RequestFailed("connection refused".into())))
    }

    pub fn then(self, response: ScriptedResponse) -> Self {
        self.script.lock().expect("script lock poisoned").push_back(response);
        self
    }

    pub fn then_status(self, status: OrderStatusType) -> Self {
        self.then(ScriptedResponse::Status(status))
    }

    pub fn then_processed(self, accrual: Points) -> Self {
        self.then(ScriptedResponse::Processed(accrual))
    }

    pub fn then_error(self) -> Self {
        self.then(ScriptedResponse::Error(AccrualError::UnexpectedStatus { status: 500, message: "oops".into() }))
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

    /// The number of lookups made so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> ScriptedResponse {
        let mut script = self.script.lock().expect("script lock poisoned");
        script.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

impl AccrualOracle for ScriptedOracle {
    async fn lookup(&self, number: &OrderNumber) -> Result<AccrualVerdict, AccrualError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_response() {
            ScriptedResponse::Status(status) => Ok(AccrualVerdict::new(number, status)),
            ScriptedResponse::Processed(accrual) => Ok(AccrualVerdict::processed(number, accrual)),
            ScriptedResponse::Error(e) => Err(e),
            ScriptedResponse::Hang => std::future::pending().await,
        }
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
