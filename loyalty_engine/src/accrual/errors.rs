use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccrualError {
    #[error("Could not initialize the accrual client: {0}")]
    Initialization(String),
    #[error("Request to the accrual service failed: {0}")]
    RequestFailed(String),
    #[error("The accrual service did not respond in time")]
    Timeout,
    #[error("The accrual service has no record of the order yet")]
    NotRegistered,
    #[error("The accrual service responded with status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("Could not understand the accrual service response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for AccrualError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AccrualError::Timeout
        } else {
            AccrualError::RequestFailed(e.to_string())
        }
    }
}
