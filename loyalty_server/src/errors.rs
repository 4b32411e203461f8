use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use loyalty_engine::{BalanceApiError, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error. {0}")]
    CouldNotDeserializePayload(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    InvalidOrderNumber(String),
    #[error("{0}")]
    OrderConflict(String),
    #[error("{0}")]
    InvalidWithdrawal(String),
    #[error("{0}")]
    InsufficientFunds(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidOrderNumber(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidWithdrawal(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OrderConflict(_) => StatusCode::CONFLICT,
            Self::InsufficientFunds(_) => StatusCode::PAYMENT_REQUIRED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("The X-User-Id header is missing.")]
    MissingUserId,
    #[error("The X-User-Id header is not a valid user id. {0}")]
    InvalidUserId(String),
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::InvalidOrderNumber(_) => Self::InvalidOrderNumber(e.to_string()),
            OrderFlowError::OrderBelongsToAnotherUser(_) => Self::OrderConflict(e.to_string()),
            OrderFlowError::AccountNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderFlowError::DatabaseError(s) => {
                error!("📦️ Order flow database error. {s}");
                Self::BackendError(format!("Database error: {s}"))
            },
        }
    }
}

impl From<BalanceApiError> for ServerError {
    fn from(e: BalanceApiError) -> Self {
        match e {
            BalanceApiError::AccountNotFound(_) => Self::NoRecordFound(e.to_string()),
            BalanceApiError::InsufficientFunds { .. } => Self::InsufficientFunds(e.to_string()),
            BalanceApiError::InvalidAmount(_) | BalanceApiError::InvalidReference => {
                Self::InvalidWithdrawal(e.to_string())
            },
            BalanceApiError::DatabaseError(s) => {
                error!("💰️ Ledger database error. {s}");
                Self::BackendError(format!("Database error: {s}"))
            },
        }
    }
}
