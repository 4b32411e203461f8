//! Identifies the caller of a request.
//!
//! Authentication happens upstream of this server. The upstream layer passes the authenticated user's id in the
//! `X-User-Id` header, and handlers receive it by taking an [`AuthenticatedUser`] argument.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use log::*;
use loyalty_engine::db_types::UserId;

use crate::errors::{AuthError, ServerError};

pub const USER_ID_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn id(&self) -> UserId {
        self.0
    }

    fn from_headers(req: &HttpRequest) -> Result<Self, AuthError> {
        let value = req.headers().get(USER_ID_HEADER).ok_or(AuthError::MissingUserId)?;
        let value = value.to_str().map_err(|e| AuthError::InvalidUserId(e.to_string()))?;
        let id = value.parse::<UserId>().map_err(|e| AuthError::InvalidUserId(format!("{value}: {e}")))?;
        Ok(Self(id))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = Self::from_headers(req).map_err(|e| {
            debug!("💻️ Rejecting request to {}. {e}", req.path());
            ServerError::from(e)
        });
        ready(result)
    }
}
