//! services/api/src/web/error.rs
//!
//! Turns core service errors into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use inspection_core::{AuthError, ServiceError, ValidationError};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The JSON body of every error response (and of plain acknowledgements).
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Wraps a `ServiceError` so it can be returned from an axum handler.
#[derive(Debug)]
pub struct HttpError(pub ServiceError);

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        HttpError(err)
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        HttpError(err.into())
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        HttpError(err.into())
    }
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Auth(AuthError::NoCredential) => StatusCode::UNAUTHORIZED,
            ServiceError::Auth(AuthError::PasswordMismatch) => StatusCode::UNAUTHORIZED,
            ServiceError::Auth(AuthError::InvalidCredential) => StatusCode::FORBIDDEN,
            ServiceError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            ServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            ServiceError::Store(detail) => {
                error!("Store failure: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}
