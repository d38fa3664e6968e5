//! crates/inspection_core/src/error.rs
//!
//! The error taxonomy every public core operation reports in. Nothing below
//! this layer (driver errors, hashing errors) escapes except through these types.

use crate::ports::PortError;

/// Failures while validating a session token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("no token supplied")]
    Missing,
    #[error("token is malformed, forged or expired")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("no credential")]
    NoCredential,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("access denied")]
    Forbidden,
    #[error("password mismatch")]
    PasswordMismatch,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => AuthError::NoCredential,
            TokenError::Invalid => AuthError::InvalidCredential,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field '{0}' is required")]
    MissingField(&'static str),
    #[error("status '{0}' is not allowed")]
    BadStatus(String),
    #[error("request body is malformed")]
    MalformedBody,
}

/// The primary error type for the core services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Currently only raised for an email that is already registered.
    #[error("{0}")]
    Conflict(String),

    /// Any failure of the underlying store. Never retried.
    #[error("store error: {0}")]
    Store(String),
}

impl From<PortError> for ServiceError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => ServiceError::NotFound(what),
            PortError::Conflict(what) => ServiceError::Conflict(what),
            PortError::Unexpected(msg) => ServiceError::Store(msg),
        }
    }
}

/// A convenience type alias for `Result<T, ServiceError>`.
pub type ServiceResult<T> = Result<T, ServiceError>;
