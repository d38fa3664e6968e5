//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::web::{error::HttpError, state::AppState};

/// Middleware that validates the bearer token and extracts the caller's identity.
///
/// If valid, inserts the `Identity` into request extensions for handlers to use.
/// A missing header yields 401; a malformed, forged or expired token yields 403.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match state.resolver.identity_from_request(authorization) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => {
            debug!("Rejected request credential: {}", e);
            HttpError::from(e).into_response()
        }
    }
}
