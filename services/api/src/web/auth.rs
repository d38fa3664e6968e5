//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user registration and login.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use utoipa::ToSchema;

use crate::web::{
    error::{HttpError, MessageResponse},
    state::AppState,
};

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Absent fields deserialize as empty strings and are rejected by validation.
/// Any `role` sent by the client is ignored.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created successfully", body = MessageResponse),
        (status = 400, description = "Missing field or email already registered", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, HttpError> {
    state
        .accounts
        .register(&req.name, &req.email, &req.password)
        .await?;
    Ok(Json(MessageResponse::new("Registration successful")))
}

/// POST /api/auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Wrong password", body = MessageResponse),
        (status = 404, description = "Unknown email", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    let outcome = state.accounts.login(&req.email, &req.password).await?;
    let user = outcome.user;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: outcome.token,
        user: UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
        },
    }))
}
