//! crates/inspection_core/src/accounts.rs
//!
//! Registration and login.

use std::sync::Arc;
use tracing::{error, info};

use crate::credentials::{hash_password, verify_password};
use crate::domain::{Identity, Role, User};
use crate::error::{AuthError, ServiceError, ServiceResult, ValidationError};
use crate::ports::{DatabaseService, PortError};
use crate::token::TokenService;

/// A successful login: a freshly minted token and who it belongs to.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

pub struct AccountService {
    db: Arc<dyn DatabaseService>,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(db: Arc<dyn DatabaseService>, tokens: Arc<TokenService>) -> Self {
        Self { db, tokens }
    }

    /// Creates a new account. The role is always `user`.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ServiceResult<User> {
        require("name", name)?;
        require("email", email)?;
        require("password", password)?;

        match self.db.get_user_by_email(email).await {
            Ok(_) => return Err(email_taken()),
            Err(PortError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = hash_password(password).map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ServiceError::Store("password hashing failed".to_string())
        })?;

        // A concurrent registration can still win the race; the store's unique
        // constraint reports it as a conflict.
        let user = self
            .db
            .create_user(name, email, &password_hash, Role::User)
            .await
            .map_err(|e| match e {
                PortError::Conflict(_) => email_taken(),
                other => other.into(),
            })?;

        info!(user_id = %user.id, "Registered new user");
        Ok(user)
    }

    /// Checks the password and mints a token carrying the stored role.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let credentials = self.db.get_user_by_email(email).await?;

        if !verify_password(password, &credentials.password_hash) {
            return Err(AuthError::PasswordMismatch.into());
        }

        let user = credentials.user;
        let token = self
            .tokens
            .issue(&Identity {
                user_id: user.id,
                email: user.email.clone(),
                role: user.role,
            })
            .map_err(|e| ServiceError::Store(format!("failed to sign token: {}", e)))?;

        info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok(LoginOutcome { token, user })
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

fn email_taken() -> ServiceError {
    ServiceError::Conflict("email is already registered".to_string())
}
