//! crates/inspection_core/src/identity.rs
//!
//! Recovers who is calling. Two trust models, kept as two functions:
//! `identity_from_request` trusts the role baked into the token, while
//! `current_role` always goes back to the user store.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Identity, Role};
use crate::error::{AuthError, ServiceResult};
use crate::ports::{DatabaseService, PortError};
use crate::token::TokenService;

pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    db: Arc<dyn DatabaseService>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, db: Arc<dyn DatabaseService>) -> Self {
        Self { tokens, db }
    }

    /// Resolves the caller from the raw `Authorization` header value.
    ///
    /// No header at all is `NoCredential`. A header whose second word is missing
    /// or is not a valid token is `InvalidCredential`.
    pub fn identity_from_request(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let header = authorization.ok_or(AuthError::NoCredential)?;
        let token = header
            .split(' ')
            .nth(1)
            .ok_or(AuthError::InvalidCredential)?;
        let claims = self.tokens.validate(Some(token))?;
        Ok(claims.into())
    }

    /// Re-reads the caller's role from the store. `NotFound` if the user is gone.
    pub async fn current_role(&self, user_id: Uuid) -> ServiceResult<Role> {
        Ok(self.db.get_user_role(user_id).await?)
    }

    /// Like `current_role`, but a vanished user resolves to `None` instead of an error.
    pub async fn current_role_if_known(&self, user_id: Uuid) -> ServiceResult<Option<Role>> {
        match self.db.get_user_role(user_id).await {
            Ok(role) => Ok(Some(role)),
            Err(PortError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
