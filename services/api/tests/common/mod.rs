//! Shared fixtures: an app wired to the in-memory store and a temporary upload dir.

#![allow(dead_code)]

use api_lib::{
    adapters::{InMemoryDb, LocalUploadStore},
    config::{Config, StoreKind},
    web::state::AppState,
};
use inspection_core::{Equipment, Identity, Role, SubmissionFields};
use std::sync::Arc;
use tempfile::TempDir;

pub const SECRET: &str = "test-secret";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub db: Arc<InMemoryDb>,
    pub uploads: Arc<LocalUploadStore>,
    _tmp: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let config = Arc::new(Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            store: StoreKind::Memory,
            jwt_secret: SECRET.to_string(),
            log_level: tracing::Level::INFO,
            upload_dir: tmp.path().join("uploads"),
            cors_origin: "http://localhost:3000".to_string(),
        });
        let db = Arc::new(InMemoryDb::new());
        let uploads = Arc::new(LocalUploadStore::create(config.upload_dir.clone()).await.unwrap());
        let state = Arc::new(AppState::new(config, db.clone(), uploads.clone()));
        Self {
            state,
            db,
            uploads,
            _tmp: tmp,
        }
    }

    /// Registers a user and returns the identity a fresh login would yield.
    pub async fn user(&self, name: &str) -> Identity {
        let email = format!("{}@example.com", name.to_lowercase());
        let user = self
            .state
            .accounts
            .register(name, &email, "password")
            .await
            .unwrap();
        Identity {
            user_id: user.id,
            email: user.email,
            role: user.role,
        }
    }

    /// Registers a user and promotes them to expert directly in the store.
    pub async fn ahli(&self, name: &str) -> Identity {
        let mut identity = self.user(name).await;
        self.db.set_role(identity.user_id, Role::Ahli).await.unwrap();
        identity.role = Role::Ahli;
        identity
    }

    /// Logs in and returns the bearer token.
    pub async fn token_for(&self, identity: &Identity) -> String {
        self.state
            .accounts
            .login(&identity.email, "password")
            .await
            .unwrap()
            .token
    }
}

pub fn fields(company: &str) -> SubmissionFields {
    SubmissionFields {
        service_type: "riksa uji".to_string(),
        company_name: company.to_string(),
        details: "periodic inspection".to_string(),
        equipment: Equipment {
            kind: "crane".to_string(),
            brand: "Tadano".to_string(),
            model: "GR-500".to_string(),
            serial: "TD-9981".to_string(),
            capacity: "50 ton".to_string(),
        },
        inspection_location: "Cilegon".to_string(),
    }
}
