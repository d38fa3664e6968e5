//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the handle for a live presence connection.

use crate::config::Config;
use crate::web::protocol::ServerMessage;
use inspection_core::{
    AccountService, DatabaseService, DocumentStore, IdentityResolver, PresenceTracker,
    SubmissionService, TokenService,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub accounts: Arc<AccountService>,
    pub resolver: Arc<IdentityResolver>,
    pub submissions: Arc<SubmissionService>,
    pub presence: Arc<PresenceTracker<ConnectionHandle>>,
}

impl AppState {
    /// Wires the core services on top of the given store and document storage.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes()));
        let resolver = Arc::new(IdentityResolver::new(tokens.clone(), db.clone()));
        Self {
            accounts: Arc::new(AccountService::new(db.clone(), tokens)),
            submissions: Arc::new(SubmissionService::new(db, documents, resolver.clone())),
            resolver,
            presence: Arc::new(PresenceTracker::new()),
            config,
        }
    }
}

//=========================================================================================
// ConnectionHandle (Specific to One WebSocket Connection)
//=========================================================================================

/// Identifies one presence connection and lets other tasks push messages to it.
/// Two handles are equal when they refer to the same connection.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    pub id: Uuid,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl ConnectionHandle {
    pub fn new(sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
        }
    }

    /// Queues a message for the connection. Returns `false` once it has closed.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.sender.send(message).is_ok()
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
