//! crates/inspection_core/src/presence.rs
//!
//! Tracks which user is online on which live connection.
//!
//! The user id is whatever the client claims in its `join` event; nothing ties
//! it to an authenticated identity.

use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Maps a claimed user id to the connection it joined on. `C` is the handle
/// the transport uses to identify (and reach) a connection.
pub struct PresenceTracker<C> {
    online: Mutex<HashMap<String, C>>,
}

impl<C> Default for PresenceTracker<C> {
    fn default() -> Self {
        Self {
            online: Mutex::new(HashMap::new()),
        }
    }
}

impl<C> PresenceTracker<C>
where
    C: Clone + PartialEq + Send,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `user_id` as online on `connection`, replacing any earlier connection.
    pub async fn join(&self, user_id: &str, connection: C) {
        let mut online = self.online.lock().await;
        if online.insert(user_id.to_string(), connection).is_some() {
            debug!(user_id, "User re-joined on a new connection");
        }
        info!(user_id, "User joined");
    }

    /// Forgets every user currently mapped to `connection`.
    pub async fn on_disconnect(&self, connection: &C) {
        let mut online = self.online.lock().await;
        online.retain(|user_id, conn| {
            let keep = conn != connection;
            if !keep {
                info!(user_id = user_id.as_str(), "User went offline");
            }
            keep
        });
    }

    /// The connection `user_id` is currently reachable on, if any.
    pub async fn lookup(&self, user_id: &str) -> Option<C> {
        self.online.lock().await.get(user_id).cloned()
    }

    pub async fn online_count(&self) -> usize {
        self.online.lock().await.len()
    }
}
