//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol of the presence channel.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Announces that `user_id` is online on this connection. Usually sent right
    /// after login. The claimed id is not checked against any token.
    Join { user_id: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms that the connection is now tracked for `user_id`.
    Joined { user_id: String },

    /// An expert changed the status of one of the user's submissions.
    StatusChanged { submission_id: Uuid, status: String },

    /// Reports a malformed client message.
    Error { message: String },
}
