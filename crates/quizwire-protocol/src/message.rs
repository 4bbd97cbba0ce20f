//! Client and server message envelopes.
//!
//! Every message on the wire is a single self-describing JSON object
//! tagged by a `type` field. `join` and `joined` carry a second `role`
//! tag distinguishing the host and player variants, matching what the
//! browser clients send and expect.

use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, RoomCode};
use crate::quiz::QuizDefinition;
use crate::snapshot::RoomSnapshot;

/// The two halves of a `join` message, tagged by `role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum JoinRequest {
    /// A host supplies a full quiz; the server creates a room and
    /// replies with the assigned code.
    #[serde(rename = "host")]
    Host { quiz: QuizDefinition },

    /// A player joins an existing room by code. `player_id` is present
    /// on reconnect, absent on first join.
    #[serde(rename = "player", rename_all = "camelCase")]
    Player {
        quiz_code: RoomCode,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
}

/// Everything a client can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join")]
    Join(JoinRequest),

    /// Out-of-band state refresh after a reconnect: the server marks the
    /// player connected and re-sends a snapshot.
    #[serde(rename = "sync", rename_all = "camelCase")]
    Sync {
        quiz_code: RoomCode,
        player_id: PlayerId,
    },

    #[serde(rename = "answer", rename_all = "camelCase")]
    Answer {
        quiz_code: RoomCode,
        player_id: PlayerId,
        question_id: u32,
        choice_index: u8,
    },

    #[serde(rename = "host:start", rename_all = "camelCase")]
    HostStart { quiz_code: RoomCode },

    #[serde(rename = "host:next", rename_all = "camelCase")]
    HostNext { quiz_code: RoomCode },

    #[serde(rename = "host:end", rename_all = "camelCase")]
    HostEnd { quiz_code: RoomCode },
}

impl ClientMessage {
    /// The room code carried on the message itself, used to resolve the
    /// owning room before the connection's membership is recorded.
    pub fn quiz_code(&self) -> Option<&RoomCode> {
        match self {
            Self::Join(JoinRequest::Host { .. }) => None,
            Self::Join(JoinRequest::Player { quiz_code, .. })
            | Self::Sync { quiz_code, .. }
            | Self::Answer { quiz_code, .. }
            | Self::HostStart { quiz_code }
            | Self::HostNext { quiz_code }
            | Self::HostEnd { quiz_code } => Some(quiz_code),
        }
    }
}

/// The two halves of a `joined` reply, tagged by `role`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum JoinedReply {
    #[serde(rename = "host", rename_all = "camelCase")]
    Host { quiz_code: RoomCode },

    /// Carries the resolved identity — on a reattach the returned name
    /// is the existing player's, not the one submitted.
    #[serde(rename = "player", rename_all = "camelCase")]
    Player {
        quiz_code: RoomCode,
        player_id: PlayerId,
        name: String,
    },
}

/// Everything the server can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "joined")]
    Joined(JoinedReply),

    #[serde(rename = "state")]
    State { state: RoomSnapshot },

    #[serde(rename = "error")]
    Error { message: String },
}
