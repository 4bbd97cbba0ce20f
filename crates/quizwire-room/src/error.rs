//! Error types for the room layer.

use quizwire_protocol::{ProtocolError, RoomCode};
use quizwire_transport::ConnectionId;

/// Errors that can occur during room operations.
///
/// These surface to the offending client as an `error` message; none of
/// them is fatal to the directory or the process.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room exists under this code.
    #[error("unknown room code {0}")]
    NotFound(RoomCode),

    /// The connection has not joined any room and the message carried
    /// no room code to resolve one.
    #[error("not joined")]
    NotJoined(ConnectionId),

    /// The connection already belongs to a room.
    #[error("already joined a room")]
    AlreadyJoined(ConnectionId),

    /// The room's command channel is closed (actor gone).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),

    /// Rejection sampling could not find a free code. Practically
    /// unreachable given the alphabet size.
    #[error("room code space exhausted")]
    CodesExhausted,

    /// The supplied quiz definition failed validation.
    #[error(transparent)]
    Quiz(#[from] ProtocolError),
}
