//! Unified error type for the server binary.

use quizwire_protocol::ProtocolError;
use quizwire_room::RoomError;
use quizwire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid quiz).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (unknown code, not joined).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// An I/O error from the HTTP health listener.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizwire_protocol::RoomCode;

    #[test]
    fn wraps_transport_error() {
        let err = TransportError::Accept("gone".into());
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Transport(_)));
        assert!(server_err.to_string().contains("gone"));
    }

    #[test]
    fn wraps_room_error() {
        let err = RoomError::NotFound(RoomCode("ABC123".into()));
        let server_err: ServerError = err.into();
        assert!(matches!(server_err, ServerError::Room(_)));
        assert!(server_err.to_string().contains("ABC123"));
    }
}
