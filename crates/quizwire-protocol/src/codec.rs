//! JSON text codec for the wire protocol.
//!
//! The browser clients speak JSON over WebSocket text frames, so the
//! codec works on `str`/`String` rather than byte buffers.

use crate::{ClientMessage, ProtocolError, ServerMessage};

/// Parses an inbound text frame into a [`ClientMessage`].
///
/// # Errors
/// Returns [`ProtocolError::Decode`] for unparsable JSON or a
/// structurally valid object whose `type`/fields match no known shape.
pub fn decode_client(text: &str) -> Result<ClientMessage, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

/// Serializes an outbound [`ServerMessage`] to a JSON text frame.
///
/// # Errors
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_server(msg: &ServerMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(ProtocolError::Encode)
}
