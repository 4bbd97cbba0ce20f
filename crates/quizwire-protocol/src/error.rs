//! Error types for the protocol layer.

/// Errors that can occur while encoding, decoding, or validating
/// protocol data.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The payload was unparsable or matched no known message shape.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// A quiz definition violated a structural rule (zero duration,
    /// out-of-range correct index, duplicate question id).
    #[error("invalid quiz: {0}")]
    InvalidQuiz(String),
}
