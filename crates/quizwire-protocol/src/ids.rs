//! Identity newtypes shared across the wire protocol.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable, opaque player identity within one room.
///
/// Issued by the server on first join and echoed back by clients on
/// reconnect. The inner string is a UUID in practice, but the protocol
/// treats it as opaque — clients may only store and replay it.
///
/// `#[serde(transparent)]` makes this serialize as a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A human-typeable room code, the unique key of one quiz session.
///
/// Six characters drawn from an alphabet without easily-confused glyphs
/// (no `I`, `O`, or `0`). Generated by the rooms directory; clients carry
/// it on every message after joining.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Allows `HashMap<RoomCode, _>` lookups by `&str`.
impl Borrow<str> for RoomCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId("abc-123".into())).unwrap();
        assert_eq!(json, "\"abc-123\"");
    }

    #[test]
    fn player_id_deserializes_from_plain_string() {
        let id: PlayerId = serde_json::from_str("\"abc-123\"").unwrap();
        assert_eq!(id, PlayerId("abc-123".into()));
    }

    #[test]
    fn room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode("ABC123".into())).unwrap();
        assert_eq!(json, "\"ABC123\"");
    }

    #[test]
    fn room_code_works_as_map_key_by_str() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(RoomCode("ABC123".into()), 1);
        assert!(map.contains_key("ABC123"));
        assert!(!map.contains_key("XYZ789"));
    }
}
