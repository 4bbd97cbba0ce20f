//! Room code and player id generation.

use quizwire_protocol::{PlayerId, RoomCode};
use rand::Rng;

use crate::RoomError;

/// Code alphabet without easily-confused glyphs (`I`, `O`, `0`).
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ123456789";

/// Length of a generated room code.
const CODE_LEN: usize = 6;

/// Cap on rejection-sampling attempts before giving up. With 33^6
/// possible codes this only trips if nearly the whole space is in use.
const MAX_ATTEMPTS: usize = 10_000;

/// Generates a room code not currently in use, by rejection sampling.
///
/// `in_use` is consulted for each candidate; the first free code wins.
///
/// # Errors
/// Returns [`RoomError::CodesExhausted`] if no free code is found within
/// the attempt cap.
pub fn make_code(in_use: impl Fn(&str) -> bool) -> Result<RoomCode, RoomError> {
    let mut rng = rand::rng();
    for _ in 0..MAX_ATTEMPTS {
        let code: String = (0..CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        if !in_use(&code) {
            return Ok(RoomCode(code));
        }
    }
    Err(RoomError::CodesExhausted)
}

/// Generates a fresh globally-unique player id.
pub fn make_player_id() -> PlayerId {
    PlayerId(uuid::Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_expected_length_and_alphabet() {
        let code = make_code(|_| false).unwrap();
        assert_eq!(code.as_str().len(), CODE_LEN);
        assert!(
            code.as_str()
                .bytes()
                .all(|b| CODE_ALPHABET.contains(&b)),
            "unexpected character in {code}"
        );
    }

    #[test]
    fn code_avoids_in_use_values() {
        // Reject every code starting with 'A'..'M' — sampling must still
        // land on something from the remaining half of the space.
        let code = make_code(|c| c.as_bytes()[0] < b'N').unwrap();
        assert!(code.as_str().as_bytes()[0] >= b'N');
    }

    #[test]
    fn exhausted_space_reports_error() {
        let result = make_code(|_| true);
        assert!(matches!(result, Err(RoomError::CodesExhausted)));
    }

    #[test]
    fn player_ids_are_unique() {
        let a = make_player_id();
        let b = make_player_id();
        assert_ne!(a, b);
    }
}
