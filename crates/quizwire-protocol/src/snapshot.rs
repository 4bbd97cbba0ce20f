//! The room snapshot: the single outward view of a room's state.
//!
//! Every observable mutation (join, phase transition, countdown tick)
//! produces one immutable [`RoomSnapshot`] that is sent unchanged to every
//! member connection. The only redaction is the correctness-hiding rule:
//! the correct choice index appears solely inside [`ResultsView`], which
//! is populated only during the results phase.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{PlayerId, RoomCode};
use crate::quiz::CHOICE_COUNT;

/// The state-machine position of a room.
///
/// Transitions are strictly ordered:
/// lobby → question → results → (question | leaderboard) → ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lobby,
    Question,
    Results,
    Leaderboard,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lobby => "lobby",
            Self::Question => "question",
            Self::Results => "results",
            Self::Leaderboard => "leaderboard",
            Self::Ended => "ended",
        };
        write!(f, "{s}")
    }
}

/// The public view of one player, as shown in rosters and leaderboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPublic {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub connected: bool,
    /// Whether the player has answered the in-flight question.
    pub answered: bool,
}

/// The in-flight question with its correct answer stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: u32,
    pub title: String,
    pub choices: [String; CHOICE_COUNT],
    /// Absolute deadline in epoch milliseconds. Clients render the
    /// countdown from this, never from a relative duration.
    pub ends_at: u64,
}

/// Answer tally for a finished question. Only present in `results`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    /// Votes per choice. Sums to the number of players who answered
    /// before the deadline.
    pub counts: [u32; CHOICE_COUNT],
    pub correct_index: u8,
}

/// The complete, redaction-applied view of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub phase: Phase,
    pub quiz_title: String,
    /// −1 before the first question starts.
    pub current_index: i64,
    /// Present only while phase is `question` or `results`.
    pub question: Option<QuestionView>,
    /// Present only while phase is `results`.
    pub results: Option<ResultsView>,
    pub players: Vec<PlayerPublic>,
    /// Roster sorted by score descending, ties broken by join order.
    pub leaderboard: Vec<PlayerPublic>,
}
