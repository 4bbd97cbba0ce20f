//! Room engine and rooms directory for Quizwire.
//!
//! Each room runs as an isolated Tokio task (actor model) owning one
//! quiz session: its phase, roster, answers, and timers. The outside
//! world talks to a room only through its [`RoomHandle`] command channel,
//! so a room's state is mutated by exactly one logical sequence of events
//! and one room's failure or timer never touches another.
//!
//! # Key types
//!
//! - [`QuizSession`] — the pure phase/scoring state machine
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomsDirectory`] — create rooms, route messages, delete empty rooms
//! - [`MemberSender`] — per-connection outbound channel for snapshots

mod directory;
mod error;
mod ids;
mod room;
mod session;

pub use directory::RoomsDirectory;
pub use error::RoomError;
pub use ids::{make_code, make_player_id};
pub use room::{HostAction, MemberSender, RoomHandle};
pub use session::{JoinOutcome, JoinResolution, Player, QuizSession, POINTS_PER_CORRECT};
