//! Wire protocol for Quizwire.
//!
//! This crate defines the "language" that the host app, the player app,
//! and the server speak:
//!
//! - **Ids** ([`PlayerId`], [`RoomCode`]) — stable identities on the wire.
//! - **Quiz** ([`QuizDefinition`], [`QuizQuestion`]) — the immutable quiz
//!   supplied by the host at room creation.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — every JSON
//!   object that travels over a connection, tagged by a `type` field.
//! - **Snapshot** ([`RoomSnapshot`]) — the full redaction-applied room
//!   view broadcast to all members.
//! - **Codec** ([`decode_client`], [`encode_server`]) — JSON text
//!   conversion with [`ProtocolError`] on failure.
//!
//! The protocol layer knows nothing about connections, timers, or rooms —
//! it only defines shapes and how to (de)serialize them.

mod codec;
mod error;
mod ids;
mod message;
mod quiz;
mod snapshot;

pub use codec::{decode_client, encode_server};
pub use error::ProtocolError;
pub use ids::{PlayerId, RoomCode};
pub use message::{ClientMessage, JoinRequest, JoinedReply, ServerMessage};
pub use quiz::{CHOICE_COUNT, QuizDefinition, QuizQuestion};
pub use snapshot::{Phase, PlayerPublic, QuestionView, ResultsView, RoomSnapshot};
