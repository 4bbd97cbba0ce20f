//! The rooms directory: creation, routing, and teardown.
//!
//! One directory instance owns every live room handle and the mapping
//! from connections to the rooms they joined. All client traffic enters
//! through [`RoomsDirectory::dispatch`]; the connection layer never
//! touches a room directly.

use std::collections::HashMap;
use std::time::Duration;

use quizwire_protocol::{ClientMessage, JoinRequest, RoomCode};
use quizwire_transport::ConnectionId;
use tracing::info;

use crate::ids::make_code;
use crate::room::{spawn_room, HostAction, MemberSender, RoomHandle};
use crate::RoomError;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Registry of live rooms, keyed by code.
///
/// Rooms are created by a host `join`, found by code for player joins,
/// and deleted when their last member disconnects. Dropping the handle
/// here is what ends the room's actor task.
pub struct RoomsDirectory {
    rooms: HashMap<RoomCode, RoomHandle>,
    conn_rooms: HashMap<ConnectionId, RoomCode>,
    tick_interval: Duration,
}

impl RoomsDirectory {
    pub fn new() -> Self {
        Self::with_tick_interval(DEFAULT_TICK_INTERVAL)
    }

    /// Overrides the countdown broadcast interval for new rooms.
    pub fn with_tick_interval(tick_interval: Duration) -> Self {
        Self {
            rooms: HashMap::new(),
            conn_rooms: HashMap::new(),
            tick_interval,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    /// Routes one client message to the room it belongs to, creating a
    /// room for a host join.
    ///
    /// `sender` is the connection's outbound channel; join and sync
    /// register it with the room so snapshots reach the client.
    ///
    /// # Errors
    /// Routing failures (unknown code, no membership, double join,
    /// invalid quiz) come back as [`RoomError`]; the caller reports them
    /// to the offending client. In-room guard failures are not errors —
    /// the room ignores those silently.
    pub async fn dispatch(
        &mut self,
        conn: ConnectionId,
        sender: MemberSender,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        match msg {
            ClientMessage::Join(JoinRequest::Host { quiz }) => {
                if self.conn_rooms.contains_key(&conn) {
                    return Err(RoomError::AlreadyJoined(conn));
                }
                quiz.validate()?;
                let code = make_code(|c| self.rooms.contains_key(c))?;
                let handle = spawn_room(code.clone(), quiz, self.tick_interval);
                info!(room = %code, %conn, "room created");
                handle.join_host(conn, sender).await?;
                self.rooms.insert(code.clone(), handle);
                self.conn_rooms.insert(conn, code);
                Ok(())
            }
            ClientMessage::Join(JoinRequest::Player {
                quiz_code,
                name,
                player_id,
            }) => {
                if self.conn_rooms.contains_key(&conn) {
                    return Err(RoomError::AlreadyJoined(conn));
                }
                let handle = self
                    .rooms
                    .get(&quiz_code)
                    .ok_or_else(|| RoomError::NotFound(quiz_code.clone()))?;
                handle.join_player(conn, sender, name, player_id).await?;
                self.conn_rooms.insert(conn, quiz_code);
                Ok(())
            }
            ClientMessage::Sync {
                quiz_code,
                player_id,
            } => {
                let code = self.resolve(conn, &quiz_code)?;
                let handle = self.handle(&code)?;
                handle.sync(conn, sender, Some(player_id)).await?;
                self.conn_rooms.insert(conn, code);
                Ok(())
            }
            ClientMessage::Answer {
                quiz_code,
                player_id,
                question_id,
                choice_index,
            } => {
                let code = self.resolve(conn, &quiz_code)?;
                self.handle(&code)?
                    .answer(conn, Some(player_id), question_id, choice_index)
                    .await
            }
            ClientMessage::HostStart { quiz_code } => {
                let code = self.resolve(conn, &quiz_code)?;
                self.handle(&code)?.host(conn, HostAction::Start).await
            }
            ClientMessage::HostNext { quiz_code } => {
                let code = self.resolve(conn, &quiz_code)?;
                self.handle(&code)?.host(conn, HostAction::Next).await
            }
            ClientMessage::HostEnd { quiz_code } => {
                let code = self.resolve(conn, &quiz_code)?;
                self.handle(&code)?.host(conn, HostAction::End).await
            }
        }
    }

    /// Detaches a dropped connection from its room, deleting the room
    /// when it was the last member.
    pub async fn on_disconnect(&mut self, conn: ConnectionId) {
        let Some(code) = self.conn_rooms.remove(&conn) else {
            return;
        };
        let Some(handle) = self.rooms.get(&code) else {
            return;
        };
        match handle.close(conn).await {
            Ok(0) | Err(_) => {
                self.rooms.remove(&code);
                info!(room = %code, "room deleted (empty)");
            }
            Ok(remaining) => {
                info!(room = %code, %conn, remaining, "member disconnected");
            }
        }
    }

    /// Resolves the owning room: recorded membership first, then the
    /// code carried on the message.
    fn resolve(&self, conn: ConnectionId, hint: &RoomCode) -> Result<RoomCode, RoomError> {
        if let Some(code) = self.conn_rooms.get(&conn) {
            return Ok(code.clone());
        }
        if self.rooms.contains_key(hint) {
            return Ok(hint.clone());
        }
        if hint.as_str().is_empty() {
            Err(RoomError::NotJoined(conn))
        } else {
            Err(RoomError::NotFound(hint.clone()))
        }
    }

    fn handle(&self, code: &RoomCode) -> Result<&RoomHandle, RoomError> {
        self.rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }
}

impl Default for RoomsDirectory {
    fn default() -> Self {
        Self::new()
    }
}
