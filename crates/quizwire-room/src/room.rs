//! The room actor: one Tokio task per live room.
//!
//! The actor owns the [`QuizSession`] plus the room's timers. Commands
//! arrive over an mpsc channel from the directory; state changes are
//! pushed to every member as a full snapshot. Timers are select! branches
//! inside the actor loop, so a deadline firing and a host command can
//! never race on the session from two tasks.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use quizwire_protocol::{
    JoinedReply, Phase, PlayerId, QuizDefinition, RoomCode, ServerMessage,
};
use quizwire_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::session::QuizSession;
use crate::RoomError;

/// Outbound channel for a single member connection. The connection task
/// drains this into the socket; the actor never blocks on a slow client.
pub type MemberSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands a host may issue. Anything sent by a non-host connection is
/// dropped without a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Start,
    Next,
    End,
}

/// What a connection is to the room.
#[derive(Debug, Clone)]
struct Membership {
    is_host: bool,
    player_id: Option<PlayerId>,
}

#[derive(Debug)]
pub(crate) enum RoomCommand {
    JoinHost {
        conn: ConnectionId,
        sender: MemberSender,
    },
    JoinPlayer {
        conn: ConnectionId,
        sender: MemberSender,
        name: String,
        claimed: Option<PlayerId>,
    },
    Sync {
        conn: ConnectionId,
        sender: MemberSender,
        player_id: Option<PlayerId>,
    },
    Answer {
        conn: ConnectionId,
        player_id: Option<PlayerId>,
        question_id: u32,
        choice_index: u8,
    },
    Host {
        conn: ConnectionId,
        action: HostAction,
    },
    Close {
        conn: ConnectionId,
        reply: oneshot::Sender<usize>,
    },
}

const COMMAND_BUFFER: usize = 64;

/// Handle to a running room actor. Cloneable; dropping the last clone
/// closes the command channel and the actor exits, tearing down its
/// timers with it.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub async fn join_host(
        &self,
        conn: ConnectionId,
        sender: MemberSender,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::JoinHost { conn, sender }).await
    }

    pub async fn join_player(
        &self,
        conn: ConnectionId,
        sender: MemberSender,
        name: String,
        claimed: Option<PlayerId>,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::JoinPlayer {
            conn,
            sender,
            name,
            claimed,
        })
        .await
    }

    pub async fn sync(
        &self,
        conn: ConnectionId,
        sender: MemberSender,
        player_id: Option<PlayerId>,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Sync {
            conn,
            sender,
            player_id,
        })
        .await
    }

    pub async fn answer(
        &self,
        conn: ConnectionId,
        player_id: Option<PlayerId>,
        question_id: u32,
        choice_index: u8,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Answer {
            conn,
            player_id,
            question_id,
            choice_index,
        })
        .await
    }

    pub async fn host(&self, conn: ConnectionId, action: HostAction) -> Result<(), RoomError> {
        self.send(RoomCommand::Host { conn, action }).await
    }

    /// Detaches a connection and returns how many members remain.
    pub async fn close(&self, conn: ConnectionId) -> Result<usize, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Close { conn, reply }).await?;
        rx.await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    async fn send(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// Spawns the actor task for a new room and returns its handle.
pub(crate) fn spawn_room(
    code: RoomCode,
    quiz: QuizDefinition,
    tick_interval: Duration,
) -> RoomHandle {
    let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
    let handle = RoomHandle {
        code: code.clone(),
        sender,
    };
    let actor = RoomActor {
        code,
        session: QuizSession::new(quiz),
        members: HashMap::new(),
        receiver,
        deadline: None,
        tick: time::interval(tick_interval),
    };
    tokio::spawn(actor.run());
    handle
}

struct RoomActor {
    code: RoomCode,
    session: QuizSession,
    members: HashMap<ConnectionId, (Membership, MemberSender)>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Armed while a question is open; fires the phase transition.
    deadline: Option<Instant>,
    /// Countdown heartbeat during the question phase.
    tick: time::Interval,
}

impl RoomActor {
    async fn run(mut self) {
        info!(room = %self.code, "room started");
        loop {
            tokio::select! {
                command = self.receiver.recv() => {
                    match command {
                        Some(command) => self.handle(command),
                        None => break,
                    }
                }
                _ = self.tick.tick(), if self.session.phase() == Phase::Question => {
                    // Heartbeat so clients can render the countdown from
                    // fresh `endsAt` values even with clock drift.
                    self.broadcast_state();
                }
                _ = sleep_until_opt(self.deadline), if self.deadline.is_some() => {
                    self.on_deadline();
                }
            }
        }
        info!(room = %self.code, "room stopped");
    }

    fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::JoinHost { conn, sender } => {
                let _ = sender.send(ServerMessage::Joined(JoinedReply::Host {
                    quiz_code: self.code.clone(),
                }));
                self.members.insert(
                    conn,
                    (
                        Membership {
                            is_host: true,
                            player_id: None,
                        },
                        sender,
                    ),
                );
                info!(room = %self.code, %conn, "host joined");
                self.broadcast_state();
            }
            RoomCommand::JoinPlayer {
                conn,
                sender,
                name,
                claimed,
            } => {
                let outcome = self.session.join_player(&name, claimed.as_ref());
                debug!(
                    room = %self.code,
                    %conn,
                    player = %outcome.player_id,
                    resolution = ?outcome.resolution,
                    "player joined"
                );
                let _ = sender.send(ServerMessage::Joined(JoinedReply::Player {
                    quiz_code: self.code.clone(),
                    player_id: outcome.player_id.clone(),
                    name: outcome.name,
                }));
                self.members.insert(
                    conn,
                    (
                        Membership {
                            is_host: false,
                            player_id: Some(outcome.player_id),
                        },
                        sender,
                    ),
                );
                self.broadcast_state();
            }
            RoomCommand::Sync {
                conn,
                sender,
                player_id,
            } => {
                let player_id = player_id.filter(|id| {
                    let known = self.session.mark_connected(id);
                    if !known {
                        debug!(room = %self.code, %conn, player = %id, "sync with unknown player id");
                    }
                    known
                });
                let _ = sender.send(ServerMessage::State {
                    state: self.snapshot(),
                });
                // A sync never demotes an existing membership; it only
                // fills in a player identity we did not have yet. Host
                // memberships never carry one, even when the sync quotes
                // a player's id.
                match self.members.get_mut(&conn) {
                    Some((membership, existing)) => {
                        if !membership.is_host && membership.player_id.is_none() {
                            membership.player_id = player_id;
                        }
                        *existing = sender;
                    }
                    None => {
                        self.members.insert(
                            conn,
                            (
                                Membership {
                                    is_host: false,
                                    player_id,
                                },
                                sender,
                            ),
                        );
                    }
                }
                self.broadcast_state();
            }
            RoomCommand::Answer {
                conn,
                player_id,
                question_id,
                choice_index,
            } => {
                // Prefer the identity established at join over whatever
                // the message claims.
                let resolved = self
                    .members
                    .get(&conn)
                    .and_then(|(m, _)| m.player_id.clone())
                    .or(player_id);
                let Some(player_id) = resolved else {
                    debug!(room = %self.code, %conn, "answer from connection with no player identity");
                    return;
                };
                let recorded = self.session.record_answer(
                    &player_id,
                    question_id,
                    choice_index,
                    now_ms(),
                );
                if recorded {
                    self.broadcast_state();
                }
            }
            RoomCommand::Host { conn, action } => {
                let is_host = self
                    .members
                    .get(&conn)
                    .map(|(m, _)| m.is_host)
                    .unwrap_or(false);
                if !is_host {
                    debug!(room = %self.code, %conn, ?action, "host command from non-host ignored");
                    return;
                }
                let changed = match action {
                    HostAction::Start => self.session.start(now_ms()),
                    HostAction::Next => self.session.advance(now_ms()),
                    HostAction::End => self.session.end(),
                };
                if changed {
                    info!(room = %self.code, ?action, phase = %self.session.phase(), "phase change");
                    self.arm_timers();
                    self.broadcast_state();
                }
            }
            RoomCommand::Close { conn, reply } => {
                if let Some((membership, _)) = self.members.remove(&conn) {
                    if let Some(player_id) = membership.player_id {
                        self.session.mark_disconnected(&player_id);
                    }
                    self.broadcast_state();
                }
                let _ = reply.send(self.members.len());
            }
        }
    }

    /// Question deadline fired: close the answer window and tally.
    fn on_deadline(&mut self) {
        self.deadline = None;
        if self.session.finish_question() {
            info!(room = %self.code, "question closed by deadline");
            self.broadcast_state();
        }
    }

    /// (Re)arms the deadline and countdown tick after a phase change.
    fn arm_timers(&mut self) {
        if self.session.phase() == Phase::Question {
            let remaining = self.session.deadline_ms().saturating_sub(now_ms());
            self.deadline = Some(Instant::now() + Duration::from_millis(remaining));
            self.tick.reset();
        } else {
            self.deadline = None;
        }
    }

    fn snapshot(&self) -> quizwire_protocol::RoomSnapshot {
        self.session.snapshot(&self.code, now_ms())
    }

    /// Pushes the current snapshot to every member. Send failures mean
    /// the connection task is gone; the disconnect path cleans it up.
    fn broadcast_state(&self) {
        let snapshot = self.snapshot();
        for (_, sender) in self.members.values() {
            let _ = sender.send(ServerMessage::State {
                state: snapshot.clone(),
            });
        }
    }
}

/// Wall-clock milliseconds since the Unix epoch, as carried in `endsAt`.
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Sleeps until `deadline`. Callers gate this behind `is_some()`, so the
/// fallback instant is never awaited to completion.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
