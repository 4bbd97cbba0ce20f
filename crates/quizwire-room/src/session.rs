//! The quiz session state machine.
//!
//! [`QuizSession`] is the pure core of a room: phases, the roster,
//! answers, scoring, and snapshot computation. It knows nothing about
//! connections, channels, or timers — the room actor owns one and feeds
//! it events, passing in the current wall-clock time where a decision
//! depends on it. Keeping it pure makes every guard in the transition
//! table unit-testable without a runtime.

use std::collections::HashMap;

use quizwire_protocol::{
    CHOICE_COUNT, Phase, PlayerId, PlayerPublic, QuestionView, QuizDefinition, QuizQuestion,
    ResultsView, RoomCode, RoomSnapshot,
};

use crate::ids::make_player_id;

/// Points awarded for a correct answer recorded before the deadline.
///
/// Fixed-value policy: only a correct answer can increase a score, and a
/// score never decreases.
pub const POINTS_PER_CORRECT: u32 = 100;

/// A persistent participant identity within one room.
///
/// Created on first join and never destroyed while the room exists;
/// a disconnect only flips `connected`.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub connected: bool,
    /// Insertion ordinal, used to break leaderboard ties
    /// deterministically (first to reach a score ranks higher).
    joined_seq: u64,
}

/// How a join request was reconciled against the existing roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinResolution {
    /// The supplied player id matched an existing player.
    Reconnected,
    /// No id matched, but an existing player had the same name.
    ReattachedByName,
    /// A brand-new player was created.
    Created,
}

/// The resolved identity returned from a join.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub player_id: PlayerId,
    /// The authoritative name — on a reattach this is the existing
    /// player's name, not the submitted one.
    pub name: String,
    pub resolution: JoinResolution,
}

/// One quiz session: the state a single room owns exclusively.
pub struct QuizSession {
    quiz: QuizDefinition,
    phase: Phase,
    /// Index into `quiz.questions`; `None` before the first start.
    current: Option<usize>,
    /// Absolute answer deadline in epoch milliseconds; meaningful only
    /// while `phase == Question` (kept afterwards for the results view).
    deadline_ms: u64,
    players: HashMap<PlayerId, Player>,
    /// Chosen choice index per player, cleared at the start of every
    /// question. Keys are always present in `players`.
    answers: HashMap<PlayerId, u8>,
    /// Tally of the finished question; populated on entering `results`.
    results: Option<ResultsView>,
    next_seq: u64,
}

impl QuizSession {
    /// Creates a session in the lobby phase for an already-validated quiz.
    pub fn new(quiz: QuizDefinition) -> Self {
        Self {
            quiz,
            phase: Phase::Lobby,
            current: None,
            deadline_ms: 0,
            players: HashMap::new(),
            answers: HashMap::new(),
            results: None,
            next_seq: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current question index for the wire: −1 before the first start.
    pub fn current_index(&self) -> i64 {
        self.current.map_or(-1, |i| i as i64)
    }

    /// Absolute answer deadline in epoch milliseconds (0 if never armed).
    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    fn current_question(&self) -> Option<&QuizQuestion> {
        self.current.and_then(|i| self.quiz.questions.get(i))
    }

    // -- Join / identity reconciliation (valid in any phase) --

    /// Resolves a joining player against the roster.
    ///
    /// A known `claimed` id reattaches to that player (the canonical
    /// reconnection path). Failing that, a player with the same name is
    /// reattached — a heuristic merge that tolerates a client losing its
    /// assigned id, at the cost of merging two humans who picked the
    /// same display name. Only if neither matches is a new player
    /// created with a fresh id.
    pub fn join_player(&mut self, name: &str, claimed: Option<&PlayerId>) -> JoinOutcome {
        if let Some(id) = claimed {
            if let Some(p) = self.players.get_mut(id) {
                p.connected = true;
                return JoinOutcome {
                    player_id: p.id.clone(),
                    name: p.name.clone(),
                    resolution: JoinResolution::Reconnected,
                };
            }
        }

        if let Some(p) = self.players.values_mut().find(|p| p.name == name) {
            p.connected = true;
            return JoinOutcome {
                player_id: p.id.clone(),
                name: p.name.clone(),
                resolution: JoinResolution::ReattachedByName,
            };
        }

        let id = make_player_id();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.players.insert(
            id.clone(),
            Player {
                id: id.clone(),
                name: name.to_string(),
                score: 0,
                connected: true,
                joined_seq: seq,
            },
        );
        JoinOutcome {
            player_id: id,
            name: name.to_string(),
            resolution: JoinResolution::Created,
        }
    }

    /// Marks a known player connected. Returns `false` for unknown ids.
    pub fn mark_connected(&mut self, id: &PlayerId) -> bool {
        match self.players.get_mut(id) {
            Some(p) => {
                p.connected = true;
                true
            }
            None => false,
        }
    }

    /// Flips `connected` off; the player and their score are kept.
    pub fn mark_disconnected(&mut self, id: &PlayerId) {
        if let Some(p) = self.players.get_mut(id) {
            p.connected = false;
        }
    }

    // -- Phase transitions --

    /// `host:start`: lobby → question 0, or straight to `ended` for a
    /// quiz with zero questions. Returns `false` (no-op) in any other
    /// phase, including on a duplicate click.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.phase != Phase::Lobby {
            return false;
        }
        if self.quiz.questions.is_empty() {
            self.phase = Phase::Ended;
            return true;
        }
        self.begin_question(0, now_ms);
        true
    }

    fn begin_question(&mut self, index: usize, now_ms: u64) {
        let duration = self.quiz.questions[index].duration_ms;
        self.current = Some(index);
        self.answers.clear();
        self.results = None;
        self.deadline_ms = now_ms + duration;
        self.phase = Phase::Question;
    }

    /// Records an answer. Returns `false` (silent no-op) when any guard
    /// fails: wrong phase, unknown player, already answered, stale
    /// question id, out-of-range choice, or past the deadline.
    pub fn record_answer(
        &mut self,
        player_id: &PlayerId,
        question_id: u32,
        choice_index: u8,
        now_ms: u64,
    ) -> bool {
        if self.phase != Phase::Question {
            return false;
        }
        let Some(question) = self.current_question() else {
            return false;
        };
        if question.id != question_id
            || choice_index as usize >= CHOICE_COUNT
            || !self.players.contains_key(player_id)
            || self.answers.contains_key(player_id)
            || now_ms >= self.deadline_ms
        {
            return false;
        }
        self.answers.insert(player_id.clone(), choice_index);
        true
    }

    /// Deadline elapsed: question → results. Tallies the distribution
    /// and awards points. Returns `false` if the phase already moved on
    /// (stale timer defense).
    pub fn finish_question(&mut self) -> bool {
        if self.phase != Phase::Question {
            return false;
        }
        let Some(question) = self.current_question() else {
            return false;
        };
        let correct = question.correct_index;

        let mut counts = [0u32; CHOICE_COUNT];
        for (player_id, &choice) in &self.answers {
            counts[choice as usize] += 1;
            if choice == correct {
                if let Some(p) = self.players.get_mut(player_id) {
                    p.score += POINTS_PER_CORRECT;
                }
            }
        }

        self.results = Some(ResultsView {
            counts,
            correct_index: correct,
        });
        self.phase = Phase::Results;
        true
    }

    /// `host:next`: results → next question, or → leaderboard when no
    /// questions remain. Returns `false` outside `results`.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        if self.phase != Phase::Results {
            return false;
        }
        let next = self.current.map_or(0, |i| i + 1);
        if next < self.quiz.questions.len() {
            self.begin_question(next, now_ms);
        } else {
            self.phase = Phase::Leaderboard;
        }
        true
    }

    /// `host:end`: leaderboard → ended (absorbing).
    pub fn end(&mut self) -> bool {
        if self.phase != Phase::Leaderboard {
            return false;
        }
        self.phase = Phase::Ended;
        true
    }

    // -- Snapshot --

    /// Computes the outward view of this session.
    ///
    /// The in-flight question appears in `question` and `results` phases
    /// with its correct answer stripped; the tally appears only in
    /// `results`. The leaderboard sorts by score descending with ties
    /// broken by join order.
    pub fn snapshot(&self, code: &RoomCode, now_ms: u64) -> RoomSnapshot {
        let question = match self.phase {
            Phase::Question | Phase::Results => self.current_question().map(|q| QuestionView {
                id: q.id,
                title: q.title.clone(),
                choices: q.choices.clone(),
                ends_at: if self.deadline_ms > 0 {
                    self.deadline_ms
                } else {
                    now_ms
                },
            }),
            _ => None,
        };

        let results = match self.phase {
            Phase::Results => self.results,
            _ => None,
        };

        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.joined_seq);
        let players: Vec<PlayerPublic> = players
            .into_iter()
            .map(|p| PlayerPublic {
                id: p.id.clone(),
                name: p.name.clone(),
                score: p.score,
                connected: p.connected,
                answered: self.answers.contains_key(&p.id),
            })
            .collect();

        let mut leaderboard = players.clone();
        leaderboard.sort_by(|a, b| b.score.cmp(&a.score));

        RoomSnapshot {
            code: code.clone(),
            phase: self.phase,
            quiz_title: self.quiz.title.clone(),
            current_index: self.current_index(),
            question,
            results,
            players,
            leaderboard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    fn question(id: u32, correct: u8) -> QuizQuestion {
        QuizQuestion {
            id,
            title: format!("Question {id}"),
            choices: ["A".into(), "B".into(), "C".into(), "D".into()],
            correct_index: correct,
            duration_ms: 10_000,
        }
    }

    fn two_question_quiz() -> QuizDefinition {
        QuizDefinition {
            title: "Capitals".into(),
            questions: vec![question(1, 0), question(2, 2)],
        }
    }

    fn code() -> RoomCode {
        RoomCode("ABC123".into())
    }

    #[test]
    fn starts_in_lobby_with_no_index() {
        let session = QuizSession::new(two_question_quiz());
        assert_eq!(session.phase(), Phase::Lobby);
        assert_eq!(session.current_index(), -1);
    }

    #[test]
    fn start_moves_to_first_question_with_future_deadline() {
        let mut session = QuizSession::new(two_question_quiz());
        assert!(session.start(NOW));
        assert_eq!(session.phase(), Phase::Question);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.deadline_ms(), NOW + 10_000);
    }

    #[test]
    fn start_is_noop_outside_lobby() {
        let mut session = QuizSession::new(two_question_quiz());
        assert!(session.start(NOW));
        // Duplicate click.
        assert!(!session.start(NOW + 1));
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn zero_question_quiz_ends_immediately() {
        let mut session = QuizSession::new(QuizDefinition {
            title: "Empty".into(),
            questions: vec![],
        });
        assert!(session.start(NOW));
        assert_eq!(session.phase(), Phase::Ended);
        assert_eq!(session.current_index(), -1);
    }

    #[test]
    fn new_player_created_with_zero_score() {
        let mut session = QuizSession::new(two_question_quiz());
        let outcome = session.join_player("Alice", None);
        assert_eq!(outcome.resolution, JoinResolution::Created);
        let p = session.player(&outcome.player_id).unwrap();
        assert_eq!(p.score, 0);
        assert!(p.connected);
    }

    #[test]
    fn reconnect_by_id_preserves_score_and_identity() {
        let mut session = QuizSession::new(two_question_quiz());
        let outcome = session.join_player("Alice", None);
        let id = outcome.player_id.clone();

        session.start(NOW);
        assert!(session.record_answer(&id, 1, 0, NOW + 100));
        session.finish_question();
        assert_eq!(session.player(&id).unwrap().score, POINTS_PER_CORRECT);

        session.mark_disconnected(&id);
        let back = session.join_player("Alice", Some(&id));
        assert_eq!(back.resolution, JoinResolution::Reconnected);
        assert_eq!(back.player_id, id);
        assert_eq!(session.player(&id).unwrap().score, POINTS_PER_CORRECT);
    }

    #[test]
    fn join_by_matching_name_reattaches() {
        let mut session = QuizSession::new(two_question_quiz());
        let first = session.join_player("Alice", None);
        session.mark_disconnected(&first.player_id);

        // Same name, no id (client lost it on reload).
        let second = session.join_player("Alice", None);
        assert_eq!(second.resolution, JoinResolution::ReattachedByName);
        assert_eq!(second.player_id, first.player_id);
    }

    #[test]
    fn unknown_claimed_id_falls_back_to_name_then_creates() {
        let mut session = QuizSession::new(two_question_quiz());
        let stale = PlayerId("no-such-id".into());
        let outcome = session.join_player("Alice", Some(&stale));
        assert_eq!(outcome.resolution, JoinResolution::Created);
        assert_ne!(outcome.player_id, stale);
    }

    #[test]
    fn disconnect_keeps_the_player() {
        let mut session = QuizSession::new(two_question_quiz());
        let outcome = session.join_player("Alice", None);
        session.mark_disconnected(&outcome.player_id);
        let p = session.player(&outcome.player_id).unwrap();
        assert!(!p.connected);
    }

    #[test]
    fn at_most_one_answer_per_player() {
        let mut session = QuizSession::new(two_question_quiz());
        let alice = session.join_player("Alice", None).player_id;
        session.start(NOW);

        assert!(session.record_answer(&alice, 1, 2, NOW + 100));
        assert!(!session.record_answer(&alice, 1, 0, NOW + 200));

        session.finish_question();
        let snap = session.snapshot(&code(), NOW + 10_001);
        // Bucket 2 holds the first answer; nothing was overwritten.
        assert_eq!(snap.results.unwrap().counts, [0, 0, 1, 0]);
    }

    #[test]
    fn answer_guards_reject_invalid_submissions() {
        let mut session = QuizSession::new(two_question_quiz());
        let alice = session.join_player("Alice", None).player_id;

        // Wrong phase.
        assert!(!session.record_answer(&alice, 1, 0, NOW));

        session.start(NOW);
        // Unknown player.
        let ghost = PlayerId("ghost".into());
        assert!(!session.record_answer(&ghost, 1, 0, NOW + 1));
        // Stale question id.
        assert!(!session.record_answer(&alice, 99, 0, NOW + 1));
        // Out-of-range choice.
        assert!(!session.record_answer(&alice, 1, 4, NOW + 1));
        // Past the deadline.
        assert!(!session.record_answer(&alice, 1, 0, NOW + 10_000));

        // A valid one still goes through.
        assert!(session.record_answer(&alice, 1, 0, NOW + 9_999));
    }

    #[test]
    fn distribution_sums_to_distinct_answerers() {
        let mut session = QuizSession::new(two_question_quiz());
        let alice = session.join_player("Alice", None).player_id;
        let bob = session.join_player("Bob", None).player_id;
        let carol = session.join_player("Carol", None).player_id;
        session.start(NOW);

        session.record_answer(&alice, 1, 0, NOW + 10);
        session.record_answer(&bob, 1, 3, NOW + 20);
        // Carol never answers.
        let _ = carol;

        session.finish_question();
        let counts = session.snapshot(&code(), NOW).results.unwrap().counts;
        assert_eq!(counts.iter().sum::<u32>(), 2);
        assert_eq!(counts, [1, 0, 0, 1]);
    }

    #[test]
    fn only_correct_answers_score() {
        let mut session = QuizSession::new(two_question_quiz());
        let alice = session.join_player("Alice", None).player_id;
        let bob = session.join_player("Bob", None).player_id;
        session.start(NOW);

        session.record_answer(&alice, 1, 0, NOW + 10); // correct
        session.record_answer(&bob, 1, 1, NOW + 20); // wrong
        session.finish_question();

        assert_eq!(session.player(&alice).unwrap().score, POINTS_PER_CORRECT);
        assert_eq!(session.player(&bob).unwrap().score, 0);
    }

    #[test]
    fn finish_question_is_idempotent() {
        let mut session = QuizSession::new(two_question_quiz());
        let alice = session.join_player("Alice", None).player_id;
        session.start(NOW);
        session.record_answer(&alice, 1, 0, NOW + 10);

        assert!(session.finish_question());
        // A racing late transition is a guarded no-op: no double award.
        assert!(!session.finish_question());
        assert_eq!(session.player(&alice).unwrap().score, POINTS_PER_CORRECT);
    }

    #[test]
    fn advance_walks_questions_then_leaderboard() {
        let mut session = QuizSession::new(two_question_quiz());
        session.join_player("Alice", None);
        session.start(NOW);
        session.finish_question();

        assert!(session.advance(NOW + 11_000));
        assert_eq!(session.phase(), Phase::Question);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.deadline_ms(), NOW + 21_000);

        session.finish_question();
        assert!(session.advance(NOW + 22_000));
        assert_eq!(session.phase(), Phase::Leaderboard);
    }

    #[test]
    fn advance_is_noop_outside_results() {
        let mut session = QuizSession::new(two_question_quiz());
        session.start(NOW);
        // Still in `question` — the deadline has not fired.
        assert!(!session.advance(NOW + 1));
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn end_only_from_leaderboard() {
        let mut session = QuizSession::new(two_question_quiz());
        assert!(!session.end());
        session.start(NOW);
        session.finish_question();
        session.advance(NOW);
        session.finish_question();
        session.advance(NOW);
        assert_eq!(session.phase(), Phase::Leaderboard);
        assert!(session.end());
        assert_eq!(session.phase(), Phase::Ended);
        // Ended is absorbing.
        assert!(!session.end());
        assert!(!session.start(NOW));
    }

    #[test]
    fn answered_flags_reset_on_next_question() {
        let mut session = QuizSession::new(two_question_quiz());
        let alice = session.join_player("Alice", None).player_id;
        session.start(NOW);
        session.record_answer(&alice, 1, 0, NOW + 10);

        let snap = session.snapshot(&code(), NOW + 20);
        assert!(snap.players[0].answered);

        session.finish_question();
        session.advance(NOW + 11_000);
        let snap = session.snapshot(&code(), NOW + 11_001);
        assert!(!snap.players[0].answered);
    }

    #[test]
    fn snapshot_hides_tally_outside_results() {
        let mut session = QuizSession::new(two_question_quiz());
        session.join_player("Alice", None);

        let snap = session.snapshot(&code(), NOW);
        assert!(snap.question.is_none());
        assert!(snap.results.is_none());

        session.start(NOW);
        let snap = session.snapshot(&code(), NOW + 1);
        let q = snap.question.expect("question visible during question");
        assert_eq!(q.ends_at, NOW + 10_000);
        assert!(snap.results.is_none());

        session.finish_question();
        let snap = session.snapshot(&code(), NOW + 10_001);
        assert!(snap.question.is_some(), "question stays visible in results");
        assert_eq!(snap.results.unwrap().correct_index, 0);
    }

    #[test]
    fn leaderboard_sorts_by_score_then_join_order() {
        let mut session = QuizSession::new(two_question_quiz());
        let alice = session.join_player("Alice", None).player_id;
        let bob = session.join_player("Bob", None).player_id;
        let carol = session.join_player("Carol", None).player_id;
        session.start(NOW);

        // Bob and Carol both answer correctly; Alice is wrong.
        session.record_answer(&alice, 1, 3, NOW + 10);
        session.record_answer(&bob, 1, 0, NOW + 20);
        session.record_answer(&carol, 1, 0, NOW + 30);
        session.finish_question();

        let board = session.snapshot(&code(), NOW).leaderboard;
        assert_eq!(board[0].id, bob, "tie broken by join order");
        assert_eq!(board[1].id, carol);
        assert_eq!(board[2].id, alice);
    }
}
