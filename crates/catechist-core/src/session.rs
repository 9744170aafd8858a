// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The quiz session engine.
//!
//! A session samples a bounded queue of item ids from the catalog and walks
//! the learner through flip/grade/navigate transitions until every position
//! has been graded. The session owns all mutable quiz state; content stays
//! outside. The caller resolves ids against its catalog and passes in the
//! one fact the engine needs about the current item (its footnote group
//! count).

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::rng::RandomSource;
use crate::rng::shuffle;
use crate::types::aliases::ItemId;

/// The maximum number of items drawn into one session.
pub const SESSION_SIZE: usize = 10;

/// How the learner judged their recall of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Wrong,
}

/// Where the session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The learner is reviewing and grading items.
    Active,
    /// Every queue position has been graded; only a restart leaves this.
    Complete,
}

/// Cursor movement direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, PartialEq)]
pub enum SessionError {
    /// There are no items to sample from.
    EmptyCatalog,
    /// A transition was attempted that the current state does not allow.
    /// This is a caller bug, not a user-facing condition.
    InvalidOperation(String),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::EmptyCatalog => write!(f, "the catalog has no items to quiz on"),
            SessionError::InvalidOperation(msg) => write!(f, "invalid operation: {msg}"),
        }
    }
}

impl Error for SessionError {}

/// Tally of a session's recorded outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Score {
    /// Outcomes recorded as correct.
    pub correct: usize,
    /// Distinct items graded so far.
    pub graded: usize,
    /// Length of the session queue.
    pub queue_len: usize,
}

impl Score {
    /// Correct answers as a rounded integer percentage of the queue length.
    pub fn percentage(&self) -> u32 {
        ((self.correct as f64 / self.queue_len as f64) * 100.0).round() as u32
    }
}

/// A quiz session over a sampled queue of item ids.
pub struct Session {
    /// Distinct ids drawn from `[1..=catalog_size]`, fixed for the session.
    queue: Vec<ItemId>,
    /// Index into `queue`.
    cursor: usize,
    /// Whether the answer face of the current item is showing.
    revealed: bool,
    /// Recorded outcome per graded id. Re-grading overwrites.
    results: HashMap<ItemId, Outcome>,
    /// Scripture group currently open on the answer face, if any.
    active_footnote: Option<usize>,
    phase: Phase,
}

impl Session {
    /// Start a session over a catalog of `catalog_size` items.
    ///
    /// Draws `min(SESSION_SIZE, catalog_size)` distinct ids from
    /// `[1..=catalog_size]` in uniform random order. Fails with
    /// `EmptyCatalog` when the catalog is empty.
    pub fn start(
        catalog_size: usize,
        rng: &mut dyn RandomSource,
    ) -> Result<Session, SessionError> {
        if catalog_size == 0 {
            return Err(SessionError::EmptyCatalog);
        }
        let mut ids: Vec<ItemId> = (1..=catalog_size as ItemId).collect();
        shuffle(&mut ids, rng);
        ids.truncate(SESSION_SIZE);
        Ok(Session {
            queue: ids,
            cursor: 0,
            revealed: false,
            results: HashMap::new(),
            active_footnote: None,
            phase: Phase::Active,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The session queue, in presentation order.
    pub fn queue(&self) -> &[ItemId] {
        &self.queue
    }

    /// Position of the cursor within the queue.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn revealed(&self) -> bool {
        self.revealed
    }

    pub fn active_footnote(&self) -> Option<usize> {
        self.active_footnote
    }

    /// The id under the cursor.
    pub fn current_item_id(&self) -> ItemId {
        self.queue[self.cursor]
    }

    /// The recorded outcome for an id, if it has been graded.
    pub fn result_for(&self, id: ItemId) -> Option<Outcome> {
        self.results.get(&id).copied()
    }

    /// Toggle between the question and answer face of the current item.
    pub fn flip(&mut self) -> Result<(), SessionError> {
        self.require_active("flip")?;
        self.revealed = !self.revealed;
        self.active_footnote = None;
        Ok(())
    }

    /// Record an outcome for the current item, then advance.
    ///
    /// Grading the last queue position completes the session instead of
    /// advancing; cursor and faces stay frozen at their final values.
    /// Grading an item reached by backwards navigation overwrites the
    /// earlier outcome.
    pub fn grade(&mut self, outcome: Outcome) -> Result<(), SessionError> {
        self.require_active("grade")?;
        self.results.insert(self.current_item_id(), outcome);
        if self.cursor + 1 == self.queue.len() {
            self.phase = Phase::Complete;
        } else {
            self.cursor += 1;
            self.revealed = false;
            self.active_footnote = None;
        }
        Ok(())
    }

    /// Move the cursor one step. Stepping past either end of the queue is a
    /// silent no-op. Any actual move resets the card to its question face.
    pub fn navigate(&mut self, direction: Direction) -> Result<(), SessionError> {
        self.require_active("navigate")?;
        let target = match direction {
            Direction::Previous => self.cursor.checked_sub(1),
            Direction::Next if self.cursor + 1 < self.queue.len() => Some(self.cursor + 1),
            Direction::Next => None,
        };
        if let Some(target) = target {
            self.cursor = target;
            self.revealed = false;
            self.active_footnote = None;
        }
        Ok(())
    }

    /// Show or hide one of the current item's scripture groups.
    ///
    /// `group_count` is the number of groups the current item carries; the
    /// index is validated against it before anything changes. Toggling the
    /// open group closes it. Legal in both phases.
    pub fn toggle_footnote(
        &mut self,
        index: usize,
        group_count: usize,
    ) -> Result<(), SessionError> {
        if index >= group_count {
            return Err(SessionError::InvalidOperation(format!(
                "footnote index {index} out of range for {group_count} group(s)"
            )));
        }
        self.active_footnote = if self.active_footnote == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(())
    }

    /// The current tally. Defined in both phases; once the session is
    /// complete, every queue position has an outcome.
    pub fn score(&self) -> Score {
        Score {
            correct: self
                .results
                .values()
                .filter(|outcome| **outcome == Outcome::Correct)
                .count(),
            graded: self.results.len(),
            queue_len: self.queue.len(),
        }
    }

    fn require_active(&self, op: &str) -> Result<(), SessionError> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::Complete => Err(SessionError::InvalidOperation(format!(
                "{op} called after session completion"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::TinyRng;

    /// Replays a fixed sequence of picks.
    struct Scripted {
        picks: Vec<usize>,
        next: usize,
    }

    impl Scripted {
        fn new(picks: Vec<usize>) -> Self {
            Scripted { picks, next: 0 }
        }
    }

    impl RandomSource for Scripted {
        fn pick(&mut self, bound: usize) -> usize {
            let value = self.picks[self.next];
            self.next += 1;
            assert!(value < bound);
            value
        }
    }

    /// A session over [1, 2, 3] with a scripted queue order of [2, 1, 3]:
    /// the Fisher-Yates pass at i=2 swaps index 2 with itself, then at i=1
    /// swaps index 1 with index 0.
    fn session_213() -> Session {
        let mut rng = Scripted::new(vec![2, 0]);
        let session = Session::start(3, &mut rng).unwrap();
        assert_eq!(session.queue(), &[2, 1, 3]);
        session
    }

    #[test]
    fn test_queue_length_and_distinctness() {
        for n in [1, 2, 5, 9, 10, 11, 15, 300] {
            let mut rng = TinyRng::from_seed(7);
            let session = Session::start(n, &mut rng).unwrap();
            assert_eq!(session.queue().len(), n.min(SESSION_SIZE));
            let mut sorted = session.queue().to_vec();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), session.queue().len());
            assert!(
                session
                    .queue()
                    .iter()
                    .all(|id| (1..=n as ItemId).contains(id))
            );
        }
    }

    #[test]
    fn test_empty_catalog() {
        let mut rng = TinyRng::from_seed(7);
        assert_eq!(
            Session::start(0, &mut rng).err(),
            Some(SessionError::EmptyCatalog)
        );
    }

    #[test]
    fn test_small_catalog_contains_every_id() {
        let mut rng = TinyRng::from_seed(11);
        let session = Session::start(3, &mut rng).unwrap();
        let mut sorted = session.queue().to_vec();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3]);
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let a = Session::start(15, &mut TinyRng::from_seed(23)).unwrap();
        let b = Session::start(15, &mut TinyRng::from_seed(23)).unwrap();
        assert_eq!(a.queue(), b.queue());
    }

    #[test]
    fn test_initial_state() {
        let session = session_213();
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.current_item_id(), 2);
        assert!(!session.revealed());
        assert_eq!(session.active_footnote(), None);
        assert_eq!(session.score().graded, 0);
    }

    #[test]
    fn test_flip_toggles_and_clears_footnote() {
        let mut session = session_213();
        session.flip().unwrap();
        assert!(session.revealed());
        session.toggle_footnote(0, 2).unwrap();
        assert_eq!(session.active_footnote(), Some(0));
        session.flip().unwrap();
        assert!(!session.revealed());
        assert_eq!(session.active_footnote(), None);
    }

    #[test]
    fn test_grade_advances_and_resets_faces() {
        let mut session = session_213();
        session.flip().unwrap();
        session.toggle_footnote(1, 2).unwrap();
        session.grade(Outcome::Correct).unwrap();
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.current_item_id(), 1);
        assert!(!session.revealed());
        assert_eq!(session.active_footnote(), None);
        assert_eq!(session.result_for(2), Some(Outcome::Correct));
    }

    #[test]
    fn test_grading_last_position_completes() {
        let mut session = session_213();
        session.grade(Outcome::Correct).unwrap();
        session.grade(Outcome::Wrong).unwrap();
        assert_eq!(session.phase(), Phase::Active);
        session.grade(Outcome::Correct).unwrap();
        assert_eq!(session.phase(), Phase::Complete);
        let score = session.score();
        assert_eq!(score.graded, score.queue_len);
        // Cursor stays frozen at the last position.
        assert_eq!(session.cursor(), 2);
    }

    #[test]
    fn test_completion_scenario_scores_67_percent() {
        let mut session = session_213();
        session.grade(Outcome::Correct).unwrap();
        session.grade(Outcome::Wrong).unwrap();
        session.grade(Outcome::Correct).unwrap();
        assert_eq!(session.phase(), Phase::Complete);
        let score = session.score();
        assert_eq!(
            score,
            Score {
                correct: 2,
                graded: 3,
                queue_len: 3
            }
        );
        assert_eq!(score.percentage(), 67);
    }

    #[test]
    fn test_navigation_clamps_at_both_ends() {
        let mut session = session_213();
        session.navigate(Direction::Previous).unwrap();
        assert_eq!(session.cursor(), 0);
        session.navigate(Direction::Next).unwrap();
        session.navigate(Direction::Next).unwrap();
        assert_eq!(session.cursor(), 2);
        session.navigate(Direction::Next).unwrap();
        assert_eq!(session.cursor(), 2);
    }

    #[test]
    fn test_navigation_resets_faces_but_not_results() {
        let mut session = session_213();
        session.grade(Outcome::Correct).unwrap();
        session.flip().unwrap();
        session.navigate(Direction::Previous).unwrap();
        assert_eq!(session.cursor(), 0);
        assert!(!session.revealed());
        assert_eq!(session.result_for(2), Some(Outcome::Correct));
        assert_eq!(session.score().graded, 1);
    }

    #[test]
    fn test_regrading_overwrites_without_growing_results() {
        let mut session = session_213();
        session.grade(Outcome::Correct).unwrap();
        session.navigate(Direction::Previous).unwrap();
        session.grade(Outcome::Wrong).unwrap();
        assert_eq!(session.result_for(2), Some(Outcome::Wrong));
        let score = session.score();
        assert_eq!(score.graded, 1);
        assert_eq!(score.correct, 0);
    }

    #[test]
    fn test_footnote_toggle_is_an_idempotent_pair() {
        let mut session = session_213();
        session.toggle_footnote(1, 3).unwrap();
        assert_eq!(session.active_footnote(), Some(1));
        session.toggle_footnote(1, 3).unwrap();
        assert_eq!(session.active_footnote(), None);
        // Switching groups replaces rather than stacking.
        session.toggle_footnote(0, 3).unwrap();
        session.toggle_footnote(2, 3).unwrap();
        assert_eq!(session.active_footnote(), Some(2));
    }

    #[test]
    fn test_footnote_index_out_of_range_leaves_state_untouched() {
        let mut session = session_213();
        session.toggle_footnote(0, 2).unwrap();
        let result = session.toggle_footnote(2, 2);
        assert!(matches!(result, Err(SessionError::InvalidOperation(_))));
        assert_eq!(session.active_footnote(), Some(0));
        assert!(session.toggle_footnote(0, 0).is_err());
    }

    #[test]
    fn test_transitions_rejected_after_completion() {
        let mut session = Session::start(1, &mut TinyRng::from_seed(1)).unwrap();
        session.grade(Outcome::Correct).unwrap();
        assert_eq!(session.phase(), Phase::Complete);
        assert!(matches!(
            session.flip(),
            Err(SessionError::InvalidOperation(_))
        ));
        assert!(matches!(
            session.grade(Outcome::Wrong),
            Err(SessionError::InvalidOperation(_))
        ));
        assert!(matches!(
            session.navigate(Direction::Next),
            Err(SessionError::InvalidOperation(_))
        ));
        // Footnote review stays legal after completion.
        session.toggle_footnote(0, 1).unwrap();
        assert_eq!(session.active_footnote(), Some(0));
    }

    #[test]
    fn test_single_item_catalog() {
        let mut session = Session::start(1, &mut TinyRng::from_seed(5)).unwrap();
        assert_eq!(session.queue(), &[1]);
        session.grade(Outcome::Wrong).unwrap();
        assert_eq!(session.phase(), Phase::Complete);
        assert_eq!(session.score().percentage(), 0);

        let mut session = Session::start(1, &mut TinyRng::from_seed(5)).unwrap();
        session.grade(Outcome::Correct).unwrap();
        assert_eq!(session.score().percentage(), 100);
    }

    #[test]
    fn test_percentage_rounding() {
        let score = |correct, queue_len| Score {
            correct,
            graded: queue_len,
            queue_len,
        };
        assert_eq!(score(1, 3).percentage(), 33);
        assert_eq!(score(2, 3).percentage(), 67);
        assert_eq!(score(1, 8).percentage(), 13);
        assert_eq!(score(0, 10).percentage(), 0);
        assert_eq!(score(10, 10).percentage(), 100);
    }
}
