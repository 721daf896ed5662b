use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::deck::{Card, CardId};
use crate::error::{Error, Result};
use crate::scoring::ScoringPolicy;

use super::{CompletionSummary, FlipOutcome, PendingResolution, RoundEvent, RoundId, RoundPhase};

/// State of a single round
#[derive(Debug, Clone)]
pub struct Round {
    id: RoundId,
    cards: Vec<Card>,
    flipped: Vec<CardId>,
    matched_pairs: usize,
    moves: u32,
    score: u32,
    started_at: Option<DateTime<Utc>>,
    phase: RoundPhase,
    /// Set once the terminal transition has produced its summary
    completion: Option<CompletionSummary>,
}

impl Round {
    /// Round before any deck is dealt
    pub fn idle(id: RoundId) -> Self {
        Self {
            id,
            cards: Vec::new(),
            flipped: Vec::with_capacity(2),
            matched_pairs: 0,
            moves: 0,
            score: 0,
            started_at: None,
            phase: RoundPhase::Idle,
            completion: None,
        }
    }

    /// Start playing with a freshly generated deck
    ///
    /// An empty deck has nothing left to match and is complete immediately;
    /// its summary is produced by the first `try_complete` call.
    pub fn start(id: RoundId, cards: Vec<Card>, started_at: DateTime<Utc>) -> Self {
        let mut round = Self::idle(id);
        round.cards = cards;
        round.started_at = Some(started_at);
        round.phase = RoundPhase::Playing;
        info!("Round {} started with {} pairs", id, round.total_pairs());
        round
    }

    pub fn id(&self) -> RoundId {
        self.id
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn flipped_ids(&self) -> &[CardId] {
        &self.flipped
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completion(&self) -> Option<&CompletionSummary> {
        self.completion.as_ref()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == RoundPhase::Completed
    }

    /// Whole seconds since the round started, frozen once completed
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        if let Some(summary) = &self.completion {
            return summary.elapsed_seconds;
        }
        match self.started_at {
            Some(started) => (now - started).num_seconds().max(0) as u64,
            None => 0,
        }
    }

    /// Turn a card face up
    pub fn flip(&mut self, card_id: CardId) -> Result<FlipOutcome> {
        match self.phase {
            RoundPhase::Idle => return Err(Error::invalid_transition(card_id, "no deck dealt")),
            RoundPhase::Evaluating(_) => {
                return Err(Error::invalid_transition(card_id, "two cards are settling"));
            }
            RoundPhase::Completed => {
                return Err(Error::invalid_transition(card_id, "round is completed"));
            }
            RoundPhase::Playing => {}
        }

        if self.flipped.len() >= 2 {
            return Err(Error::invalid_transition(card_id, "two cards already flipped"));
        }

        let card = self
            .cards
            .iter_mut()
            .find(|c| c.id == card_id)
            .ok_or_else(|| Error::invalid_transition(card_id, "unknown card"))?;

        if card.is_matched {
            return Err(Error::invalid_transition(card_id, "card already matched"));
        }
        if card.is_flipped {
            return Err(Error::invalid_transition(card_id, "card already flipped"));
        }

        card.is_flipped = true;
        self.flipped.push(card_id);

        if let &[first, second] = self.flipped.as_slice() {
            self.moves += 1;
            let pending = PendingResolution {
                round: self.id,
                first,
                second,
            };
            self.phase = RoundPhase::Evaluating(pending);
            debug!(
                "Round {}: cards {} and {} revealed (move {})",
                self.id, first, second, self.moves
            );
            return Ok(FlipOutcome::Evaluating(pending));
        }

        Ok(FlipOutcome::Revealed)
    }

    /// Apply the match decision for a pair revealed earlier
    ///
    /// Returns no events when `pending` no longer describes what this round
    /// is waiting on (another round, or a pair already resolved).
    pub fn resolve(
        &mut self,
        pending: &PendingResolution,
        now: DateTime<Utc>,
        scoring: &ScoringPolicy,
    ) -> Vec<RoundEvent> {
        if self.phase != RoundPhase::Evaluating(*pending) {
            debug!(
                "Round {}: ignoring stale resolution for round {} ({}, {})",
                self.id, pending.round, pending.first, pending.second
            );
            return Vec::new();
        }

        let symbols = (
            self.card(pending.first).map(|c| c.symbol.clone()),
            self.card(pending.second).map(|c| c.symbol.clone()),
        );

        let mut events = Vec::with_capacity(2);
        match symbols {
            (Some(a), Some(b)) if a == b => {
                for card in self.cards.iter_mut() {
                    if card.id == pending.first || card.id == pending.second {
                        card.is_matched = true;
                    }
                }
                self.matched_pairs = (self.matched_pairs + 1).min(self.total_pairs());
                self.score = self.score.saturating_add(scoring.match_reward());
                events.push(RoundEvent::Matched {
                    first: pending.first,
                    second: pending.second,
                    symbol: a,
                    score: self.score,
                });
            }
            _ => {
                for card in self.cards.iter_mut() {
                    if card.id == pending.first || card.id == pending.second {
                        card.is_flipped = false;
                    }
                }
                events.push(RoundEvent::Mismatched {
                    first: pending.first,
                    second: pending.second,
                });
            }
        }

        self.flipped.clear();
        self.phase = RoundPhase::Playing;

        if let Some(summary) = self.try_complete(now, scoring) {
            events.push(RoundEvent::Completed(summary));
        }

        events
    }

    /// Enter the terminal phase if every pair is matched
    ///
    /// Produces the summary exactly once; later calls return `None`.
    pub fn try_complete(
        &mut self,
        now: DateTime<Utc>,
        scoring: &ScoringPolicy,
    ) -> Option<CompletionSummary> {
        if self.completion.is_some()
            || self.phase == RoundPhase::Idle
            || self.phase.is_evaluating()
            || self.matched_pairs < self.total_pairs()
        {
            return None;
        }

        let elapsed_seconds = self.elapsed_seconds(now);
        let time_bonus = scoring.time_bonus(elapsed_seconds);
        let final_score = scoring.final_score(self.score, elapsed_seconds);

        self.score = final_score;
        self.phase = RoundPhase::Completed;

        let summary = CompletionSummary {
            round: self.id,
            final_score,
            time_bonus,
            elapsed_seconds,
            moves: self.moves,
        };
        self.completion = Some(summary);

        info!(
            "Round {} completed: score {} ({} bonus), {}s, {} moves",
            self.id, final_score, time_bonus, elapsed_seconds, self.moves
        );
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::deck::Symbol;

    fn card(id: CardId, symbol: &str) -> Card {
        Card::face_down(id, Symbol::from(symbol))
    }

    /// dog(0) dog(1) cat(2) cat(3)
    fn two_pair_round(now: DateTime<Utc>) -> Round {
        Round::start(
            RoundId(1),
            vec![card(0, "dog"), card(1, "dog"), card(2, "cat"), card(3, "cat")],
            now,
        )
    }

    fn pending_of(outcome: FlipOutcome) -> PendingResolution {
        match outcome {
            FlipOutcome::Evaluating(pending) => pending,
            other => panic!("expected evaluation, got {:?}", other),
        }
    }

    #[test]
    fn test_idle_round_rejects_flips() {
        let mut round = Round::idle(RoundId(0));
        assert_eq!(round.phase(), RoundPhase::Idle);
        assert!(round.flip(0).unwrap_err().is_invalid_transition());
    }

    #[test]
    fn test_first_flip_reveals() {
        let now = Utc::now();
        let mut round = two_pair_round(now);

        assert_eq!(round.flip(0).unwrap(), FlipOutcome::Revealed);
        assert_eq!(round.flipped_ids(), &[0]);
        assert!(round.card(0).unwrap().is_flipped);
        assert_eq!(round.moves(), 0);
    }

    #[test]
    fn test_second_flip_counts_move_immediately() {
        let now = Utc::now();
        let mut round = two_pair_round(now);

        round.flip(0).unwrap();
        let pending = pending_of(round.flip(2).unwrap());

        assert_eq!(pending.round, RoundId(1));
        assert_eq!((pending.first, pending.second), (0, 2));
        assert_eq!(round.moves(), 1);
        assert!(round.phase().is_evaluating());
    }

    #[test]
    fn test_same_card_twice_rejected() {
        let mut round = two_pair_round(Utc::now());
        round.flip(0).unwrap();

        let err = round.flip(0).unwrap_err();
        assert!(err.to_string().contains("already flipped"));
        assert_eq!(round.flipped_ids(), &[0]);
    }

    #[test]
    fn test_flip_during_evaluation_rejected() {
        let mut round = two_pair_round(Utc::now());
        round.flip(0).unwrap();
        round.flip(2).unwrap();

        assert!(round.flip(1).unwrap_err().is_invalid_transition());
        assert!(!round.card(1).unwrap().is_flipped);
    }

    #[test]
    fn test_unknown_card_rejected() {
        let mut round = two_pair_round(Utc::now());
        assert!(round.flip(42).is_err());
        assert!(round.flipped_ids().is_empty());
    }

    #[test]
    fn test_match_resolution() {
        let now = Utc::now();
        let mut round = two_pair_round(now);
        round.flip(0).unwrap();
        let pending = pending_of(round.flip(1).unwrap());

        let events = round.resolve(&pending, now, &ScoringPolicy::default());

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], RoundEvent::Matched { score: 100, .. }));
        assert!(round.card(0).unwrap().is_matched && round.card(0).unwrap().is_flipped);
        assert!(round.card(1).unwrap().is_matched);
        assert_eq!(round.matched_pairs(), 1);
        assert_eq!(round.score(), 100);
        assert!(round.flipped_ids().is_empty());
        assert_eq!(round.phase(), RoundPhase::Playing);
    }

    #[test]
    fn test_mismatch_resolution() {
        let now = Utc::now();
        let mut round = two_pair_round(now);
        round.flip(0).unwrap();
        let pending = pending_of(round.flip(3).unwrap());

        let events = round.resolve(&pending, now, &ScoringPolicy::default());

        assert_eq!(events, vec![RoundEvent::Mismatched { first: 0, second: 3 }]);
        assert!(!round.card(0).unwrap().is_flipped);
        assert!(!round.card(3).unwrap().is_flipped);
        assert_eq!(round.score(), 0);
        assert_eq!(round.moves(), 1);
        assert!(round.flipped_ids().is_empty());
    }

    #[test]
    fn test_matched_card_cannot_be_flipped() {
        let now = Utc::now();
        let mut round = two_pair_round(now);
        round.flip(0).unwrap();
        let pending = pending_of(round.flip(1).unwrap());
        round.resolve(&pending, now, &ScoringPolicy::default());

        let err = round.flip(0).unwrap_err();
        assert!(err.to_string().contains("already matched"));
    }

    #[test]
    fn test_stale_resolution_ignored() {
        let now = Utc::now();
        let mut round = two_pair_round(now);
        round.flip(0).unwrap();
        let pending = pending_of(round.flip(1).unwrap());

        let foreign = PendingResolution {
            round: RoundId(99),
            ..pending
        };
        assert!(round.resolve(&foreign, now, &ScoringPolicy::default()).is_empty());
        assert!(round.phase().is_evaluating());

        // Resolving twice applies once
        assert_eq!(round.resolve(&pending, now, &ScoringPolicy::default()).len(), 1);
        assert!(round.resolve(&pending, now, &ScoringPolicy::default()).is_empty());
        assert_eq!(round.score(), 100);
    }

    #[test]
    fn test_completion_with_time_bonus() {
        let start = Utc::now();
        let scoring = ScoringPolicy::default();
        let mut round = two_pair_round(start);

        round.flip(0).unwrap();
        let p = pending_of(round.flip(1).unwrap());
        round.resolve(&p, start, &scoring);

        round.flip(2).unwrap();
        let p = pending_of(round.flip(3).unwrap());
        let events = round.resolve(&p, start + Duration::seconds(250), &scoring);

        let summary = events.last().and_then(|e| e.completion()).copied().unwrap();
        assert_eq!(summary.final_score, 250);
        assert_eq!(summary.time_bonus, 50);
        assert_eq!(summary.elapsed_seconds, 250);
        assert_eq!(summary.moves, 2);
        assert!(round.is_completed());
        assert_eq!(round.score(), 250);
    }

    #[test]
    fn test_completion_fires_once() {
        let start = Utc::now();
        let scoring = ScoringPolicy::default();
        let mut round = two_pair_round(start);
        for (a, b) in [(0, 1), (2, 3)] {
            round.flip(a).unwrap();
            let p = pending_of(round.flip(b).unwrap());
            round.resolve(&p, start, &scoring);
        }

        assert!(round.is_completed());
        assert!(round.try_complete(start, &scoring).is_none());
        assert!(round.try_complete(start + Duration::seconds(5), &scoring).is_none());
        assert_eq!(round.score(), 500);
        assert!(round.flip(0).is_err());
    }

    #[test]
    fn test_empty_deck_completes_immediately() {
        let now = Utc::now();
        let mut round = Round::start(RoundId(3), Vec::new(), now);

        assert_eq!(round.total_pairs(), 0);
        let summary = round.try_complete(now, &ScoringPolicy::default()).unwrap();
        assert_eq!(summary.final_score, 300);
        assert!(round.is_completed());
        assert!(round.try_complete(now, &ScoringPolicy::default()).is_none());
    }

    #[test]
    fn test_elapsed_frozen_after_completion() {
        let start = Utc::now();
        let mut round = Round::start(RoundId(3), Vec::new(), start);
        round.try_complete(start + Duration::seconds(12), &ScoringPolicy::default());

        assert_eq!(round.elapsed_seconds(start + Duration::seconds(500)), 12);
    }
}
