//! Property-based tests for round and leaderboard invariants

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use pairmatch_core::cache::{LEGACY_LEADERBOARD_KEY, LocalCache, MemoryCache};
use pairmatch_core::deck::{deck_rng, generate_deck};
use pairmatch_core::round::{FlipOutcome, PendingResolution};
use pairmatch_core::{
    InMemoryBackend, LeaderboardStore, LegacyMigration, NewEntry, PlayerName, Round, RoundId,
    RoundPhase, ScoringPolicy, Symbol,
};

#[derive(Debug, Clone)]
enum Step {
    Flip(u32),
    Settle,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0u32..12).prop_map(Step::Flip),
        1 => Just(Step::Settle),
    ]
}

fn symbols(pairs: usize) -> Vec<Symbol> {
    (0..pairs).map(|i| Symbol::new(format!("s{}", i))).collect()
}

fn dealt_round(pairs: usize, seed: u64) -> Round {
    let mut rng = deck_rng(Some(seed));
    let cards = generate_deck(&symbols(pairs), &mut rng);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    Round::start(RoundId(1), cards, start)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Random flip and settle sequences never break the round invariants
    #[test]
    fn prop_round_invariants_hold(
        pairs in 1usize..=6,
        seed in any::<u64>(),
        steps in prop::collection::vec(step(), 0..120),
    ) {
        let scoring = ScoringPolicy::default();
        let mut round = dealt_round(pairs, seed);
        let mut pending: Option<PendingResolution> = None;
        let mut completions = 0usize;
        let mut last_matched = 0usize;
        let mut last_moves = 0u32;
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 1, 0).unwrap();

        for step in steps {
            match step {
                Step::Flip(id) => {
                    if let Ok(FlipOutcome::Evaluating(p)) = round.flip(id) {
                        pending = Some(p);
                    }
                }
                Step::Settle => {
                    if let Some(p) = pending.take() {
                        let events = round.resolve(&p, now, &scoring);
                        completions += events.iter().filter(|e| e.completion().is_some()).count();
                    }
                }
            }

            let revealed = round
                .cards()
                .iter()
                .filter(|c| c.is_flipped && !c.is_matched)
                .count();
            prop_assert!(revealed <= 2, "{} unmatched cards face up", revealed);
            prop_assert!(round.flipped_ids().len() <= 2);
            prop_assert!(round.matched_pairs() <= round.total_pairs());
            prop_assert!(round.matched_pairs() >= last_matched);
            prop_assert!(round.moves() >= last_moves);
            prop_assert_eq!(
                round.cards().iter().filter(|c| c.is_matched).count(),
                round.matched_pairs() * 2
            );
            if round.phase() == RoundPhase::Completed {
                prop_assert_eq!(round.matched_pairs(), round.total_pairs());
            }
            last_matched = round.matched_pairs();
            last_moves = round.moves();
        }

        prop_assert!(completions <= 1);
    }

    /// Resolving the same pair twice only applies it once
    #[test]
    fn prop_resolution_applied_once(seed in any::<u64>()) {
        let scoring = ScoringPolicy::default();
        let mut round = dealt_round(3, seed);
        let now = Utc::now();

        round.flip(0).unwrap();
        let pending = match round.flip(1).unwrap() {
            FlipOutcome::Evaluating(p) => p,
            FlipOutcome::Revealed => unreachable!(),
        };

        let first = round.resolve(&pending, now, &scoring);
        let score = round.score();
        let second = round.resolve(&pending, now, &scoring);

        prop_assert_eq!(first.len(), 1);
        prop_assert!(second.is_empty());
        prop_assert_eq!(round.score(), score);
    }

    /// The top list is always ranked by score, then by time
    #[test]
    fn prop_query_top_is_ranked(
        rows in prop::collection::vec((0u32..2000, 0u32..600), 0..40),
        limit in 1usize..20,
    ) {
        let store = LeaderboardStore::new(Arc::new(InMemoryBackend::new()));
        let entries: Vec<NewEntry> = rows
            .iter()
            .map(|&(score, time)| {
                NewEntry::new(PlayerName::parse("p").unwrap(), score, time, 10)
            })
            .collect();
        store.insert_many(&entries).unwrap();

        let top = store.query_top(limit);
        prop_assert_eq!(top.len(), rows.len().min(limit));
        for pair in top.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                a.score > b.score || (a.score == b.score && a.time_seconds <= b.time_seconds),
                "{}/{} ranked before {}/{}", a.score, a.time_seconds, b.score, b.time_seconds
            );
        }
    }

    /// Running the migration again never duplicates rows
    #[test]
    fn prop_migration_is_idempotent(
        rows in prop::collection::vec((0u32..2000, 1u32..600, 1u32..60), 1..10),
        runs in 2usize..5,
    ) {
        let legacy: Vec<_> = rows
            .iter()
            .enumerate()
            .map(|(i, &(score, time, moves))| serde_json::json!({
                "playerName": format!("player{}", i),
                "score": score,
                "time": time,
                "moves": moves,
            }))
            .collect();

        let cache = Arc::new(MemoryCache::new());
        cache
            .set(LEGACY_LEADERBOARD_KEY, &serde_json::to_string(&legacy).unwrap())
            .unwrap();
        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(LeaderboardStore::new(backend.clone()));
        let migration = LegacyMigration::new(cache, store);

        for _ in 0..runs {
            migration.migrate().unwrap();
        }

        prop_assert_eq!(backend.len(), rows.len());
        prop_assert_eq!(backend.insert_calls(), 1);
    }
}
