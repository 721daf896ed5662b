//! Round orchestrator.
//!
//! Owns the active round and drives everything that happens around it:
//! dealing decks, scheduling the settle delay after a second flip, and
//! recording completed rounds on a background thread. Listeners are called
//! outside the state lock, from whichever thread produced the event.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::deck::{CardId, DeckRng, Symbol, deck_rng, generate_deck};
use crate::error::{Error, Result};
use crate::leaderboard::{LeaderboardEntry, LeaderboardNotifier, LeaderboardStore, NewEntry, PlayerName};
use crate::round::{
    CompletionSummary, FlipOutcome, PendingResolution, Round, RoundEvent, RoundId,
};
use crate::scoring::ScoringPolicy;

use super::SettleTask;

/// Notifications delivered to session listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Round(RoundEvent),
    /// Completed round stored on the leaderboard
    Recorded(LeaderboardEntry),
    /// Completed round could not be stored; it will not be retried
    RecordFailed { round: RoundId, reason: String },
    /// Fresh ranking fetched after a record attempt
    LeaderboardRefreshed(Vec<LeaderboardEntry>),
}

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

struct SessionState {
    round: Round,
    next_round: RoundId,
    rng: DeckRng,
    player: Option<PlayerName>,
    settle: Option<SettleTask>,
    /// Last round that produced its single record attempt; only the active
    /// round can complete, so earlier ids never come back
    last_recorded: Option<RoundId>,
    /// Retired settle workers and record threads still to be joined
    background: Vec<JoinHandle<()>>,
}

impl SessionState {
    fn retire_settle(&mut self) {
        if let Some(task) = self.settle.take() {
            self.track(task.retire());
        }
    }

    fn track(&mut self, handle: Option<JoinHandle<()>>) {
        self.background.retain(|h| !h.is_finished());
        self.background.extend(handle);
    }
}

struct Shared {
    state: Mutex<SessionState>,
    symbols: Vec<Symbol>,
    config: GameConfig,
    scoring: ScoringPolicy,
    clock: Arc<dyn Clock>,
    store: Arc<LeaderboardStore>,
    notifier: Option<Arc<LeaderboardNotifier>>,
    listeners: Mutex<Vec<Listener>>,
}

pub struct OrchestratorBuilder {
    config: GameConfig,
    store: Arc<LeaderboardStore>,
    clock: Arc<dyn Clock>,
    notifier: Option<Arc<LeaderboardNotifier>>,
}

impl OrchestratorBuilder {
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Notifier whose live subscriptions make post-record refreshes redundant
    pub fn notifier(mut self, notifier: Arc<LeaderboardNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<RoundOrchestrator> {
        self.config.validate()?;

        let first_round = RoundId(1);
        let state = SessionState {
            round: Round::idle(first_round),
            next_round: first_round,
            rng: deck_rng(self.config.seed),
            player: None,
            settle: None,
            last_recorded: None,
            background: Vec::new(),
        };

        Ok(RoundOrchestrator {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                symbols: self.config.symbol_set(),
                scoring: self.config.scoring(),
                config: self.config,
                clock: self.clock,
                store: self.store,
                notifier: self.notifier,
                listeners: Mutex::new(Vec::new()),
            }),
        })
    }
}

/// Single-round game session
pub struct RoundOrchestrator {
    shared: Arc<Shared>,
}

impl RoundOrchestrator {
    pub fn builder(store: Arc<LeaderboardStore>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config: GameConfig::default(),
            store,
            clock: Arc::new(SystemClock),
            notifier: None,
        }
    }

    /// Orchestrator with the default configuration and system clock
    pub fn new(store: Arc<LeaderboardStore>) -> Result<Self> {
        Self::builder(store).build()
    }

    pub fn config(&self) -> &GameConfig {
        &self.shared.config
    }

    /// Register a listener for round, record and refresh events
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.shared.lock_listeners().push(Arc::new(listener));
    }

    /// Deal a new round for `player`
    pub fn start(&self, player: PlayerName) -> RoundId {
        let mut state = self.shared.lock_state();
        info!("Starting session for {}", player);
        state.player = Some(player);
        self.shared.deal(&mut state)
    }

    /// Deal a new round for the current player
    pub fn restart(&self) -> Result<RoundId> {
        let mut state = self.shared.lock_state();
        if state.player.is_none() {
            return Err(Error::InvalidPlayerName(
                "no player has started a session".to_string(),
            ));
        }
        Ok(self.shared.deal(&mut state))
    }

    /// Flip a card; returns whether the flip was accepted
    pub fn flip(&self, card_id: CardId) -> bool {
        let pending = {
            let mut state = self.shared.lock_state();
            match state.round.flip(card_id) {
                Ok(FlipOutcome::Revealed) => return true,
                Ok(FlipOutcome::Evaluating(pending)) => {
                    match self.schedule_settle(pending) {
                        Ok(task) => {
                            state.retire_settle();
                            state.settle = Some(task);
                            return true;
                        }
                        Err(e) => {
                            error!("Failed to schedule settle, resolving now: {}", e);
                            pending
                        }
                    }
                }
                Err(e) => {
                    debug!("Ignored flip of card {}: {}", card_id, e);
                    return false;
                }
            }
        };

        self.shared.settle(pending);
        true
    }

    /// Copy of the active round
    pub fn snapshot(&self) -> Round {
        self.shared.lock_state().round.clone()
    }

    pub fn player(&self) -> Option<PlayerName> {
        self.shared.lock_state().player.clone()
    }

    /// Seconds elapsed in the active round
    pub fn elapsed_seconds(&self) -> u64 {
        let now = self.shared.clock.now();
        self.shared.lock_state().round.elapsed_seconds(now)
    }

    /// Block until the pending settle and every record attempt have finished
    ///
    /// Must not be called from a listener.
    pub fn wait_idle(&self) {
        loop {
            let (settle, background) = {
                let mut state = self.shared.lock_state();
                (state.settle.take(), std::mem::take(&mut state.background))
            };
            if settle.is_none() && background.is_empty() {
                break;
            }

            if let Some(task) = settle {
                task.join();
            }
            for handle in background {
                if handle.join().is_err() {
                    warn!("Session background thread panicked");
                }
            }
        }
    }

    fn schedule_settle(&self, pending: PendingResolution) -> Result<SettleTask> {
        let shared = Arc::downgrade(&self.shared);
        SettleTask::schedule(self.shared.config.settle_delay(), pending, move |pending| {
            if let Some(shared) = shared.upgrade() {
                shared.settle(pending);
            }
        })
    }
}

impl Drop for RoundOrchestrator {
    fn drop(&mut self) {
        self.shared.lock_state().retire_settle();
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<Listener>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn deal(&self, state: &mut SessionState) -> RoundId {
        state.retire_settle();

        let id = state.next_round;
        state.next_round = id.next();

        let cards = generate_deck(&self.symbols, &mut state.rng);
        state.round = Round::start(id, cards, self.clock.now());
        id
    }

    /// Apply the delayed match decision and record the round if it completed
    fn settle(self: &Arc<Self>, pending: PendingResolution) {
        let (events, record) = {
            let mut state = self.lock_state();
            let events = state.round.resolve(&pending, self.clock.now(), &self.scoring);

            let completed = events.iter().find_map(RoundEvent::completion).copied();
            let record = match completed {
                Some(summary) if state.last_recorded == Some(summary.round) => {
                    warn!("Round {} was already recorded", summary.round);
                    None
                }
                Some(summary) => {
                    state.last_recorded = Some(summary.round);
                    state.player.clone().map(|player| (player, summary))
                }
                None => None,
            };
            (events, record)
        };

        for event in events {
            self.emit(&SessionEvent::Round(event));
        }

        if let Some((player, summary)) = record {
            self.spawn_record(player, summary);
        }
    }

    fn spawn_record(self: &Arc<Self>, player: PlayerName, summary: CompletionSummary) {
        let shared = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name(format!("record-round-{}", summary.round.0))
            .spawn(move || shared.record(player, summary));

        match spawned {
            Ok(handle) => self.lock_state().track(Some(handle)),
            Err(e) => {
                error!("Failed to start recording round {}: {}", summary.round, e);
                self.emit(&SessionEvent::RecordFailed {
                    round: summary.round,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn record(&self, player: PlayerName, summary: CompletionSummary) {
        let time_seconds = u32::try_from(summary.elapsed_seconds).unwrap_or(u32::MAX);
        let entry = NewEntry::new(player, summary.final_score, time_seconds, summary.moves);

        match self.store.insert(&entry) {
            Ok(row) => self.emit(&SessionEvent::Recorded(row)),
            Err(e) => self.emit(&SessionEvent::RecordFailed {
                round: summary.round,
                reason: e.to_string(),
            }),
        }

        let subscribed = self
            .notifier
            .as_ref()
            .is_some_and(|n| n.active_subscriptions() > 0);
        if !subscribed {
            let top = self.store.top();
            self.emit(&SessionEvent::LeaderboardRefreshed(top));
        }
    }

    fn emit(&self, event: &SessionEvent) {
        let listeners = self.lock_listeners().clone();
        for listener in listeners {
            listener(event);
        }
    }
}
