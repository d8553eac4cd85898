//! Every engine transition, wrapped in a room transaction.

use std::sync::Arc;

use konchina_engine::domain::new_game_seed;
use konchina_engine::errors::{ConflictKind, DomainError, ValidationKind};
use konchina_engine::{
    derive_room_transitions, Card, GameOutcome, GameState, GameStatus, JoinOutcome, MoveOutcome,
    PlayerSnapshot, RoomTransition,
};
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::broker::{RoomBroker, RoomEvent};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::store::{DocumentStore, RoomWatch, Versioned};
use crate::txn::with_room_txn;

/// A committed (or no-op) transition as seen by the caller.
#[derive(Debug, Clone)]
pub struct Commit<T> {
    pub version: u64,
    pub state: GameState,
    pub transitions: Vec<RoomTransition>,
    /// Attempts the transaction needed; more than one means it lost a race.
    pub attempts: u32,
    pub value: T,
}

/// Result of reporting an expired turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutOutcome {
    /// The idle player's consecutive timeout count after this report.
    pub consecutive: u32,
    /// The report pushed the idle player over the AFK limit.
    pub forfeited: bool,
    pub outcome: MoveOutcome,
}

/// Room operations for any number of peers sharing one store.
#[derive(Clone)]
pub struct RoomService {
    store: Arc<dyn DocumentStore>,
    broker: Arc<RoomBroker>,
    config: Arc<SyncConfig>,
}

impl RoomService {
    pub fn new(store: Arc<dyn DocumentStore>, config: SyncConfig) -> Self {
        Self::with_broker(store, config, Arc::new(RoomBroker::default()))
    }

    pub fn with_broker(
        store: Arc<dyn DocumentStore>,
        config: SyncConfig,
        broker: Arc<RoomBroker>,
    ) -> Self {
        Self {
            store,
            broker,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn broker(&self) -> Arc<RoomBroker> {
        self.broker.clone()
    }

    /// Create the room with `player_id` as host, or join it as the second
    /// player. Re-joining a room you already sit in is a no-op.
    pub async fn create_or_join(
        &self,
        room_id: &str,
        player_id: &str,
    ) -> Result<Commit<JoinOutcome>, SyncError> {
        self.create_or_join_seeded(room_id, player_id, None).await
    }

    /// As `create_or_join`, with a fixed dealing seed if this call creates
    /// the room. A fresh OS-random seed is drawn otherwise.
    pub async fn create_or_join_seeded(
        &self,
        room_id: &str,
        player_id: &str,
        seed: Option<u64>,
    ) -> Result<Commit<JoinOutcome>, SyncError> {
        let rules = self.config.rules.clone();
        self.mutate(room_id, "create_or_join", |current| match current {
            None => {
                let seed = seed.unwrap_or_else(new_game_seed);
                let state = konchina_engine::create_room(room_id, player_id, rules.clone(), seed);
                Ok((state, JoinOutcome::Seated { seat: 0 }))
            }
            Some(mut state) => {
                let outcome = konchina_engine::join_room(&mut state, player_id)?;
                Ok((state, outcome))
            }
        })
        .await
    }

    /// Play `played` for `player_id`, capturing `chosen` (empty to lay).
    ///
    /// The move is re-applied to the freshly read room on every attempt, so a
    /// submission made against a stale view fails with the engine's
    /// precondition error instead of overwriting the newer state.
    pub async fn submit_move(
        &self,
        room_id: &str,
        player_id: &str,
        played: Card,
        chosen: &[Card],
    ) -> Result<Commit<MoveOutcome>, SyncError> {
        let now = OffsetDateTime::now_utc();
        self.mutate(room_id, "submit_move", |current| {
            let mut state = require_room(room_id, current)?;
            let outcome = konchina_engine::apply_move(&mut state, player_id, played, chosen, now)?;
            Ok((state, outcome))
        })
        .await
    }

    pub async fn forfeit(&self, room_id: &str, player_id: &str) -> Result<Commit<()>, SyncError> {
        self.mutate(room_id, "forfeit", |current| {
            let mut state = require_room(room_id, current)?;
            konchina_engine::forfeit(&mut state, player_id)?;
            Ok((state, ()))
        })
        .await
    }

    /// Report that `player_id`'s turn expired while the room was at
    /// `observed_sequence`.
    ///
    /// The idle player's first card is laid for them. With an AFK limit
    /// configured, reaching it forfeits the idle player in the same write.
    pub async fn record_timeout(
        &self,
        room_id: &str,
        player_id: &str,
        observed_sequence: u64,
    ) -> Result<Commit<TimeoutOutcome>, SyncError> {
        let now = OffsetDateTime::now_utc();
        let afk_limit = self.config.afk_forfeit_after;
        let commit = self
            .mutate(room_id, "record_timeout", |current| {
                let mut state = require_room(room_id, current)?;
                let outcome =
                    konchina_engine::record_timeout(&mut state, player_id, observed_sequence, now)?;
                let consecutive = state
                    .consecutive_timeouts
                    .get(player_id)
                    .copied()
                    .unwrap_or(0);

                let over_limit = afk_limit.is_some_and(|limit| consecutive >= limit);
                let forfeited = over_limit && state.game_status != GameStatus::Finished;
                if forfeited {
                    konchina_engine::forfeit(&mut state, player_id)?;
                }
                Ok((
                    state,
                    TimeoutOutcome {
                        consecutive,
                        forfeited,
                        outcome,
                    },
                ))
            })
            .await?;

        if commit.value.forfeited {
            warn!(
                room_id,
                player_id,
                consecutive = commit.value.consecutive,
                "Player forfeited for inactivity"
            );
        }
        Ok(commit)
    }

    /// Record that `player_id` has seen round `round_sequence`'s summary.
    /// The value is whether this ack cleared the summary.
    pub async fn acknowledge_round_score(
        &self,
        room_id: &str,
        player_id: &str,
        round_sequence: u64,
    ) -> Result<Commit<bool>, SyncError> {
        self.mutate(room_id, "acknowledge_round_score", |current| {
            let mut state = require_room(room_id, current)?;
            let cleared =
                konchina_engine::acknowledge_round_score(&mut state, player_id, round_sequence)?;
            Ok((state, cleared))
        })
        .await
    }

    pub async fn load(&self, room_id: &str) -> Result<Versioned<GameState>, SyncError> {
        self.store
            .get(room_id)
            .await?
            .ok_or_else(|| SyncError::room_not_found(room_id))
    }

    pub async fn snapshot(&self, room_id: &str, viewer: &str) -> Result<PlayerSnapshot, SyncError> {
        let current = self.load(room_id).await?;
        Ok(PlayerSnapshot::for_player(&current.doc, viewer)?)
    }

    /// Final result once the room has finished.
    pub async fn outcome(&self, room_id: &str) -> Result<Option<GameOutcome>, SyncError> {
        let current = self.load(room_id).await?;
        Ok(GameOutcome::from_state(&current.doc))
    }

    /// Full room state after every committed write.
    pub fn subscribe(&self, room_id: &str) -> RoomWatch {
        self.store.subscribe(room_id)
    }

    /// Derived transitions after every committed write.
    pub fn events(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        self.broker.subscribe(room_id)
    }

    async fn mutate<T, F>(
        &self,
        room_id: &str,
        op: &'static str,
        f: F,
    ) -> Result<Commit<T>, SyncError>
    where
        F: FnMut(Option<GameState>) -> Result<(GameState, T), SyncError>,
    {
        let txn = match with_room_txn(self.store.as_ref(), &self.config, room_id, f).await {
            Ok(txn) => txn,
            Err(err) => {
                debug!(room_id, op, code = %err.code(), error = %err, "Room operation refused");
                return Err(err);
            }
        };

        let transitions = derive_room_transitions(txn.before.as_ref(), &txn.after);
        if txn.written {
            info!(
                room_id,
                op,
                version = txn.version,
                attempts = txn.attempts,
                transitions = transitions.len(),
                "Room updated"
            );
            if !transitions.is_empty() {
                self.broker.publish(RoomEvent {
                    room_id: room_id.to_string(),
                    version: txn.version,
                    transitions: transitions.clone(),
                });
            }
        }

        Ok(Commit {
            version: txn.version,
            state: txn.after,
            transitions,
            attempts: txn.attempts,
            value: txn.value,
        })
    }
}

fn require_room(room_id: &str, current: Option<GameState>) -> Result<GameState, SyncError> {
    current.ok_or_else(|| SyncError::room_not_found(room_id))
}

/// Whether `err` means the room has already moved on without us.
pub fn is_stale(err: &SyncError) -> bool {
    matches!(
        err,
        SyncError::Domain(DomainError::Validation(
            ValidationKind::OutOfTurn | ValidationKind::StaleSequence | ValidationKind::PhaseMismatch,
            _
        )) | SyncError::Domain(DomainError::Conflict(ConflictKind::AlreadyFinished, _))
    )
}
