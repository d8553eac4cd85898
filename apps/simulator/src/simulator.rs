//! One simulated match: two peers racing on a shared in-memory store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use konchina_engine::{GameStatus, PlayerId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use room_sync::{is_stale, MemoryDocumentStore, RoomClient, RoomService, SyncConfig, SyncError};
use serde::Serialize;
use tracing::{debug, info};
use ulid::Ulid;

/// Chance a peer lays its card even when it could capture.
const LAY_PROBABILITY: f64 = 0.15;

#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub game: u32,
    pub room_id: String,
    pub seed: Option<u64>,
    pub winner: Option<PlayerId>,
    pub scores: BTreeMap<PlayerId, u32>,
    pub rounds: u64,
    pub moves: u32,
    pub conflicts: u64,
    pub duration_ms: f64,
}

pub struct Simulator {
    config: SyncConfig,
}

impl Simulator {
    pub fn new(config: SyncConfig) -> Self {
        Self { config }
    }

    /// Play one game to completion on a fresh store.
    ///
    /// With a seed, both the deal and each peer's choices are reproducible;
    /// only the interleaving of their writes is left to the scheduler.
    pub async fn run_game(&self, game: u32, seed: Option<u64>) -> Result<GameReport, SyncError> {
        let started = Instant::now();
        let store = Arc::new(MemoryDocumentStore::new());
        let service = RoomService::new(store.clone(), self.config.clone());
        let room_id = format!("sim-{}", Ulid::new());

        let host = RoomClient::connect_seeded(service.clone(), room_id.clone(), "host", seed).await?;
        let guest = RoomClient::connect(service.clone(), room_id.clone(), "guest").await?;

        let base = seed.unwrap_or_else(rand::random);
        let host_task = tokio::spawn(play_peer(host, base));
        let guest_task = tokio::spawn(play_peer(guest, base.wrapping_add(1)));
        let host_moves = join_peer(host_task).await?;
        let guest_moves = join_peer(guest_task).await?;

        let outcome = service
            .outcome(&room_id)
            .await?
            .ok_or_else(|| SyncError::internal(format!("room {room_id} did not finish")))?;

        let report = GameReport {
            game,
            room_id,
            seed,
            winner: outcome.winner,
            scores: outcome.scores,
            rounds: outcome.rounds_played,
            moves: host_moves + guest_moves,
            conflicts: store.conflicts(),
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
        info!(
            game,
            room_id = %report.room_id,
            winner = ?report.winner,
            rounds = report.rounds,
            moves = report.moves,
            conflicts = report.conflicts,
            "Game finished"
        );
        Ok(report)
    }
}

async fn join_peer(
    handle: tokio::task::JoinHandle<Result<u32, SyncError>>,
) -> Result<u32, SyncError> {
    handle
        .await
        .map_err(|e| SyncError::internal(format!("peer task failed: {e}")))?
}

/// Act whenever it is this peer's turn until the room finishes.
async fn play_peer(mut client: RoomClient, seed: u64) -> Result<u32, SyncError> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut moves = 0;

    loop {
        let current = client.wait_for_turn().await?;
        if current.doc.game_status == GameStatus::Finished {
            debug!(player_id = client.player_id(), moves, "Peer done");
            return Ok(moves);
        }

        if let Err(err) = client.acknowledge_round_score().await {
            if !is_stale(&err) {
                return Err(err);
            }
        }

        let hand = client.snapshot()?.hand;
        if hand.is_empty() {
            continue;
        }
        let card = hand[rng.random_range(0..hand.len())];
        let candidates = client.select_card(card)?.len();
        let choice = if candidates == 0 || rng.random_bool(LAY_PROBABILITY) {
            None
        } else {
            Some(rng.random_range(0..candidates))
        };
        client.choose_candidate(choice)?;

        match client.submit().await {
            Ok(_) => moves += 1,
            Err(err) if is_stale(&err) => {
                debug!(player_id = client.player_id(), error = %err, "Move overtaken, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}
