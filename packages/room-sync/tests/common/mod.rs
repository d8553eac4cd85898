#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use konchina_engine::{legal_captures, Card, GameState, GameStatus};
use konchina_test_support::{unique_players, unique_room_id};
use room_sync::{
    DocumentStore, MemoryDocumentStore, RoomService, RoomWatch, SyncConfig, SyncError, Versioned,
};

// Logging is auto-installed for every integration test binary
#[ctor::ctor]
fn init_logging() {
    konchina_test_support::test_logging::init();
}

/// Default config without backoff sleeps.
pub fn fast_config() -> SyncConfig {
    SyncConfig {
        txn_backoff_ms: 0,
        ..SyncConfig::default()
    }
}

pub fn memory_service(config: SyncConfig) -> (Arc<MemoryDocumentStore>, RoomService) {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = RoomService::new(store.clone(), config);
    (store, service)
}

pub struct StartedRoom {
    pub room_id: String,
    pub host: String,
    pub guest: String,
}

/// Create a room and seat two players through the service.
pub async fn start_room(service: &RoomService, seed: u64) -> StartedRoom {
    let room_id = unique_room_id();
    let (host, guest) = unique_players();
    service
        .create_or_join_seeded(&room_id, &host, Some(seed))
        .await
        .expect("host creates");
    service
        .create_or_join(&room_id, &guest)
        .await
        .expect("guest joins");
    StartedRoom {
        room_id,
        host,
        guest,
    }
}

/// A legal move for whoever is on turn: first hand card, first capture if any.
pub fn first_legal_move(state: &GameState) -> (String, Card, Vec<Card>) {
    let mover = state.current_player_id.clone().expect("someone on turn");
    let card = state.players[&mover].hand[0];
    let chosen = legal_captures(card, &state.table_cards)
        .into_iter()
        .next()
        .unwrap_or_default();
    (mover, card, chosen)
}

/// Play first-legal moves through the service until `stop` holds.
pub async fn play_until<P>(service: &RoomService, room_id: &str, stop: P) -> GameState
where
    P: Fn(&GameState) -> bool,
{
    for _ in 0..10_000 {
        let current = service.load(room_id).await.expect("room exists").doc;
        if stop(&current) || current.game_status == GameStatus::Finished {
            return current;
        }
        let (mover, card, chosen) = first_legal_move(&current);
        service
            .submit_move(room_id, &mover, card, &chosen)
            .await
            .expect("legal move commits");
    }
    panic!("room {room_id} never reached the expected state");
}

/// Store wrapper that refuses the next `n` writes with a version conflict
/// and counts write attempts.
pub struct FlakyStore {
    inner: MemoryDocumentStore,
    refuse_next: AtomicU32,
    writes_attempted: AtomicU32,
}

impl FlakyStore {
    pub fn new(refuse: u32) -> Self {
        Self {
            inner: MemoryDocumentStore::new(),
            refuse_next: AtomicU32::new(refuse),
            writes_attempted: AtomicU32::new(0),
        }
    }

    pub fn refuse_next(&self, n: u32) {
        self.refuse_next.store(n, Ordering::SeqCst);
    }

    pub fn writes_attempted(&self) -> u32 {
        self.writes_attempted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, room_id: &str) -> Result<Option<Versioned<GameState>>, SyncError> {
        self.inner.get(room_id).await
    }

    async fn compare_and_swap(
        &self,
        room_id: &str,
        expected_version: Option<u64>,
        doc: GameState,
    ) -> Result<u64, SyncError> {
        self.writes_attempted.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .refuse_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(SyncError::version_conflict(
                expected_version,
                expected_version.map_or(Some(1), |v| Some(v + 1)),
            ));
        }
        self.inner.compare_and_swap(room_id, expected_version, doc).await
    }

    fn subscribe(&self, room_id: &str) -> RoomWatch {
        self.inner.subscribe(room_id)
    }
}
