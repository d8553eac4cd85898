//! In-process fan-out of committed room changes.

use dashmap::DashMap;
use konchina_engine::RoomTransition;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 64;

/// Published once per committed write that changed something observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomEvent {
    pub room_id: String,
    pub version: u64,
    pub transitions: Vec<RoomTransition>,
}

/// Per-room broadcast channels, created on first subscription.
pub struct RoomBroker {
    channels: DashMap<String, broadcast::Sender<RoomEvent>>,
    capacity: usize,
}

impl Default for RoomBroker {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RoomBroker {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        self.channels
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Deliver `event` to the room's subscribers. Returns how many received it.
    ///
    /// A room whose subscribers have all gone away is dropped from the map.
    pub fn publish(&self, event: RoomEvent) -> usize {
        let room_id = event.room_id.clone();
        let delivered = match self.channels.get(&room_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        };
        if delivered == 0 {
            self.channels
                .remove_if(&room_id, |_, sender| sender.receiver_count() == 0);
        }
        trace!(room_id, delivered, "Room event published");
        delivered
    }

    pub fn room_count(&self) -> usize {
        self.channels.len()
    }
}
