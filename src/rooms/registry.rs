use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::info;

use crate::db::repo::GameStore;
use crate::engine::prompts::PromptRegistry;
use crate::rooms::room::{Room, RoomEvent};

/// Process-wide map from room id (the invite link) to that room's mailbox.
/// Mirrors the teacher's `active_rooms: Arc<Mutex<HashMap<...>>>` field, just
/// pulled out of `AppState` into its own type since `rooms` now owns the
/// whole room lifecycle rather than leaving it inline on the server state.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<String, mpsc::Sender<RoomEvent>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, room_id: &str) -> Option<mpsc::Sender<RoomEvent>> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    /// Spawns a fresh room actor for `room_id` with the given player list and
    /// registers its mailbox. A no-op if the room already exists.
    pub async fn get_or_create(
        &self,
        room_id: &str,
        players: Vec<String>,
        prompts: PromptRegistry,
        store: GameStore,
        prompt_timeout: std::time::Duration,
    ) -> mpsc::Sender<RoomEvent> {
        let mut rooms = self.rooms.lock().await;
        if let Some(tx) = rooms.get(room_id) {
            return tx.clone();
        }

        let (tx, rx) = mpsc::channel(64);
        let room = Room::new(
            room_id.to_string(),
            players,
            rx,
            tx.clone(),
            prompts,
            store,
            prompt_timeout,
            self.clone(),
        );
        info!(room_id, "spawning room actor");
        tokio::spawn(room.run());
        rooms.insert(room_id.to_string(), tx.clone());
        tx
    }

    /// Torn down by the room itself once its game has ended and its mailbox
    /// has drained (Design Note in DESIGN.md: `EndGame` group-membership
    /// cleanup is a `rooms` concern, not the orchestrator's).
    pub async fn remove(&self, room_id: &str) {
        self.rooms.lock().await.remove(room_id);
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
