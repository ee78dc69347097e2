use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: i64,
}

/// A room's persisted game state, serialized as a JSON blob. Snapshotted
/// after every turn so a restart can pick a room back up where it left off.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameRecord {
    pub room_id: String,
    pub state_json: String,
    pub updated_at: i64,
}
