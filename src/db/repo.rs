use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::SqlitePool;
use tracing::error;

use crate::db::models::{GameRecord, User};
use crate::engine::game::Game;

pub async fn create_user_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_game_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            room_id TEXT PRIMARY KEY,
            state_json TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn upsert_game(pool: &SqlitePool, room_id: &str, game: &Game) -> Result<(), sqlx::Error> {
    let state_json = serde_json::to_string(game).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    let updated_at = now_unix();
    sqlx::query(
        r#"
        INSERT INTO games (room_id, state_json, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(room_id) DO UPDATE SET state_json = excluded.state_json, updated_at = excluded.updated_at
        "#,
    )
    .bind(room_id)
    .bind(state_json)
    .bind(updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn load_game(pool: &SqlitePool, room_id: &str) -> Option<Game> {
    let record = sqlx::query_as::<_, GameRecord>("SELECT * FROM games WHERE room_id = ?")
        .bind(room_id)
        .fetch_optional(pool)
        .await
        .unwrap_or(None)?;
    serde_json::from_str(&record.state_json).ok()
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// The orchestrator's persist hook. `Noop` backs tests and any deployment
/// that only wants in-memory rooms; `Sqlite` snapshots every turn so a
/// restart can resume a room from its last known state.
#[derive(Clone)]
pub enum GameStore {
    Sqlite(SqlitePool),
    Noop,
}

impl GameStore {
    pub async fn persist(&self, room_id: &str, game: &Game) {
        match self {
            GameStore::Sqlite(pool) => {
                if let Err(err) = upsert_game(pool, room_id, game).await {
                    error!(room_id, %err, "failed to persist game state");
                }
            }
            GameStore::Noop => {}
        }
    }
}

pub async fn get_user(pool: &SqlitePool, username: &str) -> Option<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .unwrap_or(None)
}

pub async fn insert_user(pool: &SqlitePool, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(())
}
