use axum::{
    routing::{get, post},
    Router,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::auth;
use crate::api::ws;
use crate::config::Config;
use crate::db::repo::GameStore;
use crate::engine::prompts::PromptRegistry;
use crate::rooms::registry::RoomRegistry;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub prompts: PromptRegistry,
    pub rooms: RoomRegistry,
    pub game_store: GameStore,
}

pub async fn start_server(config: Config) {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to SQLite");

    crate::db::repo::create_user_table(&pool)
        .await
        .expect("Failed to create user table");
    crate::db::repo::create_game_table(&pool)
        .await
        .expect("Failed to create game table");

    let game_store = if config.database_url == "sqlite::memory:" {
        GameStore::Noop
    } else {
        GameStore::Sqlite(pool.clone())
    };

    let state = Arc::new(AppState {
        db: pool,
        config: config.clone(),
        prompts: PromptRegistry::new(),
        rooms: RoomRegistry::new(),
        game_store,
    });

    let cors = CorsLayer::permissive();

    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind");

    info!(bind_addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await.expect("Server failed");
}
