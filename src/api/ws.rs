use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api::events::{ClientMessage, ServerMessage};
use crate::api::server::AppState;
use crate::rooms::room::RoomEvent;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    token: String,
    room: String,
    /// Comma-separated player ids; only consulted the first time `room` is
    /// seen, to seat the room's fixed player list (no matchmaking — §1).
    players: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(params): Query<WsParams>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, params))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, params: WsParams) {
    let Some(user_id) = crate::api::auth::verify_token(&state.config.jwt_secret, &params.token)
    else {
        warn!("rejected websocket upgrade: invalid token");
        return;
    };

    let players: Vec<String> = match &params.players {
        Some(raw) => raw.split(',').map(|s| s.to_string()).collect(),
        None => vec![user_id.clone()],
    };

    let room_tx = state
        .rooms
        .get_or_create(
            &params.room,
            players,
            state.prompts.clone(),
            state.game_store.clone(),
            state.config.prompt_timeout,
        )
        .await;

    let (mut ws_sink, mut ws_stream) = socket.split();
    let (event_tx, mut event_rx) = mpsc::channel::<ServerMessage>(64);

    let outbound = tokio::spawn(async move {
        while let Some(msg) = event_rx.recv().await {
            let Ok(text) = serde_json::to_string(&msg) else {
                continue;
            };
            if ws_sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    if room_tx
        .send(RoomEvent::PlayerJoined(user_id.clone(), event_tx))
        .await
        .is_err()
    {
        warn!(user_id, room = %params.room, "room mailbox closed before join");
        outbound.abort();
        return;
    }
    info!(user_id, room = %params.room, "connection joined room");

    while let Some(Ok(msg)) = ws_stream.next().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) else {
            continue;
        };

        match client_msg {
            ClientMessage::PerformTurn { cards } => {
                let _ = room_tx
                    .send(RoomEvent::PerformTurn(user_id.clone(), cards))
                    .await;
            }
            // Resolved directly against the process-wide registry, bypassing
            // the room mailbox entirely (Design Note D-1).
            ClientMessage::RequestCard { card } => {
                state.prompts.resolve_card_request(&user_id, card).await;
            }
            ClientMessage::SetLastCardStatus { is_last_card } => {
                state.prompts.resolve_last_card(&user_id, is_last_card).await;
            }
        }
    }

    state.prompts.cancel_all(&user_id).await;
    let _ = room_tx.send(RoomEvent::PlayerLeft(user_id.clone())).await;
    outbound.abort();
    info!(user_id, room = %params.room, "connection closed");
}
