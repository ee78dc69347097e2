use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, info_span, Instrument};

use crate::api::events::ServerMessage;
use crate::db::repo::GameStore;
use crate::engine::card::Card;
use crate::engine::game::Game;
use crate::engine::orchestrator::{self, EventSink, Outcome};
use crate::engine::prompts::PromptRegistry;
use crate::rooms::registry::RoomRegistry;

#[derive(Debug)]
pub enum RoomEvent {
    PlayerJoined(String, mpsc::Sender<ServerMessage>),
    PlayerLeft(String),
    PerformTurn(String, Vec<Card>),
}

/// One room: a single-task actor owning one `Game` and serializing every
/// `PerformTurn` call against it through this mailbox, per the per-game
/// isolation requirement.
pub struct Room {
    id: String,
    game: Game,
    player_channels: HashMap<String, mpsc::Sender<ServerMessage>>,
    receiver: mpsc::Receiver<RoomEvent>,
    prompts: PromptRegistry,
    store: GameStore,
    prompt_timeout: Duration,
    registry: RoomRegistry,
}

impl Room {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        players: Vec<String>,
        receiver: mpsc::Receiver<RoomEvent>,
        _sender: mpsc::Sender<RoomEvent>,
        prompts: PromptRegistry,
        store: GameStore,
        prompt_timeout: Duration,
        registry: RoomRegistry,
    ) -> Self {
        let mut game = Game::new(players);
        game.start();

        Self {
            id,
            game,
            player_channels: HashMap::new(),
            receiver,
            prompts,
            store,
            prompt_timeout,
            registry,
        }
    }

    pub async fn run(mut self) {
        let span = info_span!("room", room_id = %self.id);
        async move {
            info!("room started with {} players", self.game.player_count());

            while let Some(event) = self.receiver.recv().await {
                match event {
                    RoomEvent::PlayerJoined(user_id, sender) => {
                        info!(user_id, "player joined");
                        sender
                            .send(ServerMessage::UpdateGameStatus {
                                is_started: self.game.is_started,
                            })
                            .await
                            .ok();
                        self.player_channels.insert(user_id, sender);
                    }
                    RoomEvent::PlayerLeft(user_id) => {
                        info!(user_id, "player left");
                        self.player_channels.remove(&user_id);
                        self.prompts.cancel_all(&user_id).await;
                    }
                    RoomEvent::PerformTurn(user_id, cards) => {
                        let sink = EventSink::new(&self.player_channels);
                        let outcome = orchestrator::perform_turn(
                            &self.id,
                            &mut self.game,
                            &user_id,
                            cards,
                            &self.prompts,
                            &sink,
                            &self.store,
                            self.prompt_timeout,
                        )
                        .await;

                        if let Outcome::GameEnded { reason, .. } = outcome {
                            info!(reason, "game ended, tearing down room");
                            break;
                        }
                    }
                }
            }

            self.registry.remove(&self.id).await;
            info!("room loop ended");
        }
        .instrument(span)
        .await
    }
}
