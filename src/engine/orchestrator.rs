//! Drives one `PerformTurn` call end to end: validates through the rule
//! engine, mutates the `Game`, conducts the inline card-request and
//! last-card prompts, replenishes the deck, advances the turn, and decides
//! whether the game has ended.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::api::events::{ServerMessage, SystemMessageType};
use crate::db::repo::GameStore;
use crate::engine::card::{Card, Face};
use crate::engine::game::{Game, RequestLevel, TurnLogEntry, TurnOutcome};
use crate::engine::prompts::PromptRegistry;
use crate::engine::rules::{self, TurnError};

/// The closed set of ways a `PerformTurn` call can be rejected before the
/// rule engine is even consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    #[error("the game hasn't started yet")]
    NotStarted,
    #[error("it isn't your turn")]
    NotYourTurn,
    #[error("you already have an outstanding prompt to answer")]
    OutstandingPrompt,
}

/// What happened as a result of one `perform_turn` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    RejectedOrchestration(OrchestrationError),
    RejectedByRules(TurnError),
    TurnApplied,
    GameEnded { reason: String, winner: Option<String> },
}

/// Fan-out point for the events a turn produces: targeted sends to one
/// player and broadcasts to the whole room. A thin wrapper over the room's
/// per-connection channels so the orchestrator doesn't need to know about
/// `Room` or the WebSocket layer at all.
pub struct EventSink<'a> {
    channels: &'a std::collections::HashMap<String, tokio::sync::mpsc::Sender<ServerMessage>>,
}

impl<'a> EventSink<'a> {
    pub fn new(
        channels: &'a std::collections::HashMap<String, tokio::sync::mpsc::Sender<ServerMessage>>,
    ) -> Self {
        Self { channels }
    }

    pub async fn send_to(&self, player_id: &str, msg: ServerMessage) {
        if let Some(tx) = self.channels.get(player_id) {
            let _ = tx.send(msg).await;
        }
    }

    pub async fn broadcast(&self, msg: ServerMessage) {
        for tx in self.channels.values() {
            let _ = tx.send(msg.clone()).await;
        }
    }

    pub async fn broadcast_except(&self, player_id: &str, msg: ServerMessage) {
        for (id, tx) in self.channels.iter() {
            if id != player_id {
                let _ = tx.send(msg.clone()).await;
            }
        }
    }
}

/// Entry point for `PerformTurn(roomId, playerConnection, cards)`. `room_id`
/// is only used for logging and the persist hook; the `Game` itself is
/// passed by reference so this function has no notion of room lifecycle.
pub async fn perform_turn(
    room_id: &str,
    game: &mut Game,
    actor: &str,
    cards: Vec<Card>,
    prompts: &PromptRegistry,
    sink: &EventSink<'_>,
    store: &GameStore,
    prompt_timeout: Duration,
) -> Outcome {
    if !game.is_started {
        return reject_orchestration(room_id, game, actor, sink, store, OrchestrationError::NotStarted).await;
    }
    if game.current_player_id() != Some(actor) {
        return reject_orchestration(room_id, game, actor, sink, store, OrchestrationError::NotYourTurn).await;
    }
    if prompts.has_outstanding(actor).await {
        return reject_orchestration(
            room_id,
            game,
            actor,
            sink,
            store,
            OrchestrationError::OutstandingPrompt,
        )
        .await;
    }

    // Step 2: cards owed from the previous turn become this player's problem
    // before validation, so a bomb attack left over from the prior player is
    // visible to rule 2 of the engine.
    let rolled_pick = game.give;
    game.give = 0;
    game.pick = rolled_pick;

    if let Err(err) = rules::validate(game, &cards) {
        log_turn(game, actor, cards.clone(), TurnOutcome::Rejected(err.to_string()));
        sink.send_to(actor, ServerMessage::error_for(err)).await;
        sink.send_to(actor, ServerMessage::NotifyTurnProcessed { valid: false })
            .await;
        store.persist(room_id, game).await;
        info!(room_id, actor, ?err, "turn rejected by rule engine");
        return Outcome::RejectedByRules(err);
    }

    log_turn(game, actor, cards.clone(), TurnOutcome::Applied);

    let delta = rules::generate_delta(game, &cards);

    if !cards.is_empty() {
        for card in &cards {
            game.push_to_pile(*card);
        }
        sink.broadcast(ServerMessage::AddCardRangeToPile {
            cards: cards.clone(),
        })
        .await;

        let actor_idx = game.hand_index_of(actor).expect("actor is the current player");
        if let Err(missing) = game.hand_mut(actor_idx).unwrap().remove(&cards) {
            // The rule engine only validates relative card relationships, not
            // hand membership; a client lying about its hand surfaces here.
            warn!(room_id, actor, ?missing, "played card not in hand");
        }
        sink.send_to(
            actor,
            ServerMessage::RemoveCardRangeFromHand {
                cards: cards.clone(),
            },
        )
        .await;
        sink.broadcast_except(
            actor,
            ServerMessage::RemoveCardsFromPlayerHand {
                player_id: actor.to_string(),
                n: cards.len(),
            },
        )
        .await;
    }

    sink.send_to(actor, ServerMessage::NotifyTurnProcessed { valid: true })
        .await;

    // Step 5: request bookkeeping.
    if delta.remove_request_levels > 0 {
        game.set_request(None);
        sink.broadcast(ServerMessage::SetCurrentRequest { card: None }).await;
    }

    if delta.request_level != RequestLevel::NoRequest {
        let specific = delta.request_level == RequestLevel::CardRequest;
        sink.send_to(actor, ServerMessage::PromptCardRequest { specific })
            .await;

        match await_card_prompt(prompts, actor, prompt_timeout).await {
            Some(card) => {
                let stored = if specific {
                    card
                } else {
                    Card::new(card.suit, Face::None)
                };
                game.set_request(Some(stored));
                sink.broadcast(ServerMessage::SetCurrentRequest { card: Some(stored) })
                    .await;
            }
            None => {
                return end_game(
                    room_id,
                    game,
                    sink,
                    store,
                    format!("{actor} disconnected"),
                    None,
                )
                .await;
            }
        }
    }

    // Step 6: direction and counters.
    if delta.reverse {
        game.set_direction_forward(!game.is_forward);
    }
    game.set_counters(delta.pick, delta.give);

    // Step 7: replenishment.
    if game.pick > 0 {
        let needed = game.pick as usize;
        match game.try_deal_many(needed) {
            Ok(dealt) => {
                deal_to_actor(game, actor, needed, dealt, sink).await;
            }
            Err(_) => {
                let available = game.pile.count() + game.deck.count();
                if available.saturating_sub(1) > needed {
                    let reclaimed = game
                        .reclaim_pile()
                        .expect("pile has at least 2 cards when reclaim is viable");
                    let n_reclaimed = reclaimed.len();
                    sink.broadcast(ServerMessage::ReclaimPile).await;
                    for card in reclaimed {
                        game.push_to_deck(card);
                    }
                    sink.broadcast(ServerMessage::AddCardsToDeck { n: n_reclaimed })
                        .await;
                    game.shuffle_deck();
                    let dealt = game
                        .try_deal_many(needed)
                        .expect("reclaim guaranteed enough cards");
                    deal_to_actor(game, actor, needed, dealt, sink).await;
                } else {
                    return end_game(
                        room_id,
                        game,
                        sink,
                        store,
                        "insufficient cards to replenish the deck".to_string(),
                        None,
                    )
                    .await;
                }
            }
        }
        game.pick = 0;
    }

    // Step 8: win / last-card check. Only meaningful when cards were played.
    if let Some(&last) = cards.last() {
        let actor_idx = game.hand_index_of(actor).expect("actor is the current player");
        let hand_empty = game.hand(actor_idx).unwrap().is_empty();
        let was_last_card = game.hand(actor_idx).unwrap().is_last_card;

        if hand_empty && was_last_card && last.is_boring() {
            return end_game(
                room_id,
                game,
                sink,
                store,
                format!("{actor} went out"),
                Some(actor.to_string()),
            )
            .await;
        } else if hand_empty {
            sink.broadcast(ServerMessage::system(
                SystemMessageType::Info,
                format!("{actor} is cardless"),
            ))
            .await;
        } else {
            sink.send_to(actor, ServerMessage::PromptLastCardRequest).await;
            match await_last_card_prompt(prompts, actor, prompt_timeout).await {
                Some(true) => {
                    game.hand_mut(actor_idx).unwrap().is_last_card = true;
                    sink.broadcast_except(
                        actor,
                        ServerMessage::system(
                            SystemMessageType::Warning,
                            format!("{actor} declared last card"),
                        ),
                    )
                    .await;
                }
                Some(false) => {}
                None => {
                    return end_game(
                        room_id,
                        game,
                        sink,
                        store,
                        format!("{actor} disconnected"),
                        None,
                    )
                    .await;
                }
            }
        }
    }

    // Step 9: advance turn.
    game.advance_turn(delta.skip)
        .expect("current_turn stays within bounds by construction");
    sink.broadcast(ServerMessage::UpdateTurn {
        index: game.current_turn,
    })
    .await;
    store.persist(room_id, game).await;
    info!(room_id, actor, ?delta, "turn applied");

    Outcome::TurnApplied
}

async fn deal_to_actor(
    game: &mut Game,
    actor: &str,
    needed: usize,
    dealt: Vec<Card>,
    sink: &EventSink<'_>,
) {
    sink.broadcast(ServerMessage::RemoveCardsFromDeck { n: dealt.len() }).await;
    let actor_idx = game.hand_index_of(actor).expect("actor is the current player");
    game.hand_mut(actor_idx).unwrap().add(dealt.clone());
    sink.send_to(actor, ServerMessage::AddCardRangeToHand { cards: dealt })
        .await;
    sink.broadcast_except(
        actor,
        ServerMessage::AddCardsToPlayerHand {
            player_id: actor.to_string(),
            n: needed,
        },
    )
    .await;
}

async fn await_card_prompt(
    prompts: &PromptRegistry,
    actor: &str,
    timeout: Duration,
) -> Option<Card> {
    let rx = prompts.await_card_prompt(actor).await.ok()?;
    race_prompt(prompts, actor, rx, timeout).await
}

async fn await_last_card_prompt(
    prompts: &PromptRegistry,
    actor: &str,
    timeout: Duration,
) -> Option<bool> {
    let rx = prompts.await_last_card_prompt(actor).await.ok()?;
    race_prompt(prompts, actor, rx, timeout).await
}

/// Races an outstanding prompt's receiver against a bounded timeout. A
/// disconnect cancellation and a timeout are observationally identical here:
/// both leave the prompt unanswered and both end the game (§4.4, §5).
async fn race_prompt<T>(
    prompts: &PromptRegistry,
    actor: &str,
    rx: tokio::sync::oneshot::Receiver<T>,
    timeout: Duration,
) -> Option<T> {
    tokio::select! {
        res = rx => res.ok(),
        _ = tokio::time::sleep(timeout) => {
            prompts.cancel_all(actor).await;
            None
        }
    }
}

fn log_turn(game: &mut Game, actor: &str, cards: Vec<Card>, outcome: TurnOutcome) {
    let player_index = game.hand_index_of(actor).unwrap_or(usize::MAX);
    game.turns.push(TurnLogEntry {
        player_index,
        cards,
        outcome,
    });
}

async fn reject_orchestration(
    room_id: &str,
    game: &mut Game,
    actor: &str,
    sink: &EventSink<'_>,
    store: &GameStore,
    err: OrchestrationError,
) -> Outcome {
    log_turn(game, actor, Vec::new(), TurnOutcome::Rejected(err.to_string()));
    sink.send_to(actor, ServerMessage::system(SystemMessageType::Error, err.to_string()))
        .await;
    sink.send_to(actor, ServerMessage::NotifyTurnProcessed { valid: false })
        .await;
    store.persist(room_id, game).await;
    warn!(room_id, actor, ?err, "turn rejected before reaching the rule engine");
    Outcome::RejectedOrchestration(err)
}

async fn end_game(
    room_id: &str,
    game: &mut Game,
    sink: &EventSink<'_>,
    store: &GameStore,
    reason: String,
    winner: Option<String>,
) -> Outcome {
    game.is_started = false;
    game.winner = winner.clone();
    sink.broadcast(ServerMessage::EndGame {
        reason: reason.clone(),
        winner: winner.clone(),
    })
    .await;
    store.persist(room_id, game).await;
    info!(room_id, reason, ?winner, "game ended");
    Outcome::GameEnded { reason, winner }
}
