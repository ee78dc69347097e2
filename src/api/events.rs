use serde::{Deserialize, Serialize};

use crate::engine::card::Card;
use crate::engine::rules::TurnError;

/// Client → server RPC calls (the core subset; room join/leave/chat are
/// handled by the `rooms` module and not modeled here).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    PerformTurn { cards: Vec<Card> },
    RequestCard { card: Card },
    SetLastCardStatus { is_last_card: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemMessageType {
    Info,
    Warning,
    Error,
}

/// Server → client events, broadcast per room (`inviteLink`) or targeted to
/// one connection as noted per-variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    AddCardRangeToPile { cards: Vec<Card> },
    RemoveCardsFromDeck { n: usize },
    AddCardsToDeck { n: usize },
    ReclaimPile,
    /// Targeted to the acting player.
    AddCardRangeToHand { cards: Vec<Card> },
    /// Targeted to the acting player.
    RemoveCardRangeFromHand { cards: Vec<Card> },
    AddCardsToPlayerHand { player_id: String, n: usize },
    RemoveCardsFromPlayerHand { player_id: String, n: usize },
    SetCurrentRequest { card: Option<Card> },
    UpdateTurn { index: usize },
    UpdateGameStatus { is_started: bool },
    /// Targeted to the acting player; awaits a later `RequestCard`.
    PromptCardRequest { specific: bool },
    /// Targeted to the acting player; awaits a later `SetLastCardStatus`.
    PromptLastCardRequest,
    /// Targeted to the acting player.
    NotifyTurnProcessed { valid: bool },
    ReceiveSystemMessage { text: String, kind: SystemMessageType },
    EndGame { reason: String, winner: Option<String> },
}

impl ServerMessage {
    pub fn system(kind: SystemMessageType, text: impl Into<String>) -> Self {
        ServerMessage::ReceiveSystemMessage {
            text: text.into(),
            kind,
        }
    }

    pub fn error_for(err: TurnError) -> Self {
        Self::system(SystemMessageType::Error, err.to_string())
    }
}
