//! Process-wide registry correlating a connection's later `RequestCard` /
//! `SetLastCardStatus` RPCs back to the turn orchestration awaiting them.
//!
//! Independent of any single room's mailbox: see DESIGN.md note D-1 for why
//! prompt resolution must not be routed through the acting player's own room.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};

use crate::engine::card::Card;

pub type ConnectionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PromptError {
    #[error("a prompt of this kind is already outstanding for this connection")]
    AlreadyOutstanding,
    #[error("the connection disconnected before answering")]
    Disconnected,
    #[error("the prompt was not answered in time")]
    TimedOut,
}

#[derive(Default)]
struct Slots {
    card: HashMap<ConnectionId, oneshot::Sender<Card>>,
    last_card: HashMap<ConnectionId, oneshot::Sender<bool>>,
}

#[derive(Clone)]
pub struct PromptRegistry {
    slots: Arc<Mutex<Slots>>,
}

impl PromptRegistry {
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    /// Registers a pending card-request prompt for `conn`, returning a
    /// receiver the orchestrator awaits. Fails if one is already outstanding.
    pub async fn await_card_prompt(
        &self,
        conn: &str,
    ) -> Result<oneshot::Receiver<Card>, PromptError> {
        let mut slots = self.slots.lock().await;
        if slots.card.contains_key(conn) {
            return Err(PromptError::AlreadyOutstanding);
        }
        let (tx, rx) = oneshot::channel();
        slots.card.insert(conn.to_string(), tx);
        Ok(rx)
    }

    pub async fn await_last_card_prompt(
        &self,
        conn: &str,
    ) -> Result<oneshot::Receiver<bool>, PromptError> {
        let mut slots = self.slots.lock().await;
        if slots.last_card.contains_key(conn) {
            return Err(PromptError::AlreadyOutstanding);
        }
        let (tx, rx) = oneshot::channel();
        slots.last_card.insert(conn.to_string(), tx);
        Ok(rx)
    }

    /// Completes an outstanding card-request prompt. Silently ignored if no
    /// prompt of this kind is outstanding (a late or spurious answer).
    pub async fn resolve_card_request(&self, conn: &str, card: Card) {
        let mut slots = self.slots.lock().await;
        if let Some(tx) = slots.card.remove(conn) {
            let _ = tx.send(card);
        }
    }

    pub async fn resolve_last_card(&self, conn: &str, is_last_card: bool) {
        let mut slots = self.slots.lock().await;
        if let Some(tx) = slots.last_card.remove(conn) {
            let _ = tx.send(is_last_card);
        }
    }

    /// True if a card-request or last-card prompt is currently outstanding
    /// for `conn`. Backs the orchestrator's anti-"ukora" check: a player
    /// can't queue a new turn while a prompt answer from them is pending.
    pub async fn has_outstanding(&self, conn: &str) -> bool {
        let slots = self.slots.lock().await;
        slots.card.contains_key(conn) || slots.last_card.contains_key(conn)
    }

    /// Drops every outstanding prompt for `conn`. Dropping the sender causes
    /// any receiver still being awaited to resolve to a cancellation error,
    /// which the orchestrator treats identically to a timeout.
    pub async fn cancel_all(&self, conn: &str) {
        let mut slots = self.slots.lock().await;
        slots.card.remove(conn);
        slots.last_card.remove(conn);
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::{Face, Suit};

    #[tokio::test]
    async fn second_same_kind_prompt_is_rejected() {
        let registry = PromptRegistry::new();
        let _first = registry.await_card_prompt("conn-1").await.unwrap();
        let second = registry.await_card_prompt("conn-1").await;
        assert_eq!(second.err(), Some(PromptError::AlreadyOutstanding));
    }

    #[tokio::test]
    async fn resolving_completes_the_awaiting_receiver() {
        let registry = PromptRegistry::new();
        let rx = registry.await_card_prompt("conn-1").await.unwrap();
        registry
            .resolve_card_request("conn-1", Card::new(Suit::Hearts, Face::Nine))
            .await;
        let card = rx.await.unwrap();
        assert_eq!(card, Card::new(Suit::Hearts, Face::Nine));
    }

    #[tokio::test]
    async fn late_resolution_with_no_outstanding_prompt_is_a_no_op() {
        let registry = PromptRegistry::new();
        // No prompt was ever requested for this connection; this must not panic.
        registry
            .resolve_card_request("ghost", Card::new(Suit::Hearts, Face::Nine))
            .await;
    }

    #[tokio::test]
    async fn cancel_all_makes_the_receiver_observe_cancellation() {
        let registry = PromptRegistry::new();
        let rx = registry.await_card_prompt("conn-1").await.unwrap();
        registry.cancel_all("conn-1").await;
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn card_and_last_card_slots_are_independent() {
        let registry = PromptRegistry::new();
        let _card_rx = registry.await_card_prompt("conn-1").await.unwrap();
        // A last-card prompt for the same connection is a different kind and
        // must not collide with the outstanding card-request prompt.
        assert!(registry.await_last_card_prompt("conn-1").await.is_ok());
    }
}
