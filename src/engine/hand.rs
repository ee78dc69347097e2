use crate::engine::card::Card;
use serde::{Deserialize, Serialize};

/// An unordered multiset of cards held by one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hand {
    pub player_id: String,
    cards: Vec<Card>,
    /// Set once the player has declared last-card status; cleared on any draw.
    pub is_last_card: bool,
}

impl Hand {
    pub fn new(player_id: String) -> Self {
        Self {
            player_id,
            cards: Vec::new(),
            is_last_card: false,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Adds cards to the hand. Any draw clears a prior last-card declaration.
    pub fn add(&mut self, cards: impl IntoIterator<Item = Card>) {
        let mut added_any = false;
        for card in cards {
            self.cards.push(card);
            added_any = true;
        }
        if added_any {
            self.is_last_card = false;
        }
    }

    /// Removes each of `cards` from the hand, one occurrence per entry. Fails
    /// (leaving the hand untouched) if any card isn't present in sufficient
    /// quantity.
    pub fn remove(&mut self, cards: &[Card]) -> Result<(), Card> {
        let mut remaining = self.cards.clone();
        for card in cards {
            match remaining.iter().position(|c| c == card) {
                Some(idx) => {
                    remaining.remove(idx);
                }
                None => return Err(*card),
            }
        }
        self.cards = remaining;
        Ok(())
    }

    pub fn contains_all(&self, cards: &[Card]) -> bool {
        let mut remaining = self.cards.clone();
        for card in cards {
            match remaining.iter().position(|c| c == card) {
                Some(idx) => {
                    remaining.remove(idx);
                }
                None => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::{Face, Suit};

    fn c(face: Face) -> Card {
        Card::new(Suit::Hearts, face)
    }

    #[test]
    fn drawing_clears_last_card_flag() {
        let mut hand = Hand::new("p1".into());
        hand.is_last_card = true;
        hand.add([c(Face::Two)]);
        assert!(!hand.is_last_card);
    }

    #[test]
    fn remove_fails_atomically_on_missing_card() {
        let mut hand = Hand::new("p1".into());
        hand.add([c(Face::Two), c(Face::Three)]);
        let err = hand.remove(&[c(Face::Two), c(Face::Four)]);
        assert_eq!(err, Err(c(Face::Four)));
        assert_eq!(hand.len(), 2, "a failed remove must not consume cards");
    }

    #[test]
    fn remove_handles_duplicate_cards_in_hand() {
        let mut hand = Hand::new("p1".into());
        hand.add([c(Face::Two), c(Face::Two)]);
        assert!(hand.remove(&[c(Face::Two)]).is_ok());
        assert_eq!(hand.len(), 1);
    }
}
