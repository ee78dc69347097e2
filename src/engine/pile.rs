use crate::engine::card::Card;
use serde::{Deserialize, Serialize};

/// The LIFO stack of cards played this game. Once the game has started the
/// pile is never empty: `reclaim` always leaves the former top card behind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pile {
    cards: Vec<Card>,
}

impl Pile {
    pub fn empty() -> Self {
        Self { cards: Vec::new() }
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn peek(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn count(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Returns every card except the top, leaving the top as the sole
    /// remaining card. Fails if the pile doesn't have at least 2 cards, since
    /// there would be nothing to reclaim without emptying it.
    pub fn reclaim(&mut self) -> Option<Vec<Card>> {
        if self.cards.len() < 2 {
            return None;
        }
        let top = self.cards.pop().expect("checked len >= 2");
        let reclaimed = std::mem::take(&mut self.cards);
        self.cards.push(top);
        Some(reclaimed)
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
    fn reclaim_requires_at_least_two_cards() {
        let mut pile = Pile::empty();
        pile.push(c(Face::Two));
        assert!(pile.reclaim().is_none());
    }

    #[test]
    fn reclaim_leaves_only_the_former_top() {
        let mut pile = Pile::empty();
        pile.push(c(Face::Two));
        pile.push(c(Face::Three));
        pile.push(c(Face::Four));

        let reclaimed = pile.reclaim().unwrap();
        assert_eq!(reclaimed.len(), 2);
        assert_eq!(pile.count(), 1);
        assert_eq!(pile.peek(), Some(c(Face::Four)));
    }
}
