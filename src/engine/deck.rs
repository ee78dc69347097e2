use crate::engine::card::{Card, Face, Suit};
use rand::rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A LIFO stack of cards. The top is the end of the backing `Vec`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn empty() -> Self {
        Self { cards: Vec::new() }
    }

    /// A standard Karata deck: all 52 suit×non-joker-face combinations plus
    /// two jokers, in unspecified order. Callers must `shuffle` before use.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(54);
        for suit in Suit::REAL {
            for face in Face::RANKED {
                cards.push(Card::new(suit, face));
            }
        }
        cards.push(Card::joker(Suit::BlackJoker));
        cards.push(Card::joker(Suit::RedJoker));
        Self { cards }
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn shuffle(&mut self) {
        let mut rng = rng();
        self.cards.shuffle(&mut rng);
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Pops `n` cards, or none at all if fewer than `n` remain.
    pub fn deal_many(&mut self, n: usize) -> Option<Vec<Card>> {
        if self.cards.len() < n {
            return None;
        }
        let split_at = self.cards.len() - n;
        Some(self.cards.split_off(split_at))
    }

    pub fn count(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_deck_has_fifty_four_cards_and_two_jokers() {
        let deck = Deck::standard();
        assert_eq!(deck.count(), 54);
        let jokers = deck.cards.iter().filter(|c| c.is_joker()).count();
        assert_eq!(jokers, 2);
    }

    #[test]
    fn deal_pops_from_the_top() {
        let mut deck = Deck::standard();
        let before = deck.count();
        assert!(deck.deal().is_some());
        assert_eq!(deck.count(), before - 1);
    }

    #[test]
    fn deal_many_fails_atomically_when_short() {
        let mut deck = Deck::from_cards(vec![Card::joker(Suit::BlackJoker)]);
        assert!(deck.deal_many(2).is_none());
        assert_eq!(deck.count(), 1, "a failed deal_many must not consume cards");
    }

    #[test]
    fn deal_many_takes_exactly_n_from_the_top() {
        let mut deck = Deck::standard();
        let before = deck.count();
        let dealt = deck.deal_many(5).unwrap();
        assert_eq!(dealt.len(), 5);
        assert_eq!(deck.count(), before - 5);
    }
}
