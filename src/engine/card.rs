use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
    BlackJoker,
    RedJoker,
}

impl Suit {
    pub const REAL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn is_joker(&self) -> bool {
        matches!(self, Suit::BlackJoker | Suit::RedJoker)
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suit::Spades => write!(f, "♠"),
            Suit::Hearts => write!(f, "♥"),
            Suit::Diamonds => write!(f, "♦"),
            Suit::Clubs => write!(f, "♣"),
            Suit::BlackJoker => write!(f, "🂿"),
            Suit::RedJoker => write!(f, "🃟"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    None,
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Face {
    pub const RANKED: [Face; 13] = [
        Face::Ace,
        Face::Two,
        Face::Three,
        Face::Four,
        Face::Five,
        Face::Six,
        Face::Seven,
        Face::Eight,
        Face::Nine,
        Face::Ten,
        Face::Jack,
        Face::Queen,
        Face::King,
    ];
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::None => write!(f, "-"),
            Face::Ace => write!(f, "A"),
            Face::Two => write!(f, "2"),
            Face::Three => write!(f, "3"),
            Face::Four => write!(f, "4"),
            Face::Five => write!(f, "5"),
            Face::Six => write!(f, "6"),
            Face::Seven => write!(f, "7"),
            Face::Eight => write!(f, "8"),
            Face::Nine => write!(f, "9"),
            Face::Ten => write!(f, "10"),
            Face::Jack => write!(f, "J"),
            Face::Queen => write!(f, "Q"),
            Face::King => write!(f, "K"),
        }
    }
}

/// A card as the pair that identifies it. Jokers carry `Face::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub face: Face,
}

impl Card {
    pub const fn new(suit: Suit, face: Face) -> Self {
        Self { suit, face }
    }

    pub fn joker(suit: Suit) -> Self {
        debug_assert!(suit.is_joker());
        Self {
            suit,
            face: Face::None,
        }
    }

    pub fn is_joker(&self) -> bool {
        self.suit.is_joker()
    }

    /// A joker, or a Two/Three: forces the next player to draw unless countered.
    pub fn is_bomb(&self) -> bool {
        self.is_joker() || matches!(self.face, Face::Two | Face::Three)
    }

    /// An Eight or Queen: demands an answer card or forces a draw of one.
    pub fn is_question(&self) -> bool {
        matches!(self.face, Face::Eight | Face::Queen)
    }

    /// Not a bomb, not a question, and not an Ace/Jack/King. Only a boring card
    /// can end the game on a last-card win.
    pub fn is_boring(&self) -> bool {
        !self.is_bomb()
            && !self.is_question()
            && !matches!(self.face, Face::Ace | Face::Jack | Face::King)
    }

    pub fn pick_value(&self) -> u32 {
        if self.is_joker() {
            5
        } else {
            match self.face {
                Face::Two => 2,
                Face::Three => 3,
                _ => 0,
            }
        }
    }

    pub fn ace_value(&self) -> u32 {
        match (self.suit, self.face) {
            (Suit::Spades, Face::Ace) => 2,
            (_, Face::Ace) => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_joker() {
            write!(f, "{}", self.suit)
        } else {
            write!(f, "{}{}", self.face, self.suit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jokers_are_bombs_not_questions() {
        let j = Card::joker(Suit::BlackJoker);
        assert!(j.is_bomb());
        assert!(!j.is_question());
        assert!(!j.is_boring());
        assert_eq!(j.pick_value(), 5);
        assert_eq!(j.ace_value(), 0);
    }

    #[test]
    fn two_and_three_are_bombs() {
        let two = Card::new(Suit::Hearts, Face::Two);
        let three = Card::new(Suit::Clubs, Face::Three);
        assert!(two.is_bomb());
        assert!(three.is_bomb());
        assert_eq!(two.pick_value(), 2);
        assert_eq!(three.pick_value(), 3);
    }

    #[test]
    fn eight_and_queen_are_questions() {
        assert!(Card::new(Suit::Spades, Face::Eight).is_question());
        assert!(Card::new(Suit::Diamonds, Face::Queen).is_question());
        assert!(!Card::new(Suit::Diamonds, Face::Jack).is_question());
    }

    #[test]
    fn ace_of_spades_is_worth_two() {
        assert_eq!(Card::new(Suit::Spades, Face::Ace).ace_value(), 2);
        assert_eq!(Card::new(Suit::Hearts, Face::Ace).ace_value(), 1);
        assert_eq!(Card::new(Suit::Hearts, Face::King).ace_value(), 0);
    }

    #[test]
    fn boring_excludes_ace_jack_king_and_specials() {
        assert!(Card::new(Suit::Hearts, Face::Six).is_boring());
        assert!(!Card::new(Suit::Hearts, Face::Ace).is_boring());
        assert!(!Card::new(Suit::Hearts, Face::Jack).is_boring());
        assert!(!Card::new(Suit::Hearts, Face::King).is_boring());
        assert!(!Card::new(Suit::Hearts, Face::Eight).is_boring());
        assert!(!Card::new(Suit::Hearts, Face::Two).is_boring());
    }
}
