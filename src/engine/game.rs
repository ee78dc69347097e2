use crate::engine::card::Card;
use crate::engine::deck::Deck;
use crate::engine::hand::Hand;
use crate::engine::pile::Pile;
use serde::{Deserialize, Serialize};

pub const TOTAL_CARDS: usize = 54;
pub const STARTING_HAND_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestLevel {
    NoRequest,
    SuitRequest,
    CardRequest,
}

impl RequestLevel {
    pub fn as_u32(self) -> u32 {
        match self {
            RequestLevel::NoRequest => 0,
            RequestLevel::SuitRequest => 1,
            RequestLevel::CardRequest => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationError {
    PileTooShortToReclaim,
    DeckEmpty,
    DeckTooShort,
    CardNotInHand(Card),
    TurnIndexOutOfRange,
}

/// One game in progress for 2-4 players. Owned exclusively by a single
/// executor (a room actor); no interior mutability or locking of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub deck: Deck,
    pub pile: Pile,
    pub hands: Vec<Hand>,
    pub current_turn: usize,
    pub is_forward: bool,
    pub give: u32,
    pub pick: u32,
    pub current_request: Option<Card>,
    pub request_level: RequestLevel,
    pub is_started: bool,
    pub winner: Option<String>,
    pub turns: Vec<TurnLogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnLogEntry {
    pub player_index: usize,
    pub cards: Vec<Card>,
    pub outcome: TurnOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnOutcome {
    Rejected(String),
    Applied,
}

impl Game {
    /// Creates an empty, unstarted game for the given players in join order.
    pub fn new(player_ids: Vec<String>) -> Self {
        let hands = player_ids.into_iter().map(Hand::new).collect();
        Self {
            deck: Deck::empty(),
            pile: Pile::empty(),
            hands,
            current_turn: 0,
            is_forward: true,
            give: 0,
            pick: 0,
            current_request: None,
            request_level: RequestLevel::NoRequest,
            is_started: false,
            winner: None,
            turns: Vec::new(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn current_player_id(&self) -> Option<&str> {
        self.hands.get(self.current_turn).map(|h| h.player_id.as_str())
    }

    pub fn hand_index_of(&self, player_id: &str) -> Option<usize> {
        self.hands.iter().position(|h| h.player_id == player_id)
    }

    /// Shuffles the deck, deals a boring top card to the pile (re-shuffling
    /// and retrying if the dealt card isn't boring), deals four cards to each
    /// hand, and marks the game started.
    pub fn start(&mut self) {
        let mut deck = Deck::standard();
        deck.shuffle();

        let top = loop {
            let card = deck.deal().expect("standard deck is non-empty");
            if card.is_boring() {
                break card;
            }
            // Not boring: put it back and reshuffle before trying again.
            deck.push(card);
            deck.shuffle();
        };

        self.pile = Pile::empty();
        self.pile.push(top);

        for hand in &mut self.hands {
            for _ in 0..STARTING_HAND_SIZE {
                if let Some(card) = deck.deal() {
                    hand.add([card]);
                }
            }
        }

        self.deck = deck;
        self.is_started = true;
    }

    pub fn push_to_pile(&mut self, card: Card) {
        self.pile.push(card);
    }

    pub fn reclaim_pile(&mut self) -> Result<Vec<Card>, MutationError> {
        self.pile.reclaim().ok_or(MutationError::PileTooShortToReclaim)
    }

    pub fn push_to_deck(&mut self, card: Card) {
        self.deck.push(card);
    }

    pub fn shuffle_deck(&mut self) {
        self.deck.shuffle();
    }

    pub fn deal_one(&mut self) -> Result<Card, MutationError> {
        self.deck.deal().ok_or(MutationError::DeckEmpty)
    }

    pub fn try_deal_many(&mut self, n: usize) -> Result<Vec<Card>, MutationError> {
        self.deck.deal_many(n).ok_or(MutationError::DeckTooShort)
    }

    pub fn hand(&self, index: usize) -> Option<&Hand> {
        self.hands.get(index)
    }

    pub fn hand_mut(&mut self, index: usize) -> Option<&mut Hand> {
        self.hands.get_mut(index)
    }

    pub fn set_request(&mut self, card: Option<Card>) {
        self.current_request = card;
        self.request_level = match card {
            None => RequestLevel::NoRequest,
            Some(c) if matches!(c.face, crate::engine::card::Face::None) => {
                RequestLevel::SuitRequest
            }
            Some(_) => RequestLevel::CardRequest,
        };
    }

    pub fn set_direction_forward(&mut self, forward: bool) {
        self.is_forward = forward;
    }

    pub fn set_counters(&mut self, pick: u32, give: u32) {
        self.pick = pick;
        self.give = give;
    }

    /// Advances `current_turn` by `skip` steps in the current direction,
    /// wrapping modulo the number of players.
    pub fn advance_turn(&mut self, skip: u32) -> Result<(), MutationError> {
        let n = self.hands.len();
        if n == 0 || self.current_turn >= n {
            return Err(MutationError::TurnIndexOutOfRange);
        }
        let n = n as i64;
        let mut idx = self.current_turn as i64;
        let step: i64 = if self.is_forward { 1 } else { -1 };
        for _ in 0..skip {
            idx = ((idx + step) % n + n) % n;
        }
        self.current_turn = idx as usize;
        Ok(())
    }

    /// `|deck| + |pile| + Σ|hand_i|`, expected to equal 54 at every
    /// observable point once the game has started.
    pub fn card_count(&self) -> usize {
        self.deck.count() + self.pile.count() + self.hands.iter().map(|h| h.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{i}")).collect()
    }

    #[test]
    fn start_deals_four_cards_and_a_boring_top() {
        let mut game = Game::new(players(3));
        game.start();

        assert!(game.is_started);
        for hand in &game.hands {
            assert_eq!(hand.len(), STARTING_HAND_SIZE);
        }
        assert_eq!(game.pile.count(), 1);
        assert!(game.pile.peek().unwrap().is_boring());
        assert_eq!(game.card_count(), TOTAL_CARDS);
    }

    #[test]
    fn advance_turn_wraps_forward_and_backward() {
        let mut game = Game::new(players(3));
        game.current_turn = 2;
        game.advance_turn(1).unwrap();
        assert_eq!(game.current_turn, 0);

        game.set_direction_forward(false);
        game.advance_turn(1).unwrap();
        assert_eq!(game.current_turn, 2);
    }

    #[test]
    fn advance_turn_handles_multi_step_skip() {
        let mut game = Game::new(players(3));
        game.current_turn = 0;
        game.advance_turn(2).unwrap();
        assert_eq!(game.current_turn, 2);
    }

    #[test]
    fn set_request_derives_request_level() {
        use crate::engine::card::{Face, Suit};
        let mut game = Game::new(players(2));

        game.set_request(Some(Card::new(Suit::Clubs, Face::None)));
        assert_eq!(game.request_level, RequestLevel::SuitRequest);

        game.set_request(Some(Card::new(Suit::Clubs, Face::Nine)));
        assert_eq!(game.request_level, RequestLevel::CardRequest);

        game.set_request(None);
        assert_eq!(game.request_level, RequestLevel::NoRequest);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::engine::card::Card;
    use proptest::prelude::*;

    fn player_count() -> impl Strategy<Value = usize> {
        2usize..=4
    }

    /// A started game plus a sequence of `(player_index, skip)` steps to
    /// apply via `advance_turn`, used to probe the turn-index invariant
    /// across many arbitrary walks.
    fn started_game_and_skips() -> impl Strategy<Value = (Game, Vec<u32>)> {
        (player_count(), proptest::collection::vec(0u32..6, 0..20)).prop_map(|(n, skips)| {
            let mut game = Game::new((0..n).map(|i| format!("p{i}")).collect());
            game.start();
            (game, skips)
        })
    }

    proptest! {
        #[test]
        fn conservation_holds_after_start((n) in player_count()) {
            let mut game = Game::new((0..n).map(|i| format!("p{i}")).collect());
            game.start();
            prop_assert_eq!(game.card_count(), TOTAL_CARDS);
        }

        #[test]
        fn pile_is_never_empty_once_started((n) in player_count()) {
            let mut game = Game::new((0..n).map(|i| format!("p{i}")).collect());
            game.start();
            prop_assert!(!game.pile.is_empty());
        }

        #[test]
        fn reclaim_preserves_the_pile_as_a_multiset(
            cards in proptest::collection::vec(any::<u8>(), 2..30)
        ) {
            let as_cards: Vec<Card> = cards
                .into_iter()
                .map(|b| {
                    let suit = crate::engine::card::Suit::REAL[(b % 4) as usize];
                    let face = crate::engine::card::Face::RANKED[(b as usize / 4) % 13];
                    Card::new(suit, face)
                })
                .collect();

            let mut pile = crate::engine::pile::Pile::empty();
            for c in &as_cards {
                pile.push(*c);
            }
            let before_top = pile.peek();
            let reclaimed = pile.reclaim();

            if as_cards.len() >= 2 {
                let reclaimed = reclaimed.expect("at least 2 cards were pushed");
                prop_assert_eq!(reclaimed.len() + pile.count(), as_cards.len());
                prop_assert_eq!(pile.peek(), before_top);
            } else {
                prop_assert!(reclaimed.is_none());
            }
        }

        #[test]
        fn turn_index_stays_in_bounds((game, skips) in started_game_and_skips()) {
            let mut game = game;
            for skip in skips {
                let n = game.hands.len();
                game.advance_turn(skip).unwrap();
                prop_assert!(game.current_turn < n);
            }
        }
    }
}
