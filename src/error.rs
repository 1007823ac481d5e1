use std::error::Error;
use std::fmt;

/// Errors reported by [`HandIndexer`](crate::HandIndexer) and
/// [`HandIndexerState`](crate::HandIndexerState).
///
/// Every operation either succeeds or returns one of these without modifying the indexer or the
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexerError {
    /// The number of rounds is `0` or exceeds [`MAX_ROUNDS`](crate::MAX_ROUNDS).
    InvalidRoundCount(usize),

    /// The number of cards of `round` is `0`, makes the cumulative total exceed the deck, or makes
    /// the lookup tables exceed their configured caps.
    InvalidCardsPerRound { round: usize, cards: usize },

    /// The card list has the wrong length, contains an invalid card, or contains a duplicate.
    InvalidCardList(String),

    /// The state has already been advanced through all `rounds` rounds.
    RoundOutOfRange { round: usize, rounds: usize },

    /// `index` is not a valid index of `round`, or `round` does not exist.
    IndexOutOfRange { round: usize, index: u64 },

    /// The state was created by an indexer with a different round structure.
    StateMismatch,
}

impl fmt::Display for IndexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRoundCount(rounds) => write!(f, "Invalid number of rounds: {rounds}"),
            Self::InvalidCardsPerRound { round, cards } => {
                write!(f, "Invalid number of cards in round {round}: {cards}")
            }
            Self::InvalidCardList(reason) => write!(f, "Invalid card list: {reason}"),
            Self::RoundOutOfRange { round, rounds } => {
                write!(f, "Round out of range: {round} (rounds: {rounds})")
            }
            Self::IndexOutOfRange { round, index } => {
                write!(f, "Index out of range: {index} (round: {round})")
            }
            Self::StateMismatch => write!(f, "State belongs to an incompatible indexer"),
        }
    }
}

impl Error for IndexerError {}
