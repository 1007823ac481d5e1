use crate::card::*;
use crate::colex::*;
use crate::error::*;
use crate::indexer::*;

/// A cursor for incrementally indexing a single hand, round by round.
///
/// A state is created by [`HandIndexer::new_state`] and borrows the indexer, so it cannot outlive
/// it. It describes exactly one hand: use a separate state for each hand, including hands indexed
/// concurrently from multiple threads.
///
/// # Examples
/// ```
/// use handiso::*;
///
/// let indexer = HandIndexer::new(&[2, 3]).unwrap();
/// let mut state = indexer.new_state();
///
/// let preflop = state.index_next_round(&cards_from_str("AsKs").unwrap()).unwrap();
/// let flop = state.index_next_round(&cards_from_str("Td9d6h").unwrap()).unwrap();
///
/// assert_eq!(preflop, indexer.index_last(&cards_from_str("AsKs").unwrap()).unwrap());
/// assert_eq!(flop, indexer.index_last(&cards_from_str("AsKsTd9d6h").unwrap()).unwrap());
/// assert!(state.is_finished());
/// ```
#[derive(Debug, Clone)]
pub struct HandIndexerState<'a> {
    indexer: &'a HandIndexer,
    round: usize,
    used_ranks: [u16; NUM_SUITS],
    suit_index: [u64; NUM_SUITS],
    suit_multiplier: [u64; NUM_SUITS],
    permutation_index: usize,
    permutation_multiplier: usize,
}

/// Ranks dealt in one round, validated against the ranks dealt so far.
pub(crate) struct RoundCards {
    pub(crate) ranks: [u16; NUM_SUITS],
    pub(crate) shifted_ranks: [u16; NUM_SUITS],
}

impl<'a> HandIndexerState<'a> {
    /// Creates a state that has not indexed any round yet.
    #[inline]
    pub fn new(indexer: &'a HandIndexer) -> Self {
        Self {
            indexer,
            round: 0,
            used_ranks: [0; NUM_SUITS],
            suit_index: [0; NUM_SUITS],
            suit_multiplier: [1; NUM_SUITS],
            permutation_index: 0,
            permutation_multiplier: 1,
        }
    }

    /// Returns the indexer this state was created by.
    #[inline]
    pub fn indexer(&self) -> &'a HandIndexer {
        self.indexer
    }

    /// Returns the number of rounds already indexed, i.e., the round the next call to
    /// [`index_next_round`](Self::index_next_round) expects.
    #[inline]
    pub fn round(&self) -> usize {
        self.round
    }

    /// Returns whether all rounds of the indexer have been indexed.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.round >= self.indexer.rounds()
    }

    /// Indexes the next round, given only the cards dealt in that round.
    ///
    /// Equivalent to `self.indexer().index_next_round(cards, self)`.
    #[inline]
    pub fn index_next_round(&mut self, cards: &[Card]) -> Result<u64, IndexerError> {
        let indexer = self.indexer;
        indexer.index_next_round(cards, self)
    }

    /// Checks the cards of the next round and splits them into per-suit rank sets.
    ///
    /// `shifted_ranks` holds each rank relative to the ranks of the same suit that are still
    /// unused.
    pub(crate) fn classify(&self, cards: &[Card]) -> Result<RoundCards, IndexerError> {
        let mut ranks = [0u16; NUM_SUITS];
        let mut shifted_ranks = [0u16; NUM_SUITS];

        for &card in cards {
            check_card(card).map_err(IndexerError::InvalidCardList)?;

            let suit = card_suit(card) as usize;
            let rank_bit = 1u16 << card_rank(card);
            if (ranks[suit] | self.used_ranks[suit]) & rank_bit != 0 {
                return Err(IndexerError::InvalidCardList(format!(
                    "Duplicate card: {}",
                    card_to_string(card).map_err(IndexerError::InvalidCardList)?
                )));
            }

            let smaller_used = (self.used_ranks[suit] & (rank_bit - 1)).count_ones();
            ranks[suit] |= rank_bit;
            shifted_ranks[suit] |= rank_bit >> smaller_used;
        }

        Ok(RoundCards {
            ranks,
            shifted_ranks,
        })
    }

    /// Folds the validated cards of the next round into the state.
    pub(crate) fn advance(&mut self, round_cards: &RoundCards, num_cards: usize) {
        for suit in 0..NUM_SUITS {
            let used_size = self.used_ranks[suit].count_ones() as usize;
            let this_size = round_cards.ranks[suit].count_ones() as usize;
            let rank_index = rank_set_to_index(round_cards.shifted_ranks[suit]) as u64;

            self.suit_index[suit] += self.suit_multiplier[suit] * rank_index;
            self.suit_multiplier[suit] *= binomial(NUM_RANKS - used_size, this_size);
            self.used_ranks[suit] |= round_cards.ranks[suit];
        }

        let mut remaining = num_cards;
        for suit in 0..NUM_SUITS - 1 {
            let this_size = round_cards.ranks[suit].count_ones() as usize;
            self.permutation_index += self.permutation_multiplier * this_size;
            self.permutation_multiplier *= remaining + 1;
            remaining -= this_size;
        }

        self.round += 1;
    }

    #[inline]
    pub(crate) fn suit_index(&self) -> &[u64; NUM_SUITS] {
        &self.suit_index
    }

    #[inline]
    pub(crate) fn suit_multiplier(&self) -> &[u64; NUM_SUITS] {
        &self.suit_multiplier
    }

    #[inline]
    pub(crate) fn permutation_index(&self) -> usize {
        self.permutation_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let indexer = HandIndexer::new(&[2, 1]).unwrap();
        let mut state = indexer.new_state();

        let cards = cards_from_str("Ks4s").unwrap();
        let round_cards = state.classify(&cards).unwrap();
        assert_eq!(round_cards.ranks, [0, 0, 0, (1 << 11) | (1 << 2)]);
        assert_eq!(round_cards.shifted_ranks, round_cards.ranks);
        state.advance(&round_cards, cards.len());
        assert_eq!(state.round(), 1);

        // ranks above the used 4s and Ks shift down
        let round_cards = state.classify(&cards_from_str("As").unwrap()).unwrap();
        assert_eq!(round_cards.ranks[3], 1 << 12);
        assert_eq!(round_cards.shifted_ranks[3], 1 << 10);

        let round_cards = state.classify(&cards_from_str("3s").unwrap()).unwrap();
        assert_eq!(round_cards.shifted_ranks[3], 1 << 1);

        assert!(state.classify(&cards_from_str("Ks").unwrap()).is_err());
        assert!(state.classify(&[52]).is_err());
        assert!(state.classify(&[0, 0]).is_err());
    }
}
