use crate::card::*;
use crate::colex::*;
use crate::configuration::*;
use crate::error::*;
use crate::state::*;
use crate::utility::*;
use log::debug;
use std::fmt;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A struct mapping hands to and from a dense set of indices shared by all isomorphic hands.
///
/// Hands are isomorphic with respect to permutations of the suits and ordering within a round.
/// For example, `AsKs`, `KdAd` and `KhAh` all map to the same index preflop.
///
/// Constructing an indexer generates a number of lookup tables and is relatively expensive
/// compared to indexing a hand. After construction the indexer is immutable, so it can be shared
/// freely between threads.
///
/// # Examples
/// ```
/// use handiso::*;
///
/// // hole cards, flop, turn and river
/// let indexer = HandIndexer::new(&[2, 3, 1, 1]).unwrap();
/// assert_eq!(indexer.size(0), 169);
/// assert_eq!(indexer.size(1), 1286792);
///
/// let index = indexer.index_last(&cards_from_str("AsKs").unwrap()).unwrap();
/// assert_eq!(index, indexer.index_last(&cards_from_str("KdAd").unwrap()).unwrap());
///
/// let canonical = indexer.unindex(0, index).unwrap();
/// assert_eq!(indexer.index_last(&canonical).unwrap(), index);
/// ```
pub struct HandIndexer {
    cards_per_round: Vec<u8>,
    round_start: Vec<usize>,
    tables: Vec<RoundTables>,
}

impl fmt::Debug for HandIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandIndexer")
            .field("cards_per_round", &self.cards_per_round)
            .field(
                "size",
                &(0..self.rounds()).map(|r| self.size(r)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl HandIndexer {
    /// Creates an indexer for a game dealing `cards_per_round[r]` cards in round `r`.
    ///
    /// There must be between `1` and [`MAX_ROUNDS`] rounds, each round must deal at least one card,
    /// and at most [`NUM_CARDS`] cards can be dealt in total. In addition, the lookup table of each
    /// round must not exceed [`MAX_PERMUTATION_KEYS`] entries and each round's index space must fit
    /// in `u64`.
    ///
    /// # Examples
    /// ```
    /// use handiso::*;
    ///
    /// assert!(HandIndexer::new(&[2, 3, 1, 1]).is_ok());
    /// assert_eq!(HandIndexer::new(&[]).unwrap_err(), IndexerError::InvalidRoundCount(0));
    /// assert!(HandIndexer::new(&[2, 0]).is_err());
    /// assert!(HandIndexer::new(&[26, 27]).is_err());
    /// ```
    pub fn new(cards_per_round: &[u8]) -> Result<Self, IndexerError> {
        let rounds = cards_per_round.len();
        if rounds == 0 || rounds > MAX_ROUNDS {
            return Err(IndexerError::InvalidRoundCount(rounds));
        }

        let mut round_start = Vec::with_capacity(rounds);
        let mut total = 0;
        let mut permutation_keys = 1u64;
        for (round, &cards) in cards_per_round.iter().enumerate() {
            let error = IndexerError::InvalidCardsPerRound {
                round,
                cards: cards as usize,
            };

            round_start.push(total);
            total += cards as usize;
            if cards == 0 || total > NUM_CARDS {
                return Err(error);
            }

            // three free suit counts per round, each in `0..=cards`
            let radix = (cards as u64 + 1).pow(3);
            permutation_keys = permutation_keys.saturating_mul(radix);
            if permutation_keys > MAX_PERMUTATION_KEYS {
                return Err(error);
            }
        }

        let tables = into_par_iter(0..rounds)
            .map(|round| RoundTables::build(cards_per_round, round))
            .collect::<Result<Vec<_>, _>>()?;

        let indexer = Self {
            cards_per_round: cards_per_round.to_vec(),
            round_start,
            tables,
        };

        debug!(
            "hand indexer for {:?}: configurations {:?}, permutations {:?}, size {:?}",
            indexer.cards_per_round,
            (0..rounds)
                .map(|r| indexer.configurations(r))
                .collect::<Vec<_>>(),
            (0..rounds).map(|r| indexer.permutations(r)).collect::<Vec<_>>(),
            (0..rounds).map(|r| indexer.size(r)).collect::<Vec<_>>(),
        );

        Ok(indexer)
    }

    /// Returns the number of rounds.
    #[inline]
    pub fn rounds(&self) -> usize {
        self.cards_per_round.len()
    }

    /// Returns the number of cards dealt in `round`, or `0` if `round` does not exist.
    #[inline]
    pub fn cards_per_round(&self, round: usize) -> usize {
        self.cards_per_round.get(round).map_or(0, |&c| c as usize)
    }

    /// Returns the position of the first card of `round` in a full card list, or `0` if `round`
    /// does not exist.
    #[inline]
    pub fn round_start(&self, round: usize) -> usize {
        self.round_start.get(round).copied().unwrap_or(0)
    }

    /// Returns the cumulative number of cards dealt through `round`, or `0` if `round` does not
    /// exist.
    #[inline]
    pub fn round_size(&self, round: usize) -> usize {
        self.round_start(round) + self.cards_per_round(round)
    }

    /// Returns the number of cards dealt through the last round.
    #[inline]
    pub fn total_cards(&self) -> usize {
        self.round_size(self.rounds() - 1)
    }

    /// Returns the number of canonical suit configurations of `round`, or `0` if `round` does not
    /// exist.
    #[inline]
    pub fn configurations(&self, round: usize) -> usize {
        self.tables.get(round).map_or(0, |t| t.num_configurations())
    }

    /// Returns the size of the raw suit-count lookup table of `round`, or `0` if `round` does not
    /// exist.
    #[inline]
    pub fn permutations(&self, round: usize) -> usize {
        self.tables.get(round).map_or(0, |t| t.num_permutations())
    }

    /// Returns the number of indices of `round`, or `0` if `round` does not exist.
    ///
    /// Valid indices of `round` are exactly `0..size(round)`.
    #[inline]
    pub fn size(&self, round: usize) -> u64 {
        self.tables.get(round).map_or(0, |t| t.size())
    }

    /// Creates a state for incrementally indexing a hand.
    #[inline]
    pub fn new_state(&self) -> HandIndexerState<'_> {
        HandIndexerState::new(self)
    }

    /// Returns the last round whose cards end exactly at position `len`.
    #[inline]
    fn round_ending_at(&self, len: usize) -> Result<usize, IndexerError> {
        (0..self.rounds())
            .find(|&round| self.round_size(round) == len)
            .ok_or_else(|| {
                IndexerError::InvalidCardList(format!(
                    "Length {len} does not match any round boundary"
                ))
            })
    }

    /// Incrementally indexes the next round of `state`, given only the cards dealt in that round.
    ///
    /// On success, `state` is advanced by one round. On failure, `state` is left unchanged.
    ///
    /// # Examples
    /// ```
    /// use handiso::*;
    ///
    /// let indexer = HandIndexer::new(&[2, 3, 1, 1]).unwrap();
    /// let mut state = indexer.new_state();
    ///
    /// let hand = hand_from_str("AsKs | Td9d6h | Qc | 2h").unwrap();
    /// for (round, cards) in hand.iter().enumerate() {
    ///     let index = indexer.index_next_round(cards, &mut state).unwrap();
    ///     assert_eq!(index, indexer.index_last(&hand[..=round].concat()).unwrap());
    /// }
    ///
    /// let error = indexer.index_next_round(&[0], &mut state).unwrap_err();
    /// assert_eq!(error, IndexerError::RoundOutOfRange { round: 4, rounds: 4 });
    /// ```
    pub fn index_next_round(
        &self,
        cards: &[Card],
        state: &mut HandIndexerState<'_>,
    ) -> Result<u64, IndexerError> {
        if !std::ptr::eq(self, state.indexer())
            && self.cards_per_round != state.indexer().cards_per_round
        {
            return Err(IndexerError::StateMismatch);
        }

        let round = state.round();
        if round >= self.rounds() {
            return Err(IndexerError::RoundOutOfRange {
                round,
                rounds: self.rounds(),
            });
        }

        let num_cards = self.cards_per_round(round);
        if cards.len() != num_cards {
            return Err(IndexerError::InvalidCardList(format!(
                "Expected {num_cards} cards in round {round}, got {}",
                cards.len()
            )));
        }

        let round_cards = state.classify(cards)?;
        state.advance(&round_cards, num_cards);

        Ok(self.tables[round].index(
            state.suit_index(),
            state.suit_multiplier(),
            state.permutation_index(),
        ))
    }

    /// Indexes a hand on every round up to the one implied by the number of cards.
    ///
    /// `cards` lists the cards of all rounds, concatenated in round order. The result has one
    /// index per round.
    ///
    /// # Examples
    /// ```
    /// use handiso::*;
    ///
    /// let indexer = HandIndexer::new(&[2, 3, 1, 1]).unwrap();
    /// let indices = indexer.index_all(&cards_from_str("AsKsTd9d6h").unwrap()).unwrap();
    /// assert_eq!(indices.len(), 2);
    /// assert_eq!(indices[0], indexer.index_last(&cards_from_str("AsKs").unwrap()).unwrap());
    /// ```
    pub fn index_all(&self, cards: &[Card]) -> Result<Vec<u64>, IndexerError> {
        let last_round = self.round_ending_at(cards.len())?;
        let mut state = self.new_state();

        (0..=last_round)
            .map(|round| {
                let start = self.round_start(round);
                let end = start + self.cards_per_round(round);
                self.index_next_round(&cards[start..end], &mut state)
            })
            .collect()
    }

    /// Indexes a hand on the last round implied by the number of cards.
    ///
    /// `cards` lists the cards of all rounds, concatenated in round order; its length must equal
    /// [`round_size`](Self::round_size) of some round.
    ///
    /// # Examples
    /// ```
    /// use handiso::*;
    ///
    /// let indexer = HandIndexer::new(&[2, 3]).unwrap();
    ///
    /// let index = indexer.index_last(&cards_from_str("AsKs Td9d6h").unwrap()).unwrap();
    /// let isomorphic = indexer.index_last(&cards_from_str("KhAh Tc9c6s").unwrap()).unwrap();
    /// assert_eq!(index, isomorphic);
    ///
    /// assert!(indexer.index_last(&[]).is_err());
    /// assert!(indexer.index_last(&[0, 1, 2]).is_err());
    /// assert!(indexer.index_last(&[0, 0]).is_err());
    /// ```
    pub fn index_last(&self, cards: &[Card]) -> Result<u64, IndexerError> {
        let indices = self.index_all(cards)?;
        Ok(indices[indices.len() - 1])
    }

    /// Recovers a canonical hand of `round` from its index.
    ///
    /// The returned hand has [`round_size(round)`](Self::round_size) cards in round order, and
    /// [`index_last`](Self::index_last) maps it back to `index`. It represents every hand
    /// isomorphic to it, not any particular one.
    ///
    /// # Examples
    /// ```
    /// use handiso::*;
    ///
    /// let indexer = HandIndexer::new(&[2, 3]).unwrap();
    /// let hand = indexer.unindex(1, 1000).unwrap();
    /// assert_eq!(hand.len(), 5);
    /// assert_eq!(indexer.index_last(&hand).unwrap(), 1000);
    ///
    /// assert!(indexer.unindex(1, indexer.size(1)).is_err());
    /// assert!(indexer.unindex(2, 0).is_err());
    /// ```
    pub fn unindex(&self, round: usize, index: u64) -> Result<Vec<Card>, IndexerError> {
        if round >= self.rounds() || index >= self.size(round) {
            return Err(IndexerError::IndexOutOfRange { round, index });
        }

        let out_of_range = move || IndexerError::IndexOutOfRange { round, index };
        let tables = &self.tables[round];
        let (shape, mut suit_index) = tables.unindex(index);

        let mut cards = vec![0; self.round_size(round)];
        let mut location = self.round_start[..=round].to_vec();

        for suit in 0..NUM_SUITS {
            let mut used = 0u16;
            let mut num_used = 0;

            for (r, position) in location.iter_mut().enumerate() {
                let count = tables.count(&shape, suit, r);
                let round_size = binomial(NUM_RANKS - num_used, count);
                let round_index = suit_index[suit] % round_size;
                suit_index[suit] /= round_size;
                num_used += count;

                let mut shifted_ranks =
                    index_to_rank_set(count, round_index).ok_or_else(out_of_range)?;
                let mut rank_set = 0u16;
                while shifted_ranks != 0 {
                    let shifted_rank = shifted_ranks.trailing_zeros() as usize;
                    shifted_ranks &= shifted_ranks - 1;

                    let rank = nth_unset(used, shifted_rank).ok_or_else(out_of_range)?;
                    rank_set |= 1 << rank;
                    cards[*position] = make_card(rank, suit as u8);
                    *position += 1;
                }

                used |= rank_set;
            }
        }

        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries() {
        let indexer = HandIndexer::new(&[2, 3, 1, 1]).unwrap();

        assert_eq!(indexer.rounds(), 4);
        assert_eq!(indexer.total_cards(), 7);
        assert_eq!(
            (0..5).map(|r| indexer.cards_per_round(r)).collect::<Vec<_>>(),
            vec![2, 3, 1, 1, 0]
        );
        assert_eq!(
            (0..5).map(|r| indexer.round_start(r)).collect::<Vec<_>>(),
            vec![0, 2, 5, 6, 0]
        );
        assert_eq!(
            (0..5).map(|r| indexer.round_size(r)).collect::<Vec<_>>(),
            vec![2, 5, 6, 7, 0]
        );
        assert_eq!(indexer.configurations(0), 2);
        assert_eq!(indexer.configurations(4), 0);
        assert!(indexer.permutations(0) > 0);
        assert!(indexer.permutations(3) as u64 <= MAX_PERMUTATION_KEYS);
        assert_eq!(indexer.permutations(4), 0);
        assert_eq!(indexer.size(4), 0);
    }

    #[test]
    fn test_construction_errors() {
        assert_eq!(
            HandIndexer::new(&[1; MAX_ROUNDS + 1]).unwrap_err(),
            IndexerError::InvalidRoundCount(MAX_ROUNDS + 1)
        );
        assert_eq!(
            HandIndexer::new(&[2, 0, 1]).unwrap_err(),
            IndexerError::InvalidCardsPerRound { round: 1, cards: 0 }
        );
        assert_eq!(
            HandIndexer::new(&[50, 3]).unwrap_err(),
            IndexerError::InvalidCardsPerRound { round: 1, cards: 3 }
        );
        assert_eq!(
            HandIndexer::new(&[13, 13, 13, 13]).unwrap_err(),
            IndexerError::InvalidCardsPerRound { round: 2, cards: 13 }
        );
        assert!(HandIndexer::new(&[1; MAX_ROUNDS]).is_ok());
        assert!(HandIndexer::new(&[52]).is_ok());
    }

    #[test]
    fn test_preflop_exhaustive() {
        let indexer = HandIndexer::new(&[2]).unwrap();
        let mut count = vec![0; 169];

        for c1 in 0..NUM_CARDS as Card {
            for c2 in 0..NUM_CARDS as Card {
                if c1 != c2 {
                    let index = indexer.index_last(&[c1, c2]).unwrap();
                    count[index as usize] += 1;
                }
            }
        }

        // ordered pairs: 12 per pocket pair, 8 per suited hand, 24 per offsuit hand
        let mut histogram = count.clone();
        histogram.sort_unstable();
        histogram.dedup();
        assert_eq!(histogram, vec![8, 12, 24]);
        assert_eq!(count.iter().filter(|&&c| c == 12).count(), 13);
        assert_eq!(count.iter().filter(|&&c| c == 8).count(), 78);
        assert_eq!(count.iter().filter(|&&c| c == 24).count(), 78);
    }

    #[test]
    fn test_state_is_unchanged_on_error() {
        let indexer = HandIndexer::new(&[2, 3]).unwrap();
        let mut state = indexer.new_state();
        state.index_next_round(&[0, 1]).unwrap();

        assert!(state.index_next_round(&[1, 8, 12]).is_err());
        assert!(state.index_next_round(&[4, 8]).is_err());
        assert!(state.index_next_round(&[4, 8, 52]).is_err());
        assert_eq!(state.round(), 1);

        let index = state.index_next_round(&[4, 8, 12]).unwrap();
        assert_eq!(index, indexer.index_last(&[0, 1, 4, 8, 12]).unwrap());
    }

    #[test]
    fn test_state_mismatch() {
        let indexer1 = HandIndexer::new(&[2, 3]).unwrap();
        let indexer2 = HandIndexer::new(&[2, 3]).unwrap();
        let indexer3 = HandIndexer::new(&[2, 4]).unwrap();

        let mut state = indexer1.new_state();
        let index = indexer2.index_next_round(&[0, 5], &mut state).unwrap();
        assert_eq!(index, indexer1.index_last(&[0, 5]).unwrap());

        assert_eq!(
            indexer3.index_next_round(&[10, 15, 20], &mut state),
            Err(IndexerError::StateMismatch)
        );
        assert_eq!(state.round(), 1);
    }
}
