use crate::card::*;
use crate::colex::*;
use crate::error::*;
use log::trace;

/// Maximum number of rounds supported by an indexer.
pub const MAX_ROUNDS: usize = 8;

/// Maximum size of the raw suit-count lookup table of a single round.
pub const MAX_PERMUTATION_KEYS: u64 = 1 << 24;

const ROUND_SHIFT: usize = 4;
const ROUND_MASK: u32 = 0xf;

/// Per-suit occupancy histories.
///
/// Each element packs the number of cards of the suit dealt in each round, 4 bits per round,
/// with the first round in the most significant position. A canonical shape is sorted in
/// descending order.
pub(crate) type Shape = [u32; NUM_SUITS];

/// Lookup tables of a single round.
pub(crate) struct RoundTables {
    rounds: usize,
    round: usize,

    /// Canonical shapes in ascending order; the position is the configuration id.
    configurations: Vec<Shape>,

    /// Number of rank arrangements of each suit of each configuration.
    suit_size: Vec<[u64; NUM_SUITS]>,

    /// Bit `i` is set if suit `i` has the same history as suit `i - 1`.
    equal: Vec<u8>,

    /// First index of each configuration.
    offset: Vec<u64>,
    size: u64,

    permutation_to_configuration: Vec<u32>,
    permutation_to_pi: Vec<[u8; NUM_SUITS]>,
}

/// Returns the number of cards of a packed suit history dealt in `round`.
#[inline]
pub(crate) fn round_count(history: u32, rounds: usize, round: usize) -> usize {
    (history >> (ROUND_SHIFT * (rounds - round - 1)) & ROUND_MASK) as usize
}

/// Returns `history` with `count` cards dealt in `round`.
#[inline]
fn with_round_count(history: u32, rounds: usize, round: usize, count: usize) -> u32 {
    history | (count as u32) << (ROUND_SHIFT * (rounds - round - 1))
}

/// Returns the index of the first suit after `suit` that does not belong to the same group.
#[inline]
pub(crate) fn group_end(equal: u8, suit: usize) -> usize {
    let mut end = suit + 1;
    while end < NUM_SUITS && equal & (1 << end) != 0 {
        end += 1;
    }
    end
}

/// Enumerates suit histories of the rounds `0..=target`.
struct Enumerator<'a> {
    cards_per_round: &'a [u8],
    target: usize,
}

impl Enumerator<'_> {
    #[inline]
    fn rounds(&self) -> usize {
        self.cards_per_round.len()
    }

    /// Calls `observe` on each canonical shape of the target round.
    fn configurations<F: FnMut(&Shape)>(&self, observe: &mut F) {
        let mut used = [0; NUM_SUITS];
        let mut shape = [0; NUM_SUITS];
        let equal = (1 << NUM_SUITS) - 2;
        let remaining = self.cards_per_round[0] as usize;
        self.configurations_recursive(0, remaining, 0, equal, &mut used, &mut shape, observe);
    }

    #[allow(clippy::too_many_arguments)]
    fn configurations_recursive<F: FnMut(&Shape)>(
        &self,
        round: usize,
        remaining: usize,
        suit: usize,
        equal: u32,
        used: &mut [usize; NUM_SUITS],
        shape: &mut Shape,
        observe: &mut F,
    ) {
        if suit == NUM_SUITS {
            if round == self.target {
                observe(shape);
            } else {
                let remaining = self.cards_per_round[round + 1] as usize;
                self.configurations_recursive(round + 1, remaining, 0, equal, used, shape, observe);
            }
            return;
        }

        let min = if suit == NUM_SUITS - 1 { remaining } else { 0 };
        let mut max = usize::min(NUM_RANKS - used[suit], remaining);

        // suits with identical histories so far must stay in descending order
        let was_equal = equal & (1 << suit) != 0;
        let previous = if was_equal {
            round_count(shape[suit - 1], self.rounds(), round)
        } else {
            NUM_RANKS + 1
        };
        max = usize::min(max, previous);

        let (old_history, old_used) = (shape[suit], used[suit]);
        for count in min..=max {
            let is_equal = was_equal && count == previous;
            let new_equal = (equal & !(1 << suit)) | (is_equal as u32) << suit;

            used[suit] = old_used + count;
            shape[suit] = with_round_count(old_history, self.rounds(), round, count);
            self.configurations_recursive(
                round,
                remaining - count,
                suit + 1,
                new_equal,
                used,
                shape,
                observe,
            );
        }

        shape[suit] = old_history;
        used[suit] = old_used;
    }

    /// Calls `observe` on each raw (non-canonical) suit history of the target round.
    fn permutations<F: FnMut(&Shape)>(&self, observe: &mut F) {
        let mut used = [0; NUM_SUITS];
        let mut counts = [0; NUM_SUITS];
        let remaining = self.cards_per_round[0] as usize;
        self.permutations_recursive(0, remaining, 0, &mut used, &mut counts, observe);
    }

    fn permutations_recursive<F: FnMut(&Shape)>(
        &self,
        round: usize,
        remaining: usize,
        suit: usize,
        used: &mut [usize; NUM_SUITS],
        counts: &mut Shape,
        observe: &mut F,
    ) {
        if suit == NUM_SUITS {
            if round == self.target {
                observe(counts);
            } else {
                let remaining = self.cards_per_round[round + 1] as usize;
                self.permutations_recursive(round + 1, remaining, 0, used, counts, observe);
            }
            return;
        }

        let min = if suit == NUM_SUITS - 1 { remaining } else { 0 };
        let max = usize::min(NUM_RANKS - used[suit], remaining);

        let (old_history, old_used) = (counts[suit], used[suit]);
        for count in min..=max {
            used[suit] = old_used + count;
            counts[suit] = with_round_count(old_history, self.rounds(), round, count);
            self.permutations_recursive(round, remaining - count, suit + 1, used, counts, observe);
        }

        counts[suit] = old_history;
        used[suit] = old_used;
    }

    /// Computes the mixed-radix key of raw suit histories.
    ///
    /// Must agree with the key accumulated by [`HandIndexerState`](crate::HandIndexerState).
    fn permutation_key(&self, counts: &Shape) -> usize {
        let mut key = 0;
        let mut multiplier = 1;
        for round in 0..=self.target {
            let mut remaining = self.cards_per_round[round] as usize;
            for &history in &counts[..NUM_SUITS - 1] {
                let count = round_count(history, self.rounds(), round);
                key += multiplier * count;
                multiplier *= remaining + 1;
                remaining -= count;
            }
        }
        key
    }
}

impl RoundTables {
    /// Builds the tables of `round`.
    ///
    /// `cards_per_round` must already be validated by the caller.
    pub(crate) fn build(cards_per_round: &[u8], round: usize) -> Result<Self, IndexerError> {
        let enumerator = Enumerator {
            cards_per_round,
            target: round,
        };
        let rounds = cards_per_round.len();
        let overflow = IndexerError::InvalidCardsPerRound {
            round,
            cards: cards_per_round[round] as usize,
        };

        // enumeration order is not sorted
        let mut configurations = Vec::new();
        enumerator.configurations(&mut |shape| configurations.push(*shape));
        configurations.sort_unstable();

        let mut suit_size = Vec::with_capacity(configurations.len());
        let mut equal = Vec::with_capacity(configurations.len());
        let mut offset = Vec::with_capacity(configurations.len());
        let mut size = 0u64;

        for shape in &configurations {
            let mut sizes = [0; NUM_SUITS];
            let mut equal_bits = 0;
            let mut weight = 1u64;

            let mut suit = 0;
            while suit < NUM_SUITS {
                let mut suit_weight = 1;
                let mut remaining = NUM_RANKS;
                for r in 0..=round {
                    let count = round_count(shape[suit], rounds, r);
                    suit_weight *= binomial(remaining, count);
                    remaining -= count;
                }

                let mut end = suit + 1;
                while end < NUM_SUITS && shape[end] == shape[suit] {
                    equal_bits |= 1 << end;
                    end += 1;
                }

                sizes[suit..end].fill(suit_weight);
                let group_weight = multiset_binomial(suit_weight, end - suit);
                weight = group_weight
                    .and_then(|w| weight.checked_mul(w))
                    .ok_or_else(|| overflow.clone())?;

                suit = end;
            }

            suit_size.push(sizes);
            equal.push(equal_bits);
            offset.push(size);
            size = size.checked_add(weight).ok_or_else(|| overflow.clone())?;
        }

        let mut num_permutations = 0;
        enumerator.permutations(&mut |counts| {
            num_permutations = usize::max(num_permutations, enumerator.permutation_key(counts) + 1);
        });

        let mut permutation_to_configuration = vec![0; num_permutations];
        let mut permutation_to_pi = vec![[0; NUM_SUITS]; num_permutations];

        enumerator.permutations(&mut |counts| {
            let key = enumerator.permutation_key(counts);

            // stable: suits with identical histories keep their relative order
            let mut pi = [0, 1, 2, 3];
            pi.sort_by(|&a, &b| counts[b as usize].cmp(&counts[a as usize]));

            let canonical = pi.map(|suit| counts[suit as usize]);
            let configuration = configurations.binary_search(&canonical).unwrap();

            permutation_to_configuration[key] = configuration as u32;
            permutation_to_pi[key] = pi;
        });

        trace!(
            "round {round}: {} configurations, {num_permutations} permutations, size {size}",
            configurations.len()
        );

        Ok(Self {
            rounds,
            round,
            configurations,
            suit_size,
            equal,
            offset,
            size,
            permutation_to_configuration,
            permutation_to_pi,
        })
    }

    #[inline]
    pub(crate) fn num_configurations(&self) -> usize {
        self.configurations.len()
    }

    #[inline]
    pub(crate) fn num_permutations(&self) -> usize {
        self.permutation_to_configuration.len()
    }

    #[inline]
    pub(crate) fn size(&self) -> u64 {
        self.size
    }

    /// Combines per-suit colex indices into the canonical index of the round.
    ///
    /// `suit_index[s]` and `suit_multiplier[s]` are the mixed-radix rank of suit `s` and its
    /// radix; `permutation_key` is the mixed-radix key of the raw suit histories.
    pub(crate) fn index(
        &self,
        suit_index: &[u64; NUM_SUITS],
        suit_multiplier: &[u64; NUM_SUITS],
        permutation_key: usize,
    ) -> u64 {
        let configuration = self.permutation_to_configuration[permutation_key] as usize;
        let pi = self.permutation_to_pi[permutation_key];
        let equal = self.equal[configuration];

        let mut suit_index = pi.map(|suit| suit_index[suit as usize]);
        let suit_multiplier = pi.map(|suit| suit_multiplier[suit as usize]);

        let mut index = self.offset[configuration];
        let mut multiplier = 1;

        let mut suit = 0;
        while suit < NUM_SUITS {
            let end = group_end(equal, suit);

            // identical suits are ranked as a multiset
            let group = &mut suit_index[suit..end];
            group.sort_unstable();
            let part = group
                .iter()
                .enumerate()
                .map(|(i, &x)| multiset_binomial(x, i + 1).unwrap_or(u64::MAX))
                .sum::<u64>();
            let size = multiset_binomial(suit_multiplier[suit], end - suit).unwrap_or(u64::MAX);

            index += multiplier * part;
            multiplier = multiplier.saturating_mul(size);
            suit = end;
        }

        index
    }

    /// Recovers the canonical shape and per-suit mixed-radix ranks of `index`.
    ///
    /// `index` must be less than `self.size()`.
    pub(crate) fn unindex(&self, index: u64) -> (Shape, [u64; NUM_SUITS]) {
        let configuration = self.offset.partition_point(|&o| o <= index) - 1;
        let shape = self.configurations[configuration];
        let sizes = &self.suit_size[configuration];
        let equal = self.equal[configuration];

        let mut index = index - self.offset[configuration];
        let mut suit_index = [0; NUM_SUITS];

        let mut suit = 0;
        while suit < NUM_SUITS {
            let end = group_end(equal, suit);
            let suit_size = sizes[suit];
            let group_size = multiset_binomial(suit_size, end - suit).unwrap_or(u64::MAX);
            let mut group_index = index % group_size;
            index /= group_size;

            // the largest element of the multiset is assigned to the first suit of the group
            for (i, slot) in suit_index[suit..end - 1].iter_mut().enumerate() {
                let k = end - suit - i;
                let (mut low, mut high) = (0, suit_size);
                while high - low > 1 {
                    let mid = low + (high - low) / 2;
                    if multiset_binomial(mid, k).map_or(false, |c| c <= group_index) {
                        low = mid;
                    } else {
                        high = mid;
                    }
                }
                *slot = low;
                group_index -= multiset_binomial(low, k).unwrap_or(0);
            }
            suit_index[end - 1] = group_index;

            suit = end;
        }

        (shape, suit_index)
    }

    /// Returns the number of cards of `suit` of `shape` dealt in round `r`.
    #[inline]
    pub(crate) fn count(&self, shape: &Shape, suit: usize, r: usize) -> usize {
        debug_assert!(r <= self.round);
        round_count(shape[suit], self.rounds, r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(cards_per_round: &[u8], round: usize) -> RoundTables {
        RoundTables::build(cards_per_round, round).unwrap()
    }

    #[test]
    fn test_preflop_configurations() {
        let tables = build(&[2], 0);
        assert_eq!(tables.configurations, vec![[1, 1, 0, 0], [2, 0, 0, 0]]);
        assert_eq!(tables.suit_size, vec![[13, 13, 1, 1], [78, 1, 1, 1]]);
        assert_eq!(tables.equal, vec![0b1010, 0b1100]);
        assert_eq!(tables.offset, vec![0, 91]);
        assert_eq!(tables.size(), 169);
    }

    #[test]
    fn test_configurations_are_canonical() {
        let cards_per_round = [2, 3, 1, 1];
        for round in 0..cards_per_round.len() {
            let tables = build(&cards_per_round, round);
            let total = cards_per_round[..=round].iter().sum::<u8>() as usize;

            for w in tables.configurations.windows(2) {
                assert!(w[0] < w[1]);
            }
            for shape in &tables.configurations {
                assert!(shape.windows(2).all(|w| w[0] >= w[1]));
                let dealt = (0..NUM_SUITS)
                    .flat_map(|suit| (0..=round).map(move |r| (suit, r)))
                    .map(|(suit, r)| tables.count(shape, suit, r))
                    .sum::<usize>();
                assert_eq!(dealt, total);
            }
            for w in tables.offset.windows(2) {
                assert!(w[0] < w[1]);
            }
        }
    }

    #[test]
    fn test_permutation_tables() {
        let cards_per_round = [2, 3];
        let tables = build(&cards_per_round, 1);
        let enumerator = Enumerator {
            cards_per_round: &cards_per_round,
            target: 1,
        };

        let mut num_observed = 0;
        enumerator.permutations(&mut |counts| {
            num_observed += 1;
            let key = enumerator.permutation_key(counts);
            let configuration = tables.permutation_to_configuration[key] as usize;
            let pi = tables.permutation_to_pi[key];
            let mut sorted = *counts;
            sorted.sort_unstable_by(|a, b| b.cmp(a));
            assert_eq!(tables.configurations[configuration], sorted);
            assert_eq!(pi.map(|suit| counts[suit as usize]), sorted);
        });

        assert!(num_observed <= tables.num_permutations());
    }

    #[test]
    fn test_sizes() {
        let sizes = [169, 1286792, 55190538, 2428287420];
        for (round, &size) in sizes.iter().enumerate() {
            assert_eq!(build(&[2, 3, 1, 1], round).size(), size);
        }
        assert_eq!(build(&[2, 4], 1).size(), 13960050);
        assert_eq!(build(&[2, 5], 1).size(), 123156254);
        assert_eq!(build(&[5], 0).size(), 134459);
    }
}
