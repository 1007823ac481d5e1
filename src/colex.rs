//! Colexicographical ranking of subsets (combinatorial number system).
//!
//! The rank of a sorted subset `s[0] < s[1] < ... < s[k - 1]` is `sum_i C(s[i], i + 1)`.
//! General subsets of the deck use [`COMB_TABLE`]; subsets of the 13 ranks of a suit are
//! represented as bitsets and served by precomputed lookup tables.

use crate::card::*;
use once_cell::sync::Lazy;

/// Largest domain supported by [`COMB_TABLE`].
pub const MAX_DOMAIN: usize = NUM_CARDS;

/// Largest subset size supported by [`COMB_TABLE`].
pub const MAX_SUBSET: usize = NUM_RANKS;

/// `COMB_TABLE[k][n]` = `C(n, k)` for `n <= 52`, `k <= 13`.
pub const COMB_TABLE: [[u64; MAX_DOMAIN + 1]; MAX_SUBSET + 1] = build_comb_table();

const fn build_comb_table() -> [[u64; MAX_DOMAIN + 1]; MAX_SUBSET + 1] {
    let mut table = [[0; MAX_DOMAIN + 1]; MAX_SUBSET + 1];
    let mut n = 0;
    while n <= MAX_DOMAIN {
        table[0][n] = 1;
        let mut k = 1;
        while k <= MAX_SUBSET && k <= n {
            table[k][n] = table[k - 1][n - 1] + table[k][n - 1];
            k += 1;
        }
        n += 1;
    }
    table
}

/// Returns the binomial coefficient `C(n, k)`.
///
/// Returns `0` if `k > n` or if the arguments are outside of [`COMB_TABLE`].
///
/// # Examples
/// ```
/// use handiso::binomial;
///
/// assert_eq!(binomial(13, 2), 78);
/// assert_eq!(binomial(52, 5), 2598960);
/// assert_eq!(binomial(3, 4), 0);
/// ```
#[inline]
pub fn binomial(n: usize, k: usize) -> u64 {
    COMB_TABLE
        .get(k)
        .and_then(|row| row.get(n))
        .copied()
        .unwrap_or(0)
}

/// Returns the number of size-`k` multisets drawn from `n` values, i.e., `C(n + k - 1, k)`.
///
/// Returns `None` if the result does not fit in `u64`.
///
/// # Examples
/// ```
/// use handiso::multiset_binomial;
///
/// assert_eq!(multiset_binomial(13, 2), Some(91));
/// assert_eq!(multiset_binomial(1, 3), Some(1));
/// assert_eq!(multiset_binomial(0, 2), Some(0));
/// assert_eq!(multiset_binomial(5, 0), Some(1));
/// ```
#[inline]
pub fn multiset_binomial(n: u64, k: usize) -> Option<u64> {
    if k == 0 {
        return Some(1);
    }
    if n == 0 {
        return Some(0);
    }

    let top = n as u128 + k as u128 - 1;
    let mut result: u128 = 1;
    for i in 0..k as u128 {
        result = result.checked_mul(top - i)? / (i + 1);
        if result > u64::MAX as u128 {
            return None;
        }
    }

    Some(result as u64)
}

/// Computes the colex rank of a sorted subset.
///
/// Returns `None` unless the elements are strictly increasing, less than [`MAX_DOMAIN`], and at
/// most [`MAX_SUBSET`] in number.
///
/// # Examples
/// ```
/// use handiso::colex_rank;
///
/// assert_eq!(colex_rank(&[0, 1]), Some(0));
/// assert_eq!(colex_rank(&[0, 2]), Some(1));
/// assert_eq!(colex_rank(&[1, 2]), Some(2));
/// assert_eq!(colex_rank(&[0, 3]), Some(3));
/// assert_eq!(colex_rank(&[2, 1]), None);
/// ```
#[inline]
pub fn colex_rank(subset: &[u8]) -> Option<u64> {
    let is_sorted = subset.windows(2).all(|w| w[0] < w[1]);
    let in_domain = subset.last().map_or(true, |&x| (x as usize) < MAX_DOMAIN);
    if subset.len() > MAX_SUBSET || !is_sorted || !in_domain {
        return None;
    }

    Some(
        subset
            .iter()
            .enumerate()
            .map(|(i, &x)| COMB_TABLE[i + 1][x as usize])
            .sum(),
    )
}

/// Recovers the sorted size-`k` subset of `[0, n)` whose colex rank is `index`.
///
/// Returns `None` if the arguments are outside of the supported domain or if `index >= C(n, k)`.
///
/// # Examples
/// ```
/// use handiso::{colex_rank, colex_unrank};
///
/// assert_eq!(colex_unrank(52, 3, 0), Some(vec![0, 1, 2]));
/// assert_eq!(colex_unrank(4, 2, 5), Some(vec![2, 3]));
/// assert_eq!(colex_unrank(4, 2, 6), None);
///
/// let subset = colex_unrank(52, 5, 1234567).unwrap();
/// assert_eq!(colex_rank(&subset), Some(1234567));
/// ```
pub fn colex_unrank(n: usize, k: usize, mut index: u64) -> Option<Vec<u8>> {
    if n > MAX_DOMAIN || k > MAX_SUBSET || index >= binomial(n, k) {
        return None;
    }

    let mut result = vec![0; k];
    let mut bound = n;
    for i in (1..=k).rev() {
        let x = COMB_TABLE[i][..bound].partition_point(|&c| c <= index) - 1;
        index -= COMB_TABLE[i][x];
        result[i - 1] = x as u8;
        bound = x;
    }

    Some(result)
}

/// Lookup tables for subsets of the ranks of a single suit.
struct RankSetTables {
    rank_set_to_index: Vec<u32>,
    index_to_rank_set: Vec<Vec<u16>>,
    nth_unset: Vec<[u8; NUM_RANKS]>,
}

static RANK_SET_TABLES: Lazy<RankSetTables> = Lazy::new(|| {
    let num_sets = 1 << NUM_RANKS;

    let mut rank_set_to_index = vec![0; num_sets];
    let mut index_to_rank_set = (0..=NUM_RANKS)
        .map(|k| vec![0; binomial(NUM_RANKS, k) as usize])
        .collect::<Vec<_>>();
    let mut nth_unset = vec![[u8::MAX; NUM_RANKS]; num_sets];

    for set in 0..num_sets {
        let mut rest = set;
        let mut index = 0;
        let mut k = 0;
        while rest != 0 {
            k += 1;
            index += COMB_TABLE[k][rest.trailing_zeros() as usize];
            rest &= rest - 1;
        }
        rank_set_to_index[set] = index as u32;
        index_to_rank_set[k][index as usize] = set as u16;

        let mut unset = !set & (num_sets - 1);
        for slot in nth_unset[set].iter_mut() {
            if unset == 0 {
                break;
            }
            *slot = unset.trailing_zeros() as u8;
            unset &= unset - 1;
        }
    }

    RankSetTables {
        rank_set_to_index,
        index_to_rank_set,
        nth_unset,
    }
});

/// Returns the colex rank of a rank bitset among the bitsets with the same number of ranks.
///
/// # Examples
/// ```
/// use handiso::rank_set_to_index;
///
/// assert_eq!(rank_set_to_index(0b11), 0);
/// assert_eq!(rank_set_to_index(0b101), 1);
/// assert_eq!(rank_set_to_index(0b110), 2);
/// ```
#[inline]
pub fn rank_set_to_index(set: u16) -> u32 {
    RANK_SET_TABLES.rank_set_to_index[set as usize & ((1 << NUM_RANKS) - 1)]
}

/// Returns the rank bitset of size `size` whose colex rank is `index`.
///
/// Returns `None` if `size > 13` or `index >= C(13, size)`.
///
/// # Examples
/// ```
/// use handiso::index_to_rank_set;
///
/// assert_eq!(index_to_rank_set(2, 0), Some(0b11));
/// assert_eq!(index_to_rank_set(2, 2), Some(0b110));
/// assert_eq!(index_to_rank_set(13, 0), Some(0x1fff));
/// assert_eq!(index_to_rank_set(2, 78), None);
/// ```
#[inline]
pub fn index_to_rank_set(size: usize, index: u64) -> Option<u16> {
    let sets = RANK_SET_TABLES.index_to_rank_set.get(size)?;
    sets.get(usize::try_from(index).ok()?).copied()
}

/// Returns the `n`-th (0-based) rank that is not contained in `used`.
///
/// Returns `None` if fewer than `n + 1` ranks are unused. Bits above the 13 ranks are ignored.
///
/// # Examples
/// ```
/// use handiso::nth_unset;
///
/// assert_eq!(nth_unset(0, 0), Some(0));
/// assert_eq!(nth_unset(0b1011, 0), Some(2));
/// assert_eq!(nth_unset(0b1011, 1), Some(4));
/// assert_eq!(nth_unset(0x1fff, 0), None);
/// ```
#[inline]
pub fn nth_unset(used: u16, n: usize) -> Option<u8> {
    let unset = &RANK_SET_TABLES.nth_unset[used as usize & ((1 << NUM_RANKS) - 1)];
    unset.get(n).copied().filter(|&rank| rank != u8::MAX)
}
