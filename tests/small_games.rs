extern crate handiso;
use handiso::*;
use std::collections::HashMap;

/// Returns all 24 permutations of the suits.
fn suit_permutations() -> Vec<[u8; 4]> {
    let mut result = Vec::new();
    for a in 0..4 {
        for b in 0..4 {
            for c in 0..4 {
                let d = 6 - a - b - c;
                if a != b && a != c && b != c {
                    result.push([a, b, c, d]);
                }
            }
        }
    }
    result
}

/// Computes the isomorphism class of a hand by brute force: the smallest rewriting of the hand
/// over all suit permutations, with each round sorted.
fn brute_canonical(rounds: &[Vec<Card>], permutations: &[[u8; 4]]) -> Vec<Vec<Card>> {
    permutations
        .iter()
        .map(|permutation| {
            rounds
                .iter()
                .map(|cards| {
                    let mut cards = cards
                        .iter()
                        .map(|&c| make_card(card_rank(c), permutation[card_suit(c) as usize]))
                        .collect::<Vec<_>>();
                    cards.sort_unstable();
                    cards
                })
                .collect::<Vec<_>>()
        })
        .min()
        .unwrap()
}

/// Calls `observe` on every hand of the game, with the cards of each round in ascending order.
fn for_each_hand<F: FnMut(&[Vec<Card>])>(cards_per_round: &[u8], observe: &mut F) {
    fn recursive<F: FnMut(&[Vec<Card>])>(
        cards_per_round: &[u8],
        used: u64,
        rounds: &mut Vec<Vec<Card>>,
        observe: &mut F,
    ) {
        let round = rounds.len();
        if round == cards_per_round.len() {
            observe(rounds);
            return;
        }

        let num_cards = cards_per_round[round] as usize;
        let available = (0..NUM_CARDS as u8)
            .filter(|&c| used & (1 << c) == 0)
            .collect::<Vec<_>>();

        for subset in 0..binomial(available.len(), num_cards) {
            let positions = colex_unrank(available.len(), num_cards, subset).unwrap();
            let cards = positions
                .iter()
                .map(|&p| available[p as usize])
                .collect::<Vec<_>>();
            let mask = cards.iter().fold(used, |acc, &c| acc | 1 << c);
            rounds.push(cards);
            recursive(cards_per_round, mask, rounds, observe);
            rounds.pop();
        }
    }

    recursive(cards_per_round, 0, &mut Vec::new(), observe);
}

/// Checks that the indices of the last round are exactly the isomorphism classes.
fn check_bijection(cards_per_round: &[u8]) {
    let indexer = HandIndexer::new(cards_per_round).unwrap();
    let last = indexer.rounds() - 1;
    let permutations = suit_permutations();

    let mut index_to_class = HashMap::new();
    let mut class_to_index = HashMap::new();

    for_each_hand(cards_per_round, &mut |rounds| {
        let index = indexer.index_last(&rounds.concat()).unwrap();
        assert!(index < indexer.size(last));

        let class = brute_canonical(rounds, &permutations);
        assert_eq!(*index_to_class.entry(index).or_insert(class.clone()), class);
        assert_eq!(*class_to_index.entry(class).or_insert(index), index);
    });

    assert_eq!(index_to_class.len() as u64, indexer.size(last));

    for index in 0..indexer.size(last) {
        let cards = indexer.unindex(last, index).unwrap();
        assert_eq!(indexer.index_last(&cards).unwrap(), index);
    }
}

#[test]
fn one_card() {
    let indexer = HandIndexer::new(&[1]).unwrap();
    assert_eq!(indexer.size(0), 13);
    check_bijection(&[1]);
}

#[test]
fn preflop() {
    check_bijection(&[2]);
}

#[test]
fn three_card_flop() {
    check_bijection(&[3]);
}

#[test]
fn one_card_then_one_card() {
    check_bijection(&[1, 1]);
}

#[test]
fn hole_cards_then_one_card() {
    check_bijection(&[2, 1]);
}

#[test]
fn three_rounds() {
    check_bijection(&[1, 1, 1]);
}

#[test]
fn sizes_are_monotonic() {
    for cards_per_round in [&[2, 3, 1, 1][..], &[1, 1, 1, 1], &[4, 3, 1, 1], &[3, 4]] {
        let indexer = HandIndexer::new(cards_per_round).unwrap();
        for round in 1..indexer.rounds() {
            assert!(indexer.size(round - 1) < indexer.size(round));
            assert!(indexer.configurations(round - 1) <= indexer.configurations(round));
        }
    }
}

#[test]
fn every_round_of_a_full_game() {
    let indexer = HandIndexer::new(&[1, 1]).unwrap();
    let permutations = suit_permutations();
    let mut first_round = HashMap::new();

    for_each_hand(&[1, 1], &mut |rounds| {
        let indices = indexer.index_all(&rounds.concat()).unwrap();
        assert_eq!(indices.len(), 2);

        let class = brute_canonical(&rounds[..1], &permutations);
        assert_eq!(*first_round.entry(class).or_insert(indices[0]), indices[0]);
    });

    assert_eq!(first_round.len() as u64, indexer.size(0));
}
