//! A library for mapping poker hands to and from a tight set of suit-isomorphic indices.
//!
//! # Examples
//! ```
//! use handiso::*;
//!
//! // hole cards, flop, turn and river
//! let indexer = HandIndexer::new(&[2, 3, 1, 1]).unwrap();
//!
//! // check the number of canonical hands of each round
//! let sizes = (0..indexer.rounds()).map(|r| indexer.size(r)).collect::<Vec<_>>();
//! assert_eq!(sizes, vec![169, 1286792, 55190538, 2428287420]);
//!
//! // hands that differ only in suit names or in card order within a round share an index
//! let hand1 = cards_from_str("AsKs Td9d6h").unwrap();
//! let hand2 = cards_from_str("KhAh 9cTc6d").unwrap();
//! let index = indexer.index_last(&hand1).unwrap();
//! assert_eq!(index, indexer.index_last(&hand2).unwrap());
//!
//! // index a hand round by round
//! let mut state = indexer.new_state();
//! let preflop = state.index_next_round(&cards_from_str("AsKs").unwrap()).unwrap();
//! let flop = state.index_next_round(&cards_from_str("Td9d6h").unwrap()).unwrap();
//! assert_eq!(flop, index);
//!
//! // obtain one representative of the isomorphism class
//! let canonical = indexer.unindex(0, preflop).unwrap();
//! println!("{}", cards_to_string(&canonical).unwrap()); // KcAc
//! assert_eq!(indexer.index_last(&canonical).unwrap(), preflop);
//! ```
//!
//! # Implementation details
//! - **Card encoding**: A card is an integer `4 * rank + suit` in `0..52`, where rank is `0` for
//!   deuce through `12` for ace and suit is `0` for clubs through `3` for spades.
//! - **Algorithm**: Each suit is ranked independently as a sequence of colexicographic subset
//!   indices, one per round. Suits are then sorted by their per-round card counts, and suits
//!   with identical counts are ranked as a multiset, so the result does not depend on suit
//!   names. The construction follows Waugh, "A Fast and Optimal Hand Isomorphism Algorithm"
//!   (2013).
//! - **Lookup tables**: Constructing an indexer enumerates every canonical suit configuration of
//!   every round and stores the offset of each. The tables of each round are built independently.
//!
//! # Crate features
//! - `rayon`: Uses [rayon] crate to build the lookup tables of different rounds in parallel.
//!   Enabled by default.
//!
//! [rayon]: https://github.com/rayon-rs/rayon

mod card;
mod colex;
mod configuration;
mod error;
mod indexer;
mod state;
mod utility;

pub use card::*;
pub use colex::*;
pub use configuration::{MAX_PERMUTATION_KEYS, MAX_ROUNDS};
pub use error::*;
pub use indexer::*;
pub use state::*;
