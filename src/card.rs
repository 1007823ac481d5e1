use once_cell::sync::Lazy;
use regex::Regex;

/// A type representing a card, defined as an alias of `u8`.
///
/// The correspondence between the card and its ID is defined as follows:
/// - `card_id = 4 * rank + suit` (where `0 <= card_id < 52`)
///   - `rank`: 2 => `0`, 3 => `1`, 4 => `2`, ..., K => `11`, A => `12`
///   - `suit`: club => `0`, diamond => `1`, heart => `2`, spade => `3`
///
/// # Examples
/// - `2c` => `0`
/// - `2d` => `1`
/// - `2h` => `2`
/// - `2s` => `3`
/// - `3c` => `4`
/// - `Ah` => `50`
/// - `As` => `51`
pub type Card = u8;

/// Number of suits in the deck.
pub const NUM_SUITS: usize = 4;

/// Number of ranks in each suit.
pub const NUM_RANKS: usize = 13;

/// Number of cards in the deck.
pub const NUM_CARDS: usize = NUM_SUITS * NUM_RANKS;

const CARD_PAT: &str = r"[AaKkQqJjTt2-9][cdhs]";

static HAND_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s*(?:{CARD_PAT}\s*)+(?:[|/]\s*(?:{CARD_PAT}\s*)+)*$"
    ))
    .unwrap()
});

static CARD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(CARD_PAT).unwrap());

/// Creates a card from its rank and suit.
///
/// `rank` must be less than [`NUM_RANKS`] and `suit` less than [`NUM_SUITS`]; other inputs give
/// an invalid card (and panic in debug builds).
///
/// # Examples
/// ```
/// use handiso::make_card;
///
/// assert_eq!(make_card(0, 0), 0);
/// assert_eq!(make_card(12, 3), 51);
/// ```
#[inline]
pub fn make_card(rank: u8, suit: u8) -> Card {
    debug_assert!((rank as usize) < NUM_RANKS && (suit as usize) < NUM_SUITS);
    (rank << 2) | suit
}

/// Returns the rank of the card.
#[inline]
pub fn card_rank(card: Card) -> u8 {
    card >> 2
}

/// Returns the suit of the card.
#[inline]
pub fn card_suit(card: Card) -> u8 {
    card & 3
}

const RANK_CHARS: [u8; NUM_RANKS] = *b"23456789TJQKA";
const SUIT_CHARS: [u8; NUM_SUITS] = *b"cdhs";

/// Parses a rank character; face cards may be written in either case.
#[inline]
fn parse_rank(c: char) -> Result<u8, String> {
    RANK_CHARS
        .iter()
        .position(|&r| r as char == c.to_ascii_uppercase())
        .map(|rank| rank as u8)
        .ok_or_else(|| format!("Unknown rank: {c}"))
}

#[inline]
fn parse_suit(c: char) -> Result<u8, String> {
    SUIT_CHARS
        .iter()
        .position(|&s| s as char == c)
        .map(|suit| suit as u8)
        .ok_or_else(|| format!("Unknown suit: {c}"))
}

#[inline]
pub(crate) fn check_card(card: Card) -> Result<(), String> {
    if card as usize >= NUM_CARDS {
        return Err(format!("Card out of range: {card}"));
    }
    Ok(())
}

/// Formats a card as a rank character followed by a suit character.
///
/// # Examples
/// ```
/// use handiso::card_to_string;
///
/// assert_eq!(card_to_string(0), Ok("2c".to_string()));
/// assert_eq!(card_to_string(33), Ok("Td".to_string()));
/// assert_eq!(card_to_string(51), Ok("As".to_string()));
/// assert!(card_to_string(52).is_err());
/// ```
#[inline]
pub fn card_to_string(card: Card) -> Result<String, String> {
    check_card(card)?;
    let rank = RANK_CHARS[card_rank(card) as usize] as char;
    let suit = SUIT_CHARS[card_suit(card) as usize] as char;
    Ok([rank, suit].iter().collect())
}

/// Formats a list of cards without separators.
///
/// # Examples
/// ```
/// use handiso::cards_to_string;
///
/// assert_eq!(cards_to_string(&[51, 47]), Ok("AsKs".to_string()));
/// assert!(cards_to_string(&[52]).is_err());
/// ```
#[inline]
pub fn cards_to_string(cards: &[Card]) -> Result<String, String> {
    cards.iter().map(|&card| card_to_string(card)).collect()
}

/// Consumes one card (a rank character and a suit character) from `chars`.
///
/// # Examples
/// ```
/// use handiso::card_from_chars;
///
/// let mut chars = "Td9d6h".chars();
/// assert_eq!(card_from_chars(&mut chars), Ok(33));
/// assert_eq!(card_from_chars(&mut chars), Ok(29));
/// assert_eq!(card_from_chars(&mut chars), Ok(18));
/// assert!(card_from_chars(&mut chars).is_err());
/// ```
#[inline]
pub fn card_from_chars<T: Iterator<Item = char>>(chars: &mut T) -> Result<Card, String> {
    match (chars.next(), chars.next()) {
        (Some(rank), Some(suit)) => Ok(make_card(parse_rank(rank)?, parse_suit(suit)?)),
        _ => Err("Unexpected end of card string".to_string()),
    }
}

/// Parses a single two-character card.
///
/// # Examples
/// ```
/// use handiso::card_from_str;
///
/// assert_eq!(card_from_str("2c"), Ok(0));
/// assert_eq!(card_from_str("kh"), Ok(46));
/// assert!(card_from_str("As ").is_err());
/// ```
#[inline]
pub fn card_from_str(s: &str) -> Result<Card, String> {
    let mut chars = s.chars();
    let card = card_from_chars(&mut chars)?;
    match chars.next() {
        None => Ok(card),
        Some(_) => Err(format!("Trailing characters after card: {s}")),
    }
}

/// Parses a list of cards, optionally separated by whitespace.
///
/// Cards keep their order and must be unique.
///
/// # Examples
/// ```
/// use handiso::cards_from_str;
///
/// assert_eq!(cards_from_str("AsKs"), Ok(vec![51, 47]));
/// assert_eq!(cards_from_str("Td 9d 6h"), Ok(vec![33, 29, 18]));
/// assert!(cards_from_str("AsAs").is_err());
/// ```
pub fn cards_from_str(s: &str) -> Result<Vec<Card>, String> {
    let compact = s.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>();
    if compact.is_empty() {
        return Err("Expected at least one card".to_string());
    }

    let cards = compact
        .chunks(2)
        .map(|pair| card_from_chars(&mut pair.iter().copied()))
        .collect::<Result<Vec<_>, _>>()?;

    check_unique(&cards)?;
    Ok(cards)
}

/// Parses a hand written round by round.
///
/// Rounds are separated by `|` or `/`, and cards within a round may be separated by whitespace.
/// Cards must be unique across all rounds.
///
/// # Examples
/// ```
/// use handiso::hand_from_str;
///
/// let hand = hand_from_str("AsKs | Td9d6h | Qc").unwrap();
/// assert_eq!(hand, vec![vec![51, 47], vec![33, 29, 18], vec![40]]);
/// assert!(hand_from_str("AsKs | As").is_err());
/// assert!(hand_from_str("AsKs ||").is_err());
/// ```
pub fn hand_from_str(s: &str) -> Result<Vec<Vec<Card>>, String> {
    if !HAND_REGEX.is_match(s) {
        return Err(format!("Invalid hand: {s}"));
    }

    let hand = s
        .split(['|', '/'])
        .map(|round| {
            CARD_REGEX
                .find_iter(round)
                .map(|m| card_from_str(m.as_str()))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    check_unique(&hand.concat())?;
    Ok(hand)
}

#[inline]
fn check_unique(cards: &[Card]) -> Result<(), String> {
    let mut mask: u64 = 0;
    for &card in cards {
        if mask & (1 << card) != 0 {
            return Err(format!("Duplicate card: {}", card_to_string(card)?));
        }
        mask |= 1 << card;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_components() {
        for card in 0..NUM_CARDS as Card {
            assert_eq!(make_card(card_rank(card), card_suit(card)), card);
        }
        assert_eq!(card_rank(51), 12);
        assert_eq!(card_suit(51), 3);
        assert_eq!(card_rank(4), 1);
        assert_eq!(card_suit(4), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_make_card_rank_out_of_range() {
        make_card(13, 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_make_card_suit_out_of_range() {
        make_card(0, 4);
    }

    #[test]
    fn test_card_string() {
        for card in 0..NUM_CARDS as Card {
            let s = card_to_string(card).unwrap();
            assert_eq!(card_from_str(&s), Ok(card));
        }
        assert!(card_from_str("1c").is_err());
        assert!(card_from_str("Ax").is_err());
        assert!(card_from_str("AsK").is_err());
    }

    #[test]
    fn test_hand_from_str() {
        let hand = hand_from_str("2c2d/3h").unwrap();
        assert_eq!(hand, vec![vec![0, 1], vec![6]]);

        assert!(hand_from_str("").is_err());
        assert!(hand_from_str("2c | ").is_err());
        assert!(hand_from_str("2c2x").is_err());
        assert!(hand_from_str("2c | 2c").is_err());
    }
}
