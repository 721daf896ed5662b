use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{Card, CardId, Symbol};

/// Random source used for shuffling decks. Reproducible from a seed.
pub type DeckRng = ChaCha8Rng;

/// Build two face-down cards per symbol and shuffle them.
///
/// Card ids are assigned in generation order (`0..2k`) before shuffling, so
/// ids carry no information about position. Symbols are expected to be
/// distinct; duplicates yield more than two cards of that face.
pub fn generate_deck<R: Rng + ?Sized>(symbols: &[Symbol], rng: &mut R) -> Vec<Card> {
    let mut cards = Vec::with_capacity(symbols.len() * 2);
    let mut next_id: CardId = 0;

    for symbol in symbols {
        for _ in 0..2 {
            cards.push(Card::face_down(next_id, symbol.clone()));
            next_id += 1;
        }
    }

    cards.shuffle(rng);
    cards
}

/// Create a deck RNG from an optional fixed seed.
pub fn deck_rng(seed: Option<u64>) -> DeckRng {
    match seed {
        Some(seed) => DeckRng::seed_from_u64(seed),
        None => DeckRng::from_entropy(),
    }
}
