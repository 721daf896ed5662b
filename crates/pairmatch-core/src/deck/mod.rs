//! Cards and deck generation.

mod card;
mod generator;

pub use card::{Card, CardId, Symbol};
pub use generator::{DeckRng, deck_rng, generate_deck};
