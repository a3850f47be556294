//! Deck Engine
//!
//! Owns the drawable multiset of card definitions. A fresh deck holds
//! `copies_per_deck` copies of every catalog entry, shuffled. Drawing
//! from an empty deck silently rebuilds and reshuffles; only an empty
//! catalog is an error.

use tracing::{debug, info};

use crate::core::rng::DeterministicRng;
use crate::game::card::CardDefinition;

/// The drawable deck for the current level.
#[derive(Clone, Debug)]
pub struct Deck {
    catalog: Vec<CardDefinition>,
    cards: Vec<CardDefinition>,
}

impl Deck {
    /// Build and shuffle a deck from the catalog.
    pub fn new(catalog: Vec<CardDefinition>, rng: &mut DeterministicRng) -> Self {
        let mut deck = Self {
            catalog,
            cards: Vec::new(),
        };
        deck.reset(rng);
        deck
    }

    /// Rebuild the drawable sequence as `copies_per_deck` repetitions of
    /// each catalog entry, then shuffle.
    pub fn reset(&mut self, rng: &mut DeterministicRng) {
        self.cards.clear();
        for def in &self.catalog {
            for _ in 0..def.copies_per_deck {
                self.cards.push(*def);
            }
        }
        rng.shuffle(&mut self.cards);
        info!("Deck reset with {} cards", self.cards.len());
    }

    /// Remove and return the top card.
    ///
    /// An empty deck resets and retries exactly once; that fails only
    /// when the catalog itself produces zero cards.
    pub fn draw(&mut self, rng: &mut DeterministicRng) -> Result<CardDefinition, DeckError> {
        if self.cards.is_empty() {
            info!("Deck exhausted, reshuffling from catalog");
            self.reset(rng);
            if self.cards.is_empty() {
                return Err(DeckError::Exhausted);
            }
        }
        let card = self.cards.remove(0);
        debug!(value = card.face_value, "Drew card");
        Ok(card)
    }

    /// Cards remaining before the next reshuffle.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True when the next draw will reshuffle.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Deck errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DeckError {
    /// The catalog produces an empty deck. Configuration error.
    #[error("Card catalog produces an empty deck")]
    Exhausted,
}
