//! Injected randomness: dice rolls and deck draws.
use hmac::{Hmac, Mac};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::collections::VecDeque;

use crate::constants::DIE_FACES;
use crate::data::{Card, DeckId, Decks};

/// Source of every random outcome the game consults.
pub trait RandomSource {
    /// A die face in `1..=6`.
    fn roll_die(&mut self) -> u8;

    /// Index of the next card drawn from a deck holding `len` cards.
    fn draw_index(&mut self, deck: &DeckId, len: usize) -> usize;

    /// Draw a card from `deck`, or `None` when the deck is empty.
    fn draw_card(&mut self, decks: &Decks, deck: &DeckId) -> Option<Card> {
        let cards = decks.cards(deck);
        if cards.is_empty() {
            return None;
        }
        let index = self.draw_index(deck, cards.len()) % cards.len();
        cards.get(index).cloned()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: RngCore> RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Deterministic source with separate dice and deck streams.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    dice: CountingRng<ChaCha20Rng>,
    decks: CountingRng<ChaCha20Rng>,
}

impl SeededRandom {
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            dice: CountingRng::new(derive_stream_seed(seed, b"dice")),
            decks: CountingRng::new(derive_stream_seed(seed, b"decks")),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn dice_draws(&self) -> u64 {
        self.dice.draws()
    }

    #[must_use]
    pub const fn deck_draws(&self) -> u64 {
        self.decks.draws()
    }
}

impl RandomSource for SeededRandom {
    fn roll_die(&mut self) -> u8 {
        self.dice.gen_range(1..=DIE_FACES)
    }

    fn draw_index(&mut self, deck: &DeckId, len: usize) -> usize {
        if len == 0 {
            log::debug!("draw from empty deck {deck}");
            return 0;
        }
        self.decks.gen_range(0..len)
    }
}

/// Queue-driven source for replaying exact outcomes in tests.
///
/// Exhausted queues fall back to a roll of 1 and the first card.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    dice: VecDeque<u8>,
    draws: VecDeque<usize>,
}

impl ScriptedRandom {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dice(mut self, dice: impl IntoIterator<Item = u8>) -> Self {
        self.dice.extend(dice);
        self
    }

    #[must_use]
    pub fn with_draws(mut self, draws: impl IntoIterator<Item = usize>) -> Self {
        self.draws.extend(draws);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn roll_die(&mut self) -> u8 {
        self.dice.pop_front().unwrap_or(1).clamp(1, DIE_FACES)
    }

    fn draw_index(&mut self, _deck: &DeckId, len: usize) -> usize {
        let index = self.draws.pop_front().unwrap_or(0);
        if len == 0 { 0 } else { index % len }
    }
}
