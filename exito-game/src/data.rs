//! Cards, reward deltas and the decks they are drawn from.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::board::RouteId;

const DEFAULT_DECK_DATA: &str = include_str!("../assets/data/decks.json");

/// Signed deltas applied to a player (and the shared pot) when a card resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rewards {
    #[serde(default)]
    pub money: i64,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub happiness: i32,
    #[serde(default)]
    pub passive: i64,
    /// Amount credited to the shared pot.
    #[serde(default)]
    pub pot_add: i64,
    /// Empty the shared pot after applying the other deltas.
    #[serde(default)]
    pub pot_reset: bool,
    /// Money actually lost by the player flows into the shared pot.
    #[serde(default)]
    pub pays_into_pot: bool,
}

impl Rewards {
    #[must_use]
    pub fn money(amount: i64) -> Self {
        Self {
            money: amount,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn health(amount: i32) -> Self {
        Self {
            health: amount,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn happiness(amount: i32) -> Self {
        Self {
            happiness: amount,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn passive(amount: i64) -> Self {
        Self {
            passive: amount,
            ..Self::default()
        }
    }

    /// A fine: the player loses `amount` and whatever is paid lands in the pot.
    #[must_use]
    pub fn fine(amount: i64) -> Self {
        Self {
            money: -amount.abs(),
            pays_into_pot: true,
            ..Self::default()
        }
    }

    /// True when applying these rewards would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.money == 0
            && self.health == 0
            && self.happiness == 0
            && self.passive == 0
            && self.pot_add == 0
            && !self.pot_reset
    }

    /// Component-wise sum of the player-facing deltas.
    #[must_use]
    pub fn combined(&self, other: &Self) -> Self {
        Self {
            money: self.money + other.money,
            health: self.health + other.health,
            happiness: self.happiness + other.happiness,
            passive: self.passive + other.passive,
            pot_add: self.pot_add + other.pot_add,
            pot_reset: self.pot_reset || other.pot_reset,
            pays_into_pot: self.pays_into_pot || other.pays_into_pot,
        }
    }
}

/// A card as drawn from a deck or synthesized by a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub text: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub rewards: Rewards,
    /// The other players decide whether the card was completed.
    #[serde(default)]
    pub requires_judgment: bool,
}

impl Card {
    #[must_use]
    pub fn new(text: impl Into<String>, icon: impl Into<String>, rewards: Rewards) -> Self {
        Self {
            text: text.into(),
            icon: icon.into(),
            rewards,
            requires_judgment: false,
        }
    }

    #[must_use]
    pub fn judged(mut self) -> Self {
        self.requires_judgment = true;
        self
    }
}

/// Named source of random draws.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "deck", content = "route", rename_all = "snake_case")]
pub enum DeckId {
    Challenge,
    Expertise,
    Route(RouteId),
    Graduation,
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Challenge => f.write_str("challenge"),
            Self::Expertise => f.write_str("expertise"),
            Self::Route(route) => write!(f, "route:{route}"),
            Self::Graduation => f.write_str("graduation"),
        }
    }
}

/// All card decks used by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Decks {
    #[serde(default)]
    pub challenge: Vec<Card>,
    #[serde(default)]
    pub expertise: Vec<Card>,
    #[serde(default)]
    pub routes: BTreeMap<RouteId, Vec<Card>>,
}

impl Decks {
    /// Create empty decks (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load decks from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid deck data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Decks bundled with the crate.
    #[must_use]
    pub fn standard() -> &'static Self {
        static DECKS: OnceLock<Decks> = OnceLock::new();
        DECKS.get_or_init(|| {
            Self::from_json(DEFAULT_DECK_DATA).unwrap_or_else(|err| {
                log::warn!("bundled deck data is invalid: {err}");
                Self::empty()
            })
        })
    }

    /// Cards belonging to a deck; route decks that do not exist are empty.
    #[must_use]
    pub fn cards(&self, deck: &DeckId) -> &[Card] {
        match deck {
            DeckId::Challenge => &self.challenge,
            DeckId::Expertise => &self.expertise,
            DeckId::Route(route) => self.routes.get(route).map_or(&[], Vec::as_slice),
            DeckId::Graduation => &[],
        }
    }
}
