use std::fmt;

use exito_game::constants::STARTING_MONEY;
use exito_game::{Card, GameState, Player, Rewards, RouteId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Choices a bot makes where a human player would be asked.
pub trait BotPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Whether to pay `cost` and enter `route`.
    fn enter_route(&mut self, state: &GameState, route: &RouteId, cost: i64) -> bool;

    /// Verdict of the other players on a card that requires judgment.
    fn judge_card(&mut self, state: &GameState, card: &Card) -> bool;

    /// Gift `giver` hands to `receiver` on their birthday.
    fn gift(&mut self, giver: &Player, receiver: &Player) -> Rewards;
}

/// Built-in strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Cautious,
    Bold,
    Random,
}

impl Strategy {
    pub const ALL: [Self; 3] = [Self::Cautious, Self::Bold, Self::Random];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cautious => "cautious",
            Self::Bold => "bold",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cautious => "keeps a cash reserve before entering routes, gives small gifts",
            Self::Bold => "enters every affordable route and gives generously",
            Self::Random => "seeded coin flips for every decision",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(token.trim()))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn BotPolicy> {
        match self {
            Self::Cautious => Box::new(CautiousPolicy),
            Self::Bold => Box::new(BoldPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

struct CautiousPolicy;
struct BoldPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed ^ 0x5EED_B075),
        }
    }
}

fn current_money(state: &GameState) -> i64 {
    state.current_player().map_or(0, |player| player.stats.money)
}

impl BotPolicy for CautiousPolicy {
    fn name(&self) -> &'static str {
        "Cautious"
    }

    fn enter_route(&mut self, state: &GameState, _route: &RouteId, cost: i64) -> bool {
        current_money(state) - cost >= STARTING_MONEY
    }

    fn judge_card(&mut self, _state: &GameState, _card: &Card) -> bool {
        true
    }

    fn gift(&mut self, giver: &Player, _receiver: &Player) -> Rewards {
        Rewards::money((giver.stats.money / 10).min(1_000))
    }
}

impl BotPolicy for BoldPolicy {
    fn name(&self) -> &'static str {
        "Bold"
    }

    fn enter_route(&mut self, state: &GameState, _route: &RouteId, cost: i64) -> bool {
        current_money(state) >= cost
    }

    fn judge_card(&mut self, _state: &GameState, _card: &Card) -> bool {
        true
    }

    fn gift(&mut self, giver: &Player, _receiver: &Player) -> Rewards {
        Rewards {
            money: 2_000,
            happiness: i32::from(giver.stats.happiness > 5),
            ..Rewards::default()
        }
    }
}

impl BotPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn enter_route(&mut self, _state: &GameState, _route: &RouteId, _cost: i64) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn judge_card(&mut self, _state: &GameState, _card: &Card) -> bool {
        self.rng.gen_bool(0.7)
    }

    fn gift(&mut self, _giver: &Player, _receiver: &Player) -> Rewards {
        Rewards {
            money: self.rng.gen_range(0..=4) * 500,
            health: self.rng.gen_range(0..=1),
            ..Rewards::default()
        }
    }
}
