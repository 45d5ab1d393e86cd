//! Players, their personal goals and setup validation.
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::RouteId;
use crate::constants::{
    MAX_AGE, MAX_MONEY_GOAL, MIN_AGE, MIN_HAPPINESS_GOAL, MIN_HEALTH_GOAL, MIN_NAME_LEN,
    STARTING_MONEY, STARTING_PASSIVE, SUCCESS_TARGET,
};
use crate::data::Rewards;

/// Stable player identifier (the setup slot the player was saved into).
pub type PlayerId = usize;

/// Personal goals fixed at creation; time score plus the three goals equals 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Targets {
    pub time_score: i32,
    /// Money goal in thousands.
    pub money: i32,
    pub health: i32,
    pub happiness: i32,
}

impl Targets {
    #[must_use]
    pub const fn total(&self) -> i32 {
        self.time_score + self.money + self.health + self.happiness
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub money: i64,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub happiness: i32,
    #[serde(default)]
    pub passive: i64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            position: 0,
            money: STARTING_MONEY,
            health: 0,
            happiness: 0,
            passive: STARTING_PASSIVE,
        }
    }
}

impl Stats {
    pub fn clamp(&mut self) {
        self.money = self.money.max(0);
        self.health = self.health.max(0);
        self.happiness = self.happiness.max(0);
        self.passive = self.passive.max(0);
    }

    /// Whether money, health, happiness or passive income differ.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        self.money != other.money
            || self.health != other.health
            || self.happiness != other.happiness
            || self.passive != other.passive
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RouteStatus {
    #[serde(default)]
    pub in_route: bool,
    #[serde(default)]
    pub route: Option<RouteId>,
    #[serde(default)]
    pub steps: u32,
    #[serde(default)]
    pub visited: Vec<RouteId>,
}

impl RouteStatus {
    #[must_use]
    pub fn has_visited(&self, route: &RouteId) -> bool {
        self.visited.iter().any(|visited| visited == route)
    }

    pub fn enter(&mut self, route: RouteId, step: u32) {
        self.in_route = true;
        self.route = Some(route);
        self.steps = step;
    }

    /// Leave the active route, recording it as completed.
    pub fn graduate(&mut self) -> Option<RouteId> {
        let finished = self.route.take();
        if let Some(route) = finished.as_ref()
            && !self.has_visited(route)
        {
            self.visited.push(route.clone());
        }
        self.in_route = false;
        self.steps = 0;
        finished
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    pub targets: Targets,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub route: RouteStatus,
    #[serde(default)]
    pub laps: u32,
}

impl Player {
    /// Apply reward deltas, clamping stats at zero.
    ///
    /// Returns the amount of money actually lost (zero for gains).
    pub fn apply_rewards(&mut self, rewards: &Rewards) -> i64 {
        let before = self.stats.money;
        self.stats.money += rewards.money;
        self.stats.health += rewards.health;
        self.stats.happiness += rewards.happiness;
        self.stats.passive += rewards.passive;
        self.stats.clamp();
        (before - self.stats.money).max(0)
    }

    /// Take up to `amount` money, returning what was actually paid.
    pub fn pay(&mut self, amount: i64) -> i64 {
        let paid = amount.max(0).min(self.stats.money.max(0));
        self.stats.money -= paid;
        paid
    }

    /// First two letters of the name, upper-cased.
    #[must_use]
    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

fn initials(name: &str) -> String {
    name.trim().to_uppercase().chars().take(2).collect()
}

/// Time score granted for a given age.
#[must_use]
pub const fn time_score_for_age(age: u32) -> i32 {
    match age {
        0 => 0,
        1..=20 => 30,
        21..=40 => 25,
        41..=60 => 20,
        _ => 15,
    }
}

/// Reasons a player draft cannot be saved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("name must have at least {min} letters")]
    NameTooShort { min: usize },
    #[error("initials {initials} are already taken")]
    DuplicateInitials { initials: String },
    #[error("age {age} is outside {min}..={max}")]
    AgeOutOfRange { age: u32, min: u32, max: u32 },
    #[error("{field} goal {value} is below the minimum {min}")]
    GoalTooLow {
        field: &'static str,
        value: i32,
        min: i32,
    },
    #[error("money goal {value} exceeds the maximum {max}")]
    MoneyGoalTooHigh { value: i32, max: i32 },
    #[error("goals plus time score add up to {total}, expected {expected}")]
    TotalMismatch { total: i32, expected: i32 },
}

/// Player data as entered on the setup screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlayerDraft {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    pub age: u32,
    pub money_goal: i32,
    pub health_goal: i32,
    pub happiness_goal: i32,
}

impl PlayerDraft {
    #[must_use]
    pub fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            age,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_goals(mut self, money: i32, health: i32, happiness: i32) -> Self {
        self.money_goal = money;
        self.health_goal = health;
        self.happiness_goal = happiness;
        self
    }

    #[must_use]
    pub fn with_look(mut self, color: &str, icon: &str) -> Self {
        self.color = color.to_string();
        self.icon = icon.to_string();
        self
    }

    #[must_use]
    pub const fn targets(&self) -> Targets {
        Targets {
            time_score: time_score_for_age(self.age),
            money: self.money_goal,
            health: self.health_goal,
            happiness: self.happiness_goal,
        }
    }

    /// Check the draft against the players already saved.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft breaks.
    pub fn validate(&self, existing: &[Player]) -> Result<(), SetupError> {
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(SetupError::NameTooShort { min: MIN_NAME_LEN });
        }
        let mine = initials(&self.name);
        if existing.iter().any(|player| player.initials() == mine) {
            return Err(SetupError::DuplicateInitials { initials: mine });
        }
        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(SetupError::AgeOutOfRange {
                age: self.age,
                min: MIN_AGE,
                max: MAX_AGE,
            });
        }
        if self.health_goal < MIN_HEALTH_GOAL {
            return Err(SetupError::GoalTooLow {
                field: "health",
                value: self.health_goal,
                min: MIN_HEALTH_GOAL,
            });
        }
        if self.happiness_goal < MIN_HAPPINESS_GOAL {
            return Err(SetupError::GoalTooLow {
                field: "happiness",
                value: self.happiness_goal,
                min: MIN_HAPPINESS_GOAL,
            });
        }
        if self.money_goal < 0 {
            return Err(SetupError::GoalTooLow {
                field: "money",
                value: self.money_goal,
                min: 0,
            });
        }
        if self.money_goal > MAX_MONEY_GOAL {
            return Err(SetupError::MoneyGoalTooHigh {
                value: self.money_goal,
                max: MAX_MONEY_GOAL,
            });
        }
        let total = self.targets().total();
        if total != SUCCESS_TARGET {
            return Err(SetupError::TotalMismatch {
                total,
                expected: SUCCESS_TARGET,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_valid(&self, existing: &[Player]) -> bool {
        self.validate(existing).is_ok()
    }

    /// Spread the points left after the time score randomly across the goals,
    /// respecting the health/happiness floors and the money cap.
    #[must_use]
    pub fn auto_balance<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        let time_score = time_score_for_age(self.age);
        if time_score == 0 {
            return self;
        }
        let remaining = (SUCCESS_TARGET - time_score - MIN_HEALTH_GOAL - MIN_HAPPINESS_GOAL).max(0);
        let money = rng.gen_range(0..=remaining).min(MAX_MONEY_GOAL);
        let left = remaining - money;
        let health = rng.gen_range(0..=left);
        self.money_goal = money;
        self.health_goal = MIN_HEALTH_GOAL + health;
        self.happiness_goal = MIN_HAPPINESS_GOAL + (left - health);
        self
    }

    /// Materialize the draft as a fresh player in slot `id`.
    #[must_use]
    pub fn into_player(self, id: PlayerId) -> Player {
        let targets = self.targets();
        Player {
            id,
            name: self.name.trim().to_uppercase(),
            color: self.color,
            icon: self.icon,
            targets,
            stats: Stats::default(),
            route: RouteStatus::default(),
            laps: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn draft(name: &str) -> PlayerDraft {
        // age 30 -> 25 time points
        PlayerDraft::new(name, 30).with_goals(40, 20, 15)
    }

    #[test]
    fn time_score_brackets() {
        assert_eq!(time_score_for_age(0), 0);
        assert_eq!(time_score_for_age(12), 30);
        assert_eq!(time_score_for_age(21), 25);
        assert_eq!(time_score_for_age(41), 20);
        assert_eq!(time_score_for_age(60), 20);
        assert_eq!(time_score_for_age(61), 15);
    }

    #[test]
    fn valid_draft_passes() {
        assert_eq!(draft("Ana").validate(&[]), Ok(()));
    }

    #[test]
    fn duplicate_initials_rejected() {
        let existing = vec![draft("ana").into_player(0)];
        let err = draft("  anabel").validate(&existing).unwrap_err();
        assert_eq!(
            err,
            SetupError::DuplicateInitials {
                initials: "AN".to_string()
            }
        );
        assert!(draft("Bruno").is_valid(&existing));
    }

    #[test]
    fn goal_rules_enforced() {
        assert!(matches!(
            PlayerDraft::new("Ana", 30).with_goals(45, 9, 21).validate(&[]),
            Err(SetupError::GoalTooLow {
                field: "health",
                ..
            })
        ));
        assert!(matches!(
            PlayerDraft::new("Ana", 12).with_goals(81, 10, 10).validate(&[]),
            Err(SetupError::MoneyGoalTooHigh { .. })
        ));
        assert!(matches!(
            PlayerDraft::new("Ana", 30).with_goals(40, 20, 20).validate(&[]),
            Err(SetupError::TotalMismatch { total: 105, .. })
        ));
        assert!(matches!(
            PlayerDraft::new("Ana", 4).with_goals(40, 15, 15).validate(&[]),
            Err(SetupError::AgeOutOfRange { .. })
        ));
        assert!(matches!(
            PlayerDraft::new("A", 30).validate(&[]),
            Err(SetupError::NameTooShort { .. })
        ));
    }

    #[test]
    fn auto_balance_always_valid() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for age in [6_u32, 18, 25, 45, 70, 99] {
            for _ in 0..50 {
                let balanced = PlayerDraft::new("Zed", age).auto_balance(&mut rng);
                assert!(balanced.validate(&[]).is_ok(), "age {age}: {balanced:?}");
            }
        }
    }

    #[test]
    fn into_player_sets_starting_stats() {
        let player = draft("  ana ").into_player(3);
        assert_eq!(player.id, 3);
        assert_eq!(player.name, "ANA");
        assert_eq!(player.stats.money, STARTING_MONEY);
        assert_eq!(player.stats.passive, STARTING_PASSIVE);
        assert_eq!(player.stats.position, 0);
        assert_eq!(player.targets.total(), SUCCESS_TARGET);
        assert!(!player.route.in_route);
    }

    #[test]
    fn rewards_clamp_and_report_payment() {
        let mut player = draft("Ana").into_player(0);
        player.stats.money = 1_500;
        let paid = player.apply_rewards(&Rewards {
            money: -4_000,
            health: -3,
            ..Rewards::default()
        });
        assert_eq!(paid, 1_500);
        assert_eq!(player.stats.money, 0);
        assert_eq!(player.stats.health, 0);
    }

    #[test]
    fn pay_never_takes_from_a_negative_balance() {
        let mut player = draft("Ana").into_player(0);
        player.stats.money = -250;
        assert_eq!(player.pay(1_000), 0);
        assert_eq!(player.stats.money, -250);
        player.stats.money = 300;
        assert_eq!(player.pay(-50), 0);
        assert_eq!(player.pay(1_000), 300);
        assert_eq!(player.stats.money, 0);
    }

    #[test]
    fn graduate_records_route_once() {
        let mut status = RouteStatus::default();
        let route = RouteId::new("finance");
        status.enter(route.clone(), 1);
        assert_eq!(status.graduate(), Some(route.clone()));
        status.enter(route.clone(), 1);
        status.graduate();
        assert_eq!(status.visited, vec![route]);
        assert!(!status.in_route);
        assert_eq!(status.steps, 0);
    }
}
