use anyhow::{Result, ensure};
use exito_game::constants::{MAX_AGE, MIN_AGE, SUCCESS_TARGET};
use exito_game::{
    Action, ActiveInteraction, GameRules, GameSession, GameState, GameStatus, NoStorage, Offline,
    PlayerDraft, RandomSource, Rewards, SeededRandom, TurnPhase, has_won, success,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use crate::logic::policy::{BotPolicy, Strategy};

const NAMES: [&str; 4] = ["Ana", "Bruno", "Carla", "Diego"];
const COLORS: [&str; 4] = ["#e63946", "#457b9d", "#2a9d8f", "#f4a261"];
const ICONS: [&str; 4] = ["🦊", "🐢", "🦉", "🐙"];

/// Configuration for one simulated game.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub players: usize,
    pub strategy: Strategy,
    pub max_actions: usize,
}

impl SimulationConfig {
    #[must_use]
    pub const fn new(strategy: Strategy, seed: u64) -> Self {
        Self {
            seed,
            players: 2,
            strategy,
            max_actions: 20_000,
        }
    }

    #[must_use]
    pub const fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    #[must_use]
    pub const fn with_max_actions(mut self, max_actions: usize) -> Self {
        self.max_actions = max_actions;
        self
    }
}

/// Outcome of one simulated game.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub seed: u64,
    pub strategy: String,
    pub players: usize,
    pub winner: Option<String>,
    pub winner_success: Option<i32>,
    /// The winner crossed the target rather than being crowned at the cap.
    pub natural_win: bool,
    pub turns: u32,
    pub actions: usize,
    pub laps: u32,
    pub routes_completed: usize,
    pub pot_peak: i64,
    pub dice_draws: u64,
    pub deck_draws: u64,
    pub violations: Vec<String>,
}

impl RunRecord {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Per-strategy aggregate over many runs.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub strategy: String,
    pub runs: usize,
    pub natural_wins: usize,
    pub natural_win_rate: f64,
    pub average_turns: f64,
    pub average_laps: f64,
    pub failed_runs: usize,
}

fn draft_for(slot: usize, rng: &mut ChaCha20Rng) -> PlayerDraft {
    let name = NAMES.get(slot).copied().unwrap_or("Player");
    let age = rng.gen_range(MIN_AGE.max(8)..=MAX_AGE.min(80));
    PlayerDraft::new(name, age)
        .with_look(
            COLORS.get(slot).copied().unwrap_or_default(),
            ICONS.get(slot).copied().unwrap_or_default(),
        )
        .auto_balance(rng)
}

/// The action a presentation layer would dispatch next, or `None` once the
/// game is over.
pub fn next_action(
    state: &GameState,
    rules: &GameRules,
    policy: &mut dyn BotPolicy,
    dice: &mut dyn RandomSource,
) -> Option<Action> {
    match state.status {
        GameStatus::Celebrating => return Some(Action::FinishWinAnimation),
        GameStatus::Playing => {}
        _ => return None,
    }
    if state.passive_income_banner.is_some() {
        return Some(Action::HidePassiveIncomeBanner);
    }
    if state.animation.is_some() {
        return Some(Action::EndAnimation);
    }
    let action = match state.phase {
        TurnPhase::Idle if state.show_turn_overlay => Action::StartTurn,
        TurnPhase::Idle => Action::RollDice,
        TurnPhase::Rolling => Action::RollFinished {
            d1: dice.roll_die(),
            d2: dice.roll_die(),
        },
        TurnPhase::Moving => tick_movement(state, rules)?,
        TurnPhase::TileAction => resolve_interaction(state, policy, dice),
        TurnPhase::TileInfo | TurnPhase::StatUpdate | TurnPhase::TurnEnd => {
            Action::AdvanceTurnPhase
        }
    };
    Some(action)
}

fn tick_movement(state: &GameState, rules: &GameRules) -> Option<Action> {
    let player = state.current_player()?;
    if let Some(details) = state.route_move_details {
        let target = (details.start_step + details.steps).min(rules.board.route_length);
        return Some(if player.route.steps < target {
            Action::UpdateRouteStep(player.route.steps + 1)
        } else {
            Action::FinishRouteMove
        });
    }
    let details = state.move_details?;
    let target = rules.board.advance(details.start_pos, details.steps);
    Some(if player.stats.position == target {
        Action::FinishMove
    } else {
        Action::UpdatePosition((player.stats.position + 1) % rules.board.len())
    })
}

fn resolve_interaction(
    state: &GameState,
    policy: &mut dyn BotPolicy,
    dice: &mut dyn RandomSource,
) -> Action {
    match &state.active_interaction {
        Some(ActiveInteraction::RouteDecision { route, cost }) => {
            Action::DecideRoute(policy.enter_route(state, route, *cost))
        }
        Some(ActiveInteraction::Card { card, .. }) => {
            Action::ResolveCard(!card.requires_judgment || policy.judge_card(state, card))
        }
        Some(ActiveInteraction::DiceEvent { event, .. }) => {
            Action::ResolveDiceEvent(event.rewards(dice.roll_die()))
        }
        Some(ActiveInteraction::HospitalOrVacation { corner, .. }) => {
            Action::ResolveHospital(corner.care_outcome(dice.roll_die()).unwrap_or_default())
        }
        Some(ActiveInteraction::GiftSelection(chain)) => {
            let gift = match (
                state.players.get(chain.giver),
                state.players.get(chain.receiver),
            ) {
                (Some(giver), Some(receiver)) => policy.gift(giver, receiver),
                _ => Rewards::default(),
            };
            Action::ResolveGift(gift)
        }
        Some(ActiveInteraction::Info { .. }) | None => Action::AdvanceTurnPhase,
    }
}

/// Invariants every reachable state must hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<String> {
    let mut violations = Vec::new();
    if state.pot < 0 {
        violations.push(format!("pot is negative: {}", state.pot));
    }
    if !state.players.is_empty() && state.current_player >= state.players.len() {
        violations.push(format!("current player {} out of range", state.current_player));
    }
    for player in &state.players {
        let stats = &player.stats;
        if stats.money < 0 || stats.health < 0 || stats.happiness < 0 || stats.passive < 0 {
            violations.push(format!("{} has negative stats: {stats:?}", player.name));
        }
        let total = player.targets.total();
        if total != SUCCESS_TARGET {
            violations.push(format!("{} targets sum to {total}", player.name));
        }
    }
    violations
}

/// Play one game to completion with the given strategy for every seat.
///
/// # Errors
///
/// Returns an error if setup does not produce a playable game.
pub fn run_game(rules: &GameRules, config: &SimulationConfig) -> Result<RunRecord> {
    let mut setup_rng = ChaCha20Rng::seed_from_u64(config.seed);
    let mut policy = config.strategy.create_policy(config.seed);
    log::debug!(
        "seed {}: {} players with the {} policy",
        config.seed,
        config.players,
        policy.name()
    );
    let mut session = GameSession::new(
        rules,
        SeededRandom::from_user_seed(config.seed),
        NoStorage,
        Offline,
    );

    session.dispatch(Action::ShowStartScreen)?;
    session.dispatch(Action::BeginSetup(config.players))?;
    for slot in 0..config.players {
        session.dispatch(Action::SavePlayer(draft_for(slot, &mut setup_rng)))?;
    }
    ensure!(
        session.state().is_playing(),
        "setup of {} players did not start the game",
        config.players
    );

    let mut violations = Vec::new();
    let mut actions = 0;
    let mut turns = 0;
    let mut pot_peak = 0;
    let mut natural_win = false;
    while actions < config.max_actions {
        let before = session.state().clone();
        let Some(action) = next_action(&before, rules, policy.as_mut(), session.rng_mut()) else {
            break;
        };
        let label = action.name();
        let after = session.dispatch(action)?;
        actions += 1;
        if *after == before {
            violations.push(format!("{label} had no effect at action {actions}"));
            break;
        }
        if label == "roll_dice" {
            turns += 1;
        }
        if after.status == GameStatus::Celebrating && before.status == GameStatus::Playing {
            natural_win = true;
        }
        pot_peak = pot_peak.max(after.pot);
        let found = check_invariants(after);
        if !found.is_empty() {
            violations.extend(found);
            break;
        }
    }

    if session.state().is_playing() {
        log::debug!("seed {} hit the action cap; ending early", config.seed);
        session.dispatch(Action::EndGameEarly)?;
        session.dispatch(Action::FinishWinAnimation)?;
    }

    let dice_draws = session.rng_mut().dice_draws();
    let deck_draws = session.rng_mut().deck_draws();
    let state = session.into_state();
    if state.status != GameStatus::Win {
        violations.push(format!("game ended in {:?}", state.status));
    }
    let winner = state.winner.as_ref();
    match winner {
        None => violations.push("no winner".to_string()),
        Some(winner) if natural_win && !has_won(winner) => {
            violations.push(format!("{} won below the target", winner.name));
        }
        Some(_) => {}
    }

    Ok(RunRecord {
        seed: config.seed,
        strategy: config.strategy.to_string(),
        players: config.players,
        winner: winner.map(|player| player.name.clone()),
        winner_success: winner.map(success),
        natural_win,
        turns,
        actions,
        laps: state.players.iter().map(|player| player.laps).sum(),
        routes_completed: state
            .players
            .iter()
            .map(|player| player.route.visited.len())
            .sum(),
        pot_peak,
        dice_draws,
        deck_draws,
        violations,
    })
}

/// Aggregate runs by strategy, in first-seen order.
#[must_use]
pub fn summarize(records: &[RunRecord]) -> Vec<StrategySummary> {
    let mut order: Vec<&str> = Vec::new();
    for record in records {
        if !order.contains(&record.strategy.as_str()) {
            order.push(&record.strategy);
        }
    }
    order
        .into_iter()
        .map(|strategy| {
            let runs: Vec<&RunRecord> = records
                .iter()
                .filter(|record| record.strategy == strategy)
                .collect();
            #[allow(clippy::cast_precision_loss)]
            let count = runs.len() as f64;
            let natural_wins = runs.iter().filter(|record| record.natural_win).count();
            #[allow(clippy::cast_precision_loss)]
            let rate = |value: usize| value as f64 / count;
            StrategySummary {
                strategy: strategy.to_string(),
                runs: runs.len(),
                natural_wins,
                natural_win_rate: rate(natural_wins),
                average_turns: rate(runs.iter().map(|record| record.turns as usize).sum()),
                average_laps: rate(runs.iter().map(|record| record.laps as usize).sum()),
                failed_runs: runs.iter().filter(|record| !record.passed()).count(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_runs_are_reproducible() {
        let rules = GameRules::standard();
        let config = SimulationConfig::new(Strategy::Random, 4242).with_players(3);
        let a = run_game(rules, &config).unwrap();
        let b = run_game(rules, &config).unwrap();
        assert_eq!(a.winner, b.winner);
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.turns, b.turns);
        assert_eq!(a.dice_draws, b.dice_draws);
    }

    #[test]
    fn every_strategy_finishes_cleanly() {
        let rules = GameRules::standard();
        for strategy in Strategy::ALL {
            let record = run_game(rules, &SimulationConfig::new(strategy, 1337)).unwrap();
            assert!(record.passed(), "{strategy}: {:?}", record.violations);
            assert!(record.winner.is_some());
            assert!(record.turns > 0);
        }
    }

    #[test]
    fn action_cap_crowns_the_leader() {
        let rules = GameRules::standard();
        let config = SimulationConfig::new(Strategy::Bold, 9).with_max_actions(40);
        let record = run_game(rules, &config).unwrap();
        assert!(!record.natural_win);
        assert_eq!(record.actions, 40);
        assert!(record.winner.is_some());
        assert!(record.passed());
    }

    #[test]
    fn invariants_flag_broken_states() {
        let mut player = PlayerDraft::new("Ana", 30)
            .with_goals(40, 20, 15)
            .into_player(0);
        player.stats.health = -1;
        player.targets.money = 10;
        let mut state = GameState::playing(vec![player]);
        state.pot = -5;
        assert_eq!(check_invariants(&state).len(), 3);
    }

    #[test]
    fn summaries_group_by_strategy() {
        let rules = GameRules::standard();
        let records: Vec<RunRecord> = [Strategy::Bold, Strategy::Cautious, Strategy::Bold]
            .into_iter()
            .map(|strategy| run_game(rules, &SimulationConfig::new(strategy, 5)).unwrap())
            .collect();
        let summary = summarize(&records);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].strategy, "bold");
        assert_eq!(summary[0].runs, 2);
        assert_eq!(summary[1].runs, 1);
    }
}
