//! The reducer: one entry point folding actions into the next game state.
//!
//! Handlers work on a private copy of the state and report `Ignored` for
//! out-of-phase input, in which case the caller gets the untouched original.
mod landing;
mod movement;
mod resolve;

use crate::action::Action;
use crate::board::GameRules;
use crate::constants::{MAX_PLAYERS, MIN_PLAYERS};
use crate::player::PlayerDraft;
use crate::rng::RandomSource;
use crate::state::{GameState, GameStatus, RoomBinding};
use crate::success;
use crate::sync;

/// Reason an action was dropped without effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ignored(pub &'static str);

pub(crate) type Step = Result<(), Ignored>;

pub(crate) const fn require(condition: bool, reason: &'static str) -> Step {
    if condition { Ok(()) } else { Err(Ignored(reason)) }
}

/// Compute the state that follows `action`.
///
/// Dice and card draws come from `rng`; the input state is never modified and
/// actions that are illegal in the current phase return an identical copy.
#[must_use]
pub fn reduce(
    state: &GameState,
    action: Action,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> GameState {
    try_reduce(state, action, rules, rng).unwrap_or_else(|_| state.clone())
}

/// Like [`reduce`], but reports a dropped action instead of echoing the input.
pub(crate) fn try_reduce(
    state: &GameState,
    action: Action,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> Result<GameState, Ignored> {
    let name = action.name();
    let mut next = state.clone();
    apply(&mut next, action, rules, rng).map(|()| next).inspect_err(|Ignored(reason)| {
        log::debug!(
            "ignored {name} (status {:?}, phase {:?}): {reason}",
            state.status,
            state.phase
        );
    })
}

fn apply(
    state: &mut GameState,
    action: Action,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> Step {
    if action.is_turn_action() {
        require(state.is_playing(), "no game in progress")?;
        require(state.current_player().is_some(), "no current player")?;
    }
    match action {
        Action::Reset => {
            *state = GameState::default();
            Ok(())
        }
        Action::ShowStartScreen => {
            state.status = GameStatus::Start;
            Ok(())
        }
        Action::ShowLobby => {
            state.status = GameStatus::Lobby;
            Ok(())
        }
        Action::BeginSetup(count) => begin_setup(state, count),
        Action::SavePlayer(draft) => save_player(state, draft),
        Action::StartTurn => movement::start_turn(state),
        Action::RollDice => movement::roll_dice(state),
        Action::RollFinished { d1, d2 } => movement::roll_finished(state, d1, d2),
        Action::UpdatePosition(index) => movement::update_position(state, rules, index),
        Action::UpdateRouteStep(step) => movement::update_route_step(state, rules, step),
        Action::FinishMove => movement::finish_move(state, rules, rng),
        Action::FinishRouteMove => movement::finish_route_move(state, rules, rng),
        Action::EndAnimation => movement::end_animation(state),
        Action::DecideRoute(enter) => resolve::decide_route(state, enter),
        Action::ResolveCard(accepted) => resolve::resolve_card(state, accepted),
        Action::ResolveDiceEvent(rewards) => resolve::resolve_dice_event(state, &rewards),
        Action::ResolveHospital(outcome) => resolve::resolve_hospital(state, outcome),
        Action::ResolveGift(gift) => resolve::resolve_gift(state, &gift),
        Action::AdvanceTurnPhase => resolve::advance_turn_phase(state, rules, rng),
        Action::HidePassiveIncomeBanner => {
            require(state.passive_income_banner.is_some(), "no banner shown")?;
            state.passive_income_banner = None;
            Ok(())
        }
        Action::EndGameEarly => resolve::end_game_early(state),
        Action::FinishWinAnimation => {
            require(
                state.status == GameStatus::Celebrating,
                "nothing is being celebrated",
            )?;
            state.status = GameStatus::Win;
            Ok(())
        }
        Action::SetRoom { id, is_host } => {
            let id = id.trim().to_string();
            require(!id.is_empty(), "empty room id")?;
            state.room = Some(RoomBinding { id, is_host });
            state.status = GameStatus::Setup;
            Ok(())
        }
        Action::SyncRemoteState(snapshot) => match sync::merge_remote(state, snapshot) {
            Ok(merged) => {
                *state = merged;
                Ok(())
            }
            Err(err) => {
                log::warn!("dropping remote snapshot: {err}");
                Err(Ignored("malformed remote snapshot"))
            }
        },
        Action::LoadSavedGame(saved) => {
            *state = *saved;
            state.clear_transient();
            state.clamp_stats();
            Ok(())
        }
    }
}

fn begin_setup(state: &mut GameState, count: usize) -> Step {
    require(
        (MIN_PLAYERS..=MAX_PLAYERS).contains(&count),
        "player count out of range",
    )?;
    *state = GameState {
        status: GameStatus::Setup,
        total_players: count,
        room: state.room.take(),
        ..GameState::default()
    };
    Ok(())
}

fn save_player(state: &mut GameState, draft: PlayerDraft) -> Step {
    require(state.status == GameStatus::Setup, "not in setup")?;
    require(
        state.total_players > 0 && state.players.len() < state.total_players,
        "roster already complete",
    )?;
    if let Err(err) = draft.validate(&state.players) {
        log::debug!("rejected player draft: {err}");
        return Err(Ignored("invalid player draft"));
    }
    let id = state.players.len();
    let player = draft.into_player(id);
    log::debug!("saved player {} in slot {id}", player.name);
    state.players.push(player);
    if state.is_online() {
        state.local_player_id = Some(id);
    }
    if state.players.len() >= state.total_players {
        state.status = GameStatus::Playing;
        state.setup_index = 0;
        state.current_player = 0;
        state.phase = crate::state::TurnPhase::Idle;
        state.show_turn_overlay = true;
    } else {
        state.setup_index = state.players.len();
    }
    Ok(())
}

/// Move to the celebration if anyone crossed the success target.
///
/// Only the first crossing counts; later checks are no-ops once the game left
/// the playing status.
pub(crate) fn check_win(state: &mut GameState) -> bool {
    if !state.is_playing() {
        return false;
    }
    let Some(index) = success::first_to_cross(&state.players, state.current_player) else {
        return false;
    };
    let Some(winner) = state.players.get(index).cloned() else {
        return false;
    };
    log::info!(
        "{} reached {} success points and wins",
        winner.name,
        success::success(&winner)
    );
    state.status = GameStatus::Celebrating;
    state.winner = Some(winner);
    state.active_interaction = None;
    state.show_turn_overlay = false;
    true
}
