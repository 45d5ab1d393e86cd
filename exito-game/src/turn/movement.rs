//! Dice, step-by-step movement, laps and route excursions.
use super::{Ignored, Step, check_win, landing, require};
use crate::board::GameRules;
use crate::constants::{DIE_FACES, LAP_HEALTH_BASE, LAP_PASSIVE_INCREMENT};
use crate::data::DeckId;
use crate::rng::RandomSource;
use crate::state::{
    ActiveInteraction, AnimationCue, CardSource, GameState, MoveDetails, PassiveIncomeBanner,
    RouteMoveDetails, TurnPhase,
};

pub(super) fn start_turn(state: &mut GameState) -> Step {
    require(
        matches!(state.phase, TurnPhase::Idle | TurnPhase::TurnEnd),
        "turn already under way",
    )?;
    require(state.active_interaction.is_none(), "interaction pending")?;
    state.show_turn_overlay = false;
    state.phase = TurnPhase::Idle;
    Ok(())
}

pub(super) fn roll_dice(state: &mut GameState) -> Step {
    require(state.phase == TurnPhase::Idle, "not idle")?;
    require(!state.show_turn_overlay, "turn not started")?;
    require(state.active_interaction.is_none(), "interaction pending")?;
    state.is_rolling = true;
    state.dice = [0, 0];
    state.phase = TurnPhase::Rolling;
    Ok(())
}

pub(super) fn roll_finished(state: &mut GameState, d1: u8, d2: u8) -> Step {
    require(state.phase == TurnPhase::Rolling, "dice are not rolling")?;
    let (d1, d2) = (d1.min(DIE_FACES), d2.min(DIE_FACES));
    let player = state.current_player().ok_or(Ignored("no current player"))?;
    let in_route = player.route.in_route;
    let route_step = player.route.steps;
    let position = player.stats.position;

    state.is_rolling = false;
    state.dice = [d1, d2];
    state.phase = TurnPhase::Moving;

    let steps = if in_route {
        u32::from(d1)
    } else {
        u32::from(d1) + u32::from(d2)
    };
    if steps == 0 {
        log::debug!("zero roll ends the turn");
        state.rotate_turn();
        return Ok(());
    }
    if in_route {
        state.route_move_details = Some(RouteMoveDetails {
            start_step: route_step,
            steps,
        });
    } else {
        state.move_details = Some(MoveDetails {
            start_pos: position,
            steps,
        });
    }
    Ok(())
}

pub(super) fn update_position(state: &mut GameState, rules: &GameRules, index: usize) -> Step {
    require(state.phase == TurnPhase::Moving, "not moving")?;
    require(state.is_moving(), "no move in progress")?;
    require(index < rules.board.len(), "position off the board")?;
    let player = state
        .current_player_mut()
        .ok_or(Ignored("no current player"))?;
    player.stats.position = index;
    Ok(())
}

pub(super) fn update_route_step(state: &mut GameState, rules: &GameRules, step: u32) -> Step {
    require(state.phase == TurnPhase::Moving, "not moving")?;
    require(state.is_moving_in_route(), "no route move in progress")?;
    require(step <= rules.board.route_length, "step past the route end")?;
    let player = state
        .current_player_mut()
        .ok_or(Ignored("no current player"))?;
    require(player.route.in_route, "player is not on a route")?;
    player.route.steps = step;
    Ok(())
}

/// Settle a main-board move, pay out completed laps and resolve the tile.
pub(super) fn finish_move(
    state: &mut GameState,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> Step {
    require(state.phase == TurnPhase::Moving, "not moving")?;
    let details = state.move_details.ok_or(Ignored("no move in progress"))?;
    require(!rules.board.is_empty(), "empty board")?;
    let board_len = rules.board.len();
    let travelled = details.start_pos + details.steps as usize;
    let end = rules.board.advance(details.start_pos, details.steps);
    let laps = travelled / board_len;

    let player = state
        .current_player_mut()
        .ok_or(Ignored("no current player"))?;
    player.stats.position = end;
    let mut banner = None;
    for _ in 0..laps {
        player.laps += 1;
        let health_gain = LAP_HEALTH_BASE + i32::try_from(player.laps).unwrap_or(i32::MAX);
        let received = player.stats.passive;
        player.stats.money += received;
        player.stats.passive += LAP_PASSIVE_INCREMENT;
        player.stats.health += health_gain;
        player.stats.clamp();
        log::debug!(
            "{} completed lap {}: +{received} money, +{health_gain} health",
            player.name,
            player.laps
        );
        banner = Some(PassiveIncomeBanner {
            amount: received,
            health_gain,
            player_name: player.name.clone(),
            lap: player.laps,
        });
    }
    state.move_details = None;
    if banner.is_some() {
        state.passive_income_banner = banner;
    }
    if check_win(state) {
        return Ok(());
    }
    landing::land(state, rules, rng, end)
}

/// Settle a route move: graduate at the end of the route, otherwise draw a
/// card from the route deck.
pub(super) fn finish_route_move(
    state: &mut GameState,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> Step {
    require(state.phase == TurnPhase::Moving, "not moving")?;
    let details = state
        .route_move_details
        .ok_or(Ignored("no route move in progress"))?;
    let route_length = rules.board.route_length;
    let target = details.start_step + details.steps;
    state.route_move_details = None;
    let player = state
        .current_player_mut()
        .ok_or(Ignored("no current player"))?;
    let route = player
        .route
        .route
        .clone()
        .ok_or(Ignored("player is not on a route"))?;

    if target >= route_length {
        let bonus = rules.board.route_bonus(&route);
        let overflow = target - route_length;
        player.stats.passive += bonus;
        player.route.graduate();
        log::debug!(
            "{} graduated from {route} with +{bonus} passive, {overflow} steps left",
            player.name
        );
        let messages = &rules.board.graduation_messages;
        let message = if messages.is_empty() {
            String::new()
        } else {
            let pick = rng.draw_index(&DeckId::Graduation, messages.len());
            messages.get(pick).cloned().unwrap_or_default()
        };
        state.animation = Some(AnimationCue::Graduation { bonus, message });
        state.overflow_steps = overflow;
        state.active_interaction = None;
        check_win(state);
        return Ok(());
    }

    player.route.steps = target;
    let deck = DeckId::Route(route.clone());
    if let Some(card) = rng.draw_card(&rules.decks, &deck) {
        state.active_interaction = Some(ActiveInteraction::Card {
            card,
            source: CardSource::Route(route),
        });
        state.phase = TurnPhase::TileAction;
    } else {
        log::warn!("{deck} deck is empty; skipping the route card");
        state.active_interaction = None;
        state.phase = TurnPhase::StatUpdate;
    }
    Ok(())
}

/// Clear the current animation cue; after a graduation this resumes any
/// leftover steps on the main board or ends the turn.
pub(super) fn end_animation(state: &mut GameState) -> Step {
    let cue = state.animation.take().ok_or(Ignored("no animation"))?;
    if !matches!(cue, AnimationCue::Graduation { .. }) || !state.is_playing() {
        return Ok(());
    }
    let position = state
        .current_player()
        .map_or(0, |player| player.stats.position);
    if state.overflow_steps > 0 {
        state.move_details = Some(MoveDetails {
            start_pos: position,
            steps: state.overflow_steps,
        });
        state.overflow_steps = 0;
        state.phase = TurnPhase::Moving;
    } else {
        state.phase = TurnPhase::TurnEnd;
    }
    Ok(())
}
