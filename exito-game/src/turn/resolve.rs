//! Interaction resolution and the phase-advance driver.
use super::{Ignored, Step, check_win, landing, require};
use crate::board::{CareOutcome, GameRules};
use crate::constants::ROUTE_ENTRY_STEP;
use crate::data::{Card, Rewards};
use crate::rng::RandomSource;
use crate::state::{ActiveInteraction, CardSource, GameState, GameStatus, GiftChain, TurnPhase};
use crate::success;

/// Apply `rewards` to the current player and route paid money into the pot.
fn apply_to_current(state: &mut GameState, rewards: &Rewards) -> Result<bool, Ignored> {
    let pot_before = state.pot;
    let player = state
        .current_player_mut()
        .ok_or(Ignored("no current player"))?;
    let before = player.stats.clone();
    let paid = player.apply_rewards(rewards);
    let changed = before.differs_from(&player.stats);
    if rewards.pays_into_pot {
        state.pot += paid;
    }
    state.pot += rewards.pot_add;
    if rewards.pot_reset {
        state.pot = 0;
    }
    state.pot = state.pot.max(0);
    Ok(changed || state.pot != pot_before)
}

/// Close the interaction and wait in STAT_UPDATE, unless someone just won.
fn settle(state: &mut GameState, changed: bool) {
    state.active_interaction = None;
    if check_win(state) {
        return;
    }
    state.showing_stat_changes = changed;
    state.phase = TurnPhase::StatUpdate;
}

pub(super) fn decide_route(state: &mut GameState, enter: bool) -> Step {
    require(state.phase == TurnPhase::TileAction, "no tile action")?;
    let Some(ActiveInteraction::RouteDecision { route, cost }) = state.active_interaction.clone()
    else {
        return Err(Ignored("no route decision open"));
    };
    let mut changed = false;
    if enter {
        let player = state
            .current_player_mut()
            .ok_or(Ignored("no current player"))?;
        if player.stats.money >= cost {
            player.stats.money -= cost;
            player.route.enter(route.clone(), ROUTE_ENTRY_STEP);
            log::debug!("{} entered route {route} for {cost}", player.name);
            state.pot += cost;
            changed = cost > 0;
        } else {
            log::debug!(
                "{} cannot afford route {route}: {} < {cost}",
                player.name,
                player.stats.money
            );
        }
    }
    settle(state, changed);
    Ok(())
}

pub(super) fn resolve_card(state: &mut GameState, accepted: bool) -> Step {
    require(state.phase == TurnPhase::TileAction, "no tile action")?;
    let Some(ActiveInteraction::Card { card, .. }) = state.active_interaction.clone() else {
        return Err(Ignored("no card open"));
    };
    let changed = if accepted {
        apply_to_current(state, &card.rewards)?
    } else {
        false
    };
    settle(state, changed);
    Ok(())
}

pub(super) fn resolve_dice_event(state: &mut GameState, rewards: &Rewards) -> Step {
    require(state.phase == TurnPhase::TileAction, "no tile action")?;
    require(
        matches!(
            state.active_interaction,
            Some(ActiveInteraction::DiceEvent { .. })
        ),
        "no dice event open",
    )?;
    let outcome = Rewards {
        money: rewards.money,
        health: rewards.health,
        happiness: rewards.happiness,
        pays_into_pot: true,
        ..Rewards::default()
    };
    let changed = apply_to_current(state, &outcome)?;
    settle(state, changed);
    Ok(())
}

pub(super) fn resolve_hospital(state: &mut GameState, outcome: CareOutcome) -> Step {
    require(state.phase == TurnPhase::TileAction, "no tile action")?;
    require(
        matches!(
            state.active_interaction,
            Some(ActiveInteraction::HospitalOrVacation { .. })
        ),
        "no hospital or vacation open",
    )?;
    let care = Rewards {
        money: -outcome.cost.max(0),
        health: outcome.health.max(0),
        happiness: outcome.happiness.max(0),
        pays_into_pot: true,
        ..Rewards::default()
    };
    let changed = apply_to_current(state, &care)?;
    settle(state, changed);
    Ok(())
}

/// Take the current giver's gift (capped by what they own) and pass the
/// chain on; the last gift turns the total into a card for the receiver.
pub(super) fn resolve_gift(state: &mut GameState, gift: &Rewards) -> Step {
    require(state.phase == TurnPhase::TileAction, "no tile action")?;
    let Some(ActiveInteraction::GiftSelection(chain)) = state.active_interaction.clone() else {
        return Err(Ignored("no gift selection open"));
    };
    let giver = state
        .players
        .get_mut(chain.giver)
        .ok_or(Ignored("giver not in roster"))?;
    let given = Rewards {
        money: giver.pay(gift.money),
        health: gift.health.max(0).min(giver.stats.health.max(0)),
        happiness: gift.happiness.max(0).min(giver.stats.happiness.max(0)),
        ..Rewards::default()
    };
    giver.stats.health -= given.health;
    giver.stats.happiness -= given.happiness;
    log::debug!(
        "{} gives {} money, {} health, {} happiness",
        giver.name,
        given.money,
        given.health,
        given.happiness
    );
    let accumulated = chain.accumulated.combined(&given);

    let GiftChain {
        receiver,
        mut pending,
        ..
    } = chain;
    if pending.is_empty() {
        state.active_interaction = Some(ActiveInteraction::Card {
            card: gift_summary(accumulated),
            source: CardSource::Gifts,
        });
    } else {
        let next = pending.remove(0);
        state.active_interaction = Some(ActiveInteraction::GiftSelection(GiftChain {
            giver: next,
            receiver,
            pending,
            accumulated,
        }));
    }
    Ok(())
}

fn gift_summary(total: Rewards) -> Card {
    let mut parts = Vec::new();
    if total.money > 0 {
        parts.push(format!("${}", total.money));
    }
    if total.health > 0 {
        parts.push(format!("{} health", total.health));
    }
    if total.happiness > 0 {
        parts.push(format!("{} happiness", total.happiness));
    }
    let text = if parts.is_empty() {
        "Your friends gave you nothing this time.".to_string()
    } else {
        format!("You received {} from your friends!", parts.join(", "))
    };
    Card::new(text, "🎂", total)
}

/// The single "continue" driver.
pub(super) fn advance_turn_phase(
    state: &mut GameState,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
) -> Step {
    match state.phase {
        TurnPhase::TileInfo => {
            require(
                matches!(
                    state.active_interaction,
                    None | Some(ActiveInteraction::Info { .. })
                ),
                "interaction pending",
            )?;
            state.active_interaction = None;
            match state.current_tile {
                Some(tile) => landing::land(state, rules, rng, tile),
                None => {
                    state.phase = TurnPhase::TurnEnd;
                    Ok(())
                }
            }
        }
        TurnPhase::StatUpdate | TurnPhase::TurnEnd => {
            require(state.active_interaction.is_none(), "interaction pending")?;
            state.rotate_turn();
            Ok(())
        }
        TurnPhase::Idle | TurnPhase::Rolling | TurnPhase::Moving | TurnPhase::TileAction => {
            Err(Ignored("nothing to advance"))
        }
    }
}

/// Crown the current leader without waiting for anyone to reach the target.
pub(super) fn end_game_early(state: &mut GameState) -> Step {
    let index = success::leader(&state.players).ok_or(Ignored("no players"))?;
    let winner = state
        .players
        .get(index)
        .cloned()
        .ok_or(Ignored("no players"))?;
    log::info!(
        "game ended early; {} leads with {} success points",
        winner.name,
        success::success(&winner)
    );
    state.status = GameStatus::Celebrating;
    state.winner = Some(winner);
    state.active_interaction = None;
    state.show_turn_overlay = false;
    Ok(())
}
