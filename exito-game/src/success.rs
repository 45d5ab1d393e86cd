//! Success score and win evaluation.
use crate::constants::{MONEY_PER_POINT, SUCCESS_TARGET};
use crate::player::Player;

/// Progress towards the player's personal goals, capped per axis.
#[must_use]
pub fn success(player: &Player) -> i32 {
    let targets = &player.targets;
    let stats = &player.stats;
    let money_points = i32::try_from(stats.money.max(0) / MONEY_PER_POINT).unwrap_or(i32::MAX);
    targets.time_score
        + money_points.min(targets.money)
        + stats.health.min(targets.health)
        + stats.happiness.min(targets.happiness)
}

#[must_use]
pub fn has_won(player: &Player) -> bool {
    success(player) >= SUCCESS_TARGET
}

/// Index of the first player at or above the target, checking `first` before
/// the rest in seat order.
#[must_use]
pub fn first_to_cross(players: &[Player], first: usize) -> Option<usize> {
    if players.get(first).is_some_and(has_won) {
        return Some(first);
    }
    players
        .iter()
        .enumerate()
        .find(|(index, player)| *index != first && has_won(player))
        .map(|(index, _)| index)
}

/// Highest-scoring player; ties go to the earliest seat.
#[must_use]
pub fn leader(players: &[Player]) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (index, player) in players.iter().enumerate() {
        let score = success(player);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}
