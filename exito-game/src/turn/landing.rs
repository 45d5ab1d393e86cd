//! Tile resolution table: what landing on a tile opens next.
use smallvec::SmallVec;

use super::{Ignored, Step};
use crate::board::{BonusKind, CardCategory, CornerKind, GameRules, TileKind};
use crate::constants::{
    LUCKY_DAY_HAPPINESS, LUCKY_DAY_HEALTH, POEM_HAPPINESS, RELAX_HEALTH, SOLO_BIRTHDAY_BONUS,
};
use crate::data::{Card, DeckId, Rewards};
use crate::rng::RandomSource;
use crate::state::{ActiveInteraction, AnimationCue, CardSource, GameState, GiftChain, TurnPhase};

/// Open whatever the tile at `index` produces for the current player.
pub(super) fn land(
    state: &mut GameState,
    rules: &GameRules,
    rng: &mut dyn RandomSource,
    index: usize,
) -> Step {
    let tile = rules
        .board
        .tile(index)
        .ok_or(Ignored("landed outside the board"))?;
    state.current_tile = Some(index);
    state.phase = TurnPhase::TileAction;
    state.active_interaction = None;

    let opened = match &tile.kind {
        TileKind::Corner {
            corner: CornerKind::Start,
        } => {
            state.phase = TurnPhase::TurnEnd;
            None
        }
        TileKind::Corner {
            corner: corner @ (CornerKind::Hospital | CornerKind::Vacation),
        } => Some(ActiveInteraction::HospitalOrVacation {
            tile: index,
            corner: *corner,
        }),
        TileKind::Corner {
            corner: CornerKind::Jackpot,
        } => Some(card(
            Card::new(
                format!("You won the pot! You receive ${}.", state.pot),
                "🍀",
                Rewards {
                    money: state.pot,
                    pot_reset: true,
                    ..Rewards::default()
                },
            ),
            CardSource::Jackpot,
        )),
        TileKind::RouteEntrance { route } => {
            let visited = state
                .current_player()
                .is_some_and(|player| player.route.has_visited(route));
            let cost = if visited {
                0
            } else {
                rules.board.route_fee(route)
            };
            Some(ActiveInteraction::RouteDecision {
                route: route.clone(),
                cost,
            })
        }
        TileKind::Card { category } => {
            let (deck, source, cue) = match category {
                CardCategory::Challenge => (
                    DeckId::Challenge,
                    CardSource::Challenge,
                    AnimationCue::Challenge,
                ),
                CardCategory::Expertise => (
                    DeckId::Expertise,
                    CardSource::Expertise,
                    AnimationCue::Expertise,
                ),
            };
            if let Some(drawn) = rng.draw_card(&rules.decks, &deck) {
                state.animation = Some(cue);
                Some(card(drawn, source))
            } else {
                log::warn!("{deck} deck is empty; ending turn");
                state.phase = TurnPhase::TurnEnd;
                None
            }
        }
        TileKind::DiceEvent { event } => Some(ActiveInteraction::DiceEvent {
            tile: index,
            event: *event,
        }),
        TileKind::Fine {
            amount,
            global: false,
        } => Some(card(
            Card::new(format!("You pay a ${amount} fine."), "💸", Rewards::fine(*amount)),
            CardSource::Fine,
        )),
        TileKind::Fine {
            amount,
            global: true,
        } => {
            collect_global_fine(state, *amount);
            None
        }
        TileKind::Bonus {
            bonus: BonusKind::YouWin,
            amount,
        } => Some(card(
            Card::new(
                format!("Congratulations! Your passive income grows by ${amount} for good."),
                "🏆",
                Rewards::passive(*amount),
            ),
            CardSource::YouWin,
        )),
        TileKind::Bonus {
            bonus: BonusKind::Birthday,
            ..
        } => Some(birthday(state)),
        TileKind::Bonus {
            bonus: BonusKind::Poem,
            ..
        } => Some(card(
            Card::new(
                "Recite a poem with passion. The others vote on whether you made it.",
                "📜",
                Rewards::happiness(POEM_HAPPINESS),
            )
            .judged(),
            CardSource::Poem,
        )),
        TileKind::Bonus {
            bonus: BonusKind::LuckyDay,
            ..
        } => Some(card(
            Card::new(
                "Lucky day! The player on your right gives you a smile and a hug.",
                "😊",
                Rewards {
                    health: LUCKY_DAY_HEALTH,
                    happiness: LUCKY_DAY_HAPPINESS,
                    ..Rewards::default()
                },
            ),
            CardSource::LuckyDay,
        )),
        TileKind::Relax => Some(card(
            Card::new(
                "A moment of peace. Breathe deeply and enjoy the road.",
                "😌",
                Rewards::health(RELAX_HEALTH),
            ),
            CardSource::Relax,
        )),
    };
    state.active_interaction = opened;
    Ok(())
}

fn card(card: Card, source: CardSource) -> ActiveInteraction {
    ActiveInteraction::Card { card, source }
}

/// Every other player pays up to `amount` into the pot right away.
fn collect_global_fine(state: &mut GameState, amount: i64) {
    let lander = state.current_player;
    let mut collected = 0;
    for (index, player) in state.players.iter_mut().enumerate() {
        if index != lander {
            collected += player.pay(amount);
        }
    }
    state.pot += collected;
    state.showing_stat_changes = collected > 0;
    state.phase = TurnPhase::StatUpdate;
    log::debug!("global fine collected {collected} into the pot");
}

/// Gift chain over the other players in turn order after the receiver, or a
/// bank bonus when playing alone.
fn birthday(state: &GameState) -> ActiveInteraction {
    let receiver = state.current_player;
    let count = state.players.len();
    let mut givers: SmallVec<[usize; 4]> = (1..count)
        .map(|offset| (receiver + offset) % count)
        .collect();
    if givers.is_empty() {
        return card(
            Card::new(
                format!("Happy birthday! The bank gives you ${SOLO_BIRTHDAY_BONUS}."),
                "🎂",
                Rewards::money(SOLO_BIRTHDAY_BONUS),
            ),
            CardSource::Birthday,
        );
    }
    let giver = givers.remove(0);
    ActiveInteraction::GiftSelection(GiftChain {
        giver,
        receiver,
        pending: givers,
        accumulated: Rewards::default(),
    })
}
