use std::collections::BTreeSet;

use exito_game::{
    Action, ActiveInteraction, Board, Card, CardSource, CornerKind, DeckId, Decks, GameRules,
    GameState, PlayerDraft, Rewards, RouteId, TileKind, TurnPhase, state_signature,
};
use serde_json::{Value, json};

fn standard_board() -> Board {
    Board::from_json(include_str!("../assets/data/board.json")).unwrap()
}

#[test]
fn bundled_board_is_a_closed_loop_starting_at_start() {
    let board = standard_board();
    assert_eq!(board.len(), 39);
    assert!(matches!(
        board.tile(0).map(|tile| &tile.kind),
        Some(TileKind::Corner {
            corner: CornerKind::Start
        })
    ));
    let starts = board
        .tiles
        .iter()
        .filter(|tile| {
            matches!(
                tile.kind,
                TileKind::Corner {
                    corner: CornerKind::Start
                }
            )
        })
        .count();
    assert_eq!(starts, 1);
    assert_eq!(board.advance(38, 1), 0);
    assert_eq!(board.advance(30, 12), 3);
    assert_eq!(&board, &GameRules::standard().board);
}

#[test]
fn every_route_entrance_has_config_and_cards() {
    let board = standard_board();
    let decks = Decks::from_json(include_str!("../assets/data/decks.json")).unwrap();
    let entrances: BTreeSet<RouteId> = board
        .tiles
        .iter()
        .filter_map(|tile| match &tile.kind {
            TileKind::RouteEntrance { route } => Some(route.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(entrances.len(), 4);
    for route in &entrances {
        let config = board.route(route).unwrap_or_else(|| panic!("no config for {route}"));
        assert!(config.fee > 0);
        assert_eq!(config.completion_bonus(), config.fee);
        assert!(
            !decks.cards(&DeckId::Route(route.clone())).is_empty(),
            "route {route} has no cards"
        );
    }
    let configured: BTreeSet<RouteId> = board.routes.iter().map(|r| r.id.clone()).collect();
    assert_eq!(configured, entrances);
    assert!(!board.graduation_messages.is_empty());
    assert!(!decks.challenge.is_empty());
    assert!(!decks.expertise.is_empty());
}

#[test]
fn actions_use_type_and_payload_tags() {
    let roll = serde_json::to_value(Action::RollFinished { d1: 3, d2: 5 }).unwrap();
    assert_eq!(
        roll,
        json!({ "type": "ROLL_FINISHED", "payload": { "d1": 3, "d2": 5 } })
    );
    assert_eq!(
        serde_json::to_value(Action::AdvanceTurnPhase).unwrap(),
        json!({ "type": "ADVANCE_TURN_PHASE" })
    );

    let decoded: Action = serde_json::from_value(json!({
        "type": "RESOLVE_GIFT",
        "payload": { "money": 500 }
    }))
    .unwrap();
    assert_eq!(decoded, Action::ResolveGift(Rewards::money(500)));

    let setup: Action = serde_json::from_value(json!({
        "type": "SAVE_PLAYER",
        "payload": {
            "name": "Ana",
            "age": 30,
            "money_goal": 40,
            "health_goal": 20,
            "happiness_goal": 15
        }
    }))
    .unwrap();
    assert_eq!(
        setup,
        Action::SavePlayer(PlayerDraft::new("Ana", 30).with_goals(40, 20, 15))
    );
}

#[test]
fn game_state_survives_a_save_round_trip() {
    let mut state = GameState::playing(vec![
        PlayerDraft::new("Ana", 30)
            .with_goals(40, 20, 15)
            .into_player(0),
        PlayerDraft::new("Bruno", 45)
            .with_goals(40, 20, 20)
            .into_player(1),
    ]);
    state.pot = 4_000;
    state.phase = TurnPhase::TileAction;
    state.current_tile = Some(27);
    state.active_interaction = Some(ActiveInteraction::Card {
        card: Card::new("You pay a $3000 fine.", "💸", Rewards::fine(3_000)),
        source: CardSource::Fine,
    });
    state.players[1]
        .route
        .enter(RouteId::new("purpose"), 4);

    let saved = serde_json::to_string(&state).unwrap();
    let restored: GameState = serde_json::from_str(&saved).unwrap();
    assert_eq!(restored, state);
    assert_eq!(state_signature(&restored), state_signature(&state));

    let value: Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(value["phase"], "TILE_ACTION");
    assert_eq!(value["active_interaction"]["kind"], "card");
    assert_eq!(value["active_interaction"]["source"]["source"], "fine");
    assert_eq!(value["players"][1]["route"]["route"], "purpose");
}
