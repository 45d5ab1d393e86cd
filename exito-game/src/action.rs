//! The closed set of actions the presentation layer may dispatch.
use serde::{Deserialize, Serialize};

use crate::board::CareOutcome;
use crate::data::Rewards;
use crate::player::PlayerDraft;
use crate::state::GameState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // Lifecycle
    Reset,
    ShowStartScreen,
    ShowLobby,
    BeginSetup(usize),
    SavePlayer(PlayerDraft),

    // Turn
    StartTurn,
    RollDice,
    RollFinished { d1: u8, d2: u8 },

    // Movement progression
    UpdatePosition(usize),
    UpdateRouteStep(u32),
    FinishMove,
    FinishRouteMove,

    // Interaction resolution
    DecideRoute(bool),
    ResolveCard(bool),
    ResolveDiceEvent(Rewards),
    ResolveHospital(CareOutcome),
    ResolveGift(Rewards),

    AdvanceTurnPhase,
    EndAnimation,
    HidePassiveIncomeBanner,

    // End game
    EndGameEarly,
    FinishWinAnimation,

    // Online sync
    SetRoom { id: String, is_host: bool },
    SyncRemoteState(serde_json::Value),
    LoadSavedGame(Box<GameState>),
}

impl Action {
    /// Short stable name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::ShowStartScreen => "show_start_screen",
            Self::ShowLobby => "show_lobby",
            Self::BeginSetup(_) => "begin_setup",
            Self::SavePlayer(_) => "save_player",
            Self::StartTurn => "start_turn",
            Self::RollDice => "roll_dice",
            Self::RollFinished { .. } => "roll_finished",
            Self::UpdatePosition(_) => "update_position",
            Self::UpdateRouteStep(_) => "update_route_step",
            Self::FinishMove => "finish_move",
            Self::FinishRouteMove => "finish_route_move",
            Self::DecideRoute(_) => "decide_route",
            Self::ResolveCard(_) => "resolve_card",
            Self::ResolveDiceEvent(_) => "resolve_dice_event",
            Self::ResolveHospital(_) => "resolve_hospital",
            Self::ResolveGift(_) => "resolve_gift",
            Self::AdvanceTurnPhase => "advance_turn_phase",
            Self::EndAnimation => "end_animation",
            Self::HidePassiveIncomeBanner => "hide_passive_income_banner",
            Self::EndGameEarly => "end_game_early",
            Self::FinishWinAnimation => "finish_win_animation",
            Self::SetRoom { .. } => "set_room",
            Self::SyncRemoteState(_) => "sync_remote_state",
            Self::LoadSavedGame(_) => "load_saved_game",
        }
    }

    /// Actions that only make sense while a game is being played.
    #[must_use]
    pub const fn is_turn_action(&self) -> bool {
        matches!(
            self,
            Self::StartTurn
                | Self::RollDice
                | Self::RollFinished { .. }
                | Self::UpdatePosition(_)
                | Self::UpdateRouteStep(_)
                | Self::FinishMove
                | Self::FinishRouteMove
                | Self::DecideRoute(_)
                | Self::ResolveCard(_)
                | Self::ResolveDiceEvent(_)
                | Self::ResolveHospital(_)
                | Self::ResolveGift(_)
                | Self::AdvanceTurnPhase
                | Self::EndGameEarly
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_serialize_with_type_tag() {
        let json = serde_json::to_value(Action::RollFinished { d1: 2, d2: 3 }).unwrap();
        assert_eq!(json["type"], "ROLL_FINISHED");
        assert_eq!(json["payload"]["d1"], 2);
        let back: Action = serde_json::from_value(json).unwrap();
        assert_eq!(back, Action::RollFinished { d1: 2, d2: 3 });
    }

    #[test]
    fn turn_actions_are_classified() {
        assert!(Action::RollDice.is_turn_action());
        assert!(Action::ResolveGift(Rewards::default()).is_turn_action());
        assert!(!Action::EndAnimation.is_turn_action());
        assert!(!Action::SetRoom {
            id: "ROOM01".into(),
            is_host: false
        }
        .is_turn_action());
    }
}
