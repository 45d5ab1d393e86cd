//! The single game state value and its sub-records.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::{CornerKind, DiceEventKind, RouteId};
use crate::data::{Card, Rewards};
use crate::player::{Player, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GameStatus {
    #[default]
    Intro,
    Start,
    Setup,
    Playing,
    Celebrating,
    Win,
    Lobby,
}

/// Turn-level state machine value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnPhase {
    #[default]
    Idle,
    Rolling,
    Moving,
    TileInfo,
    TileAction,
    StatUpdate,
    TurnEnd,
}

/// Where a card on screen came from; drives its framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "route", rename_all = "snake_case")]
pub enum CardSource {
    Challenge,
    Expertise,
    Fine,
    Jackpot,
    YouWin,
    Birthday,
    Gifts,
    Poem,
    LuckyDay,
    Relax,
    Route(RouteId),
}

/// Chained hand-off where every other player may give the receiver a gift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftChain {
    pub giver: usize,
    pub receiver: usize,
    #[serde(default)]
    pub pending: SmallVec<[usize; 4]>,
    #[serde(default)]
    pub accumulated: Rewards,
}

/// The blocking sub-flow that must resolve before the turn continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveInteraction {
    Info {
        tile: usize,
    },
    RouteDecision {
        route: RouteId,
        cost: i64,
    },
    Card {
        card: Card,
        source: CardSource,
    },
    DiceEvent {
        tile: usize,
        event: DiceEventKind,
    },
    HospitalOrVacation {
        tile: usize,
        corner: CornerKind,
    },
    GiftSelection(GiftChain),
}

impl ActiveInteraction {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Info { .. } => "info",
            Self::RouteDecision { .. } => "route_decision",
            Self::Card { .. } => "card",
            Self::DiceEvent { .. } => "dice_event",
            Self::HospitalOrVacation { .. } => "hospital_or_vacation",
            Self::GiftSelection(_) => "gift_selection",
        }
    }
}

/// Animation the presentation layer should play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum AnimationCue {
    Challenge,
    Expertise,
    Graduation { bonus: i64, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveIncomeBanner {
    pub amount: i64,
    pub health_gain: i32,
    pub player_name: String,
    pub lap: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDetails {
    pub start_pos: usize,
    pub steps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMoveDetails {
    pub start_step: u32,
    pub steps: u32,
}

/// Online identity of this device; never overwritten by remote snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBinding {
    pub id: String,
    #[serde(default)]
    pub is_host: bool,
}

/// Authoritative game state.
///
/// Every field defaults so partially populated snapshots still decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameState {
    pub status: GameStatus,
    pub total_players: usize,
    pub setup_index: usize,
    pub players: Vec<Player>,
    pub current_player: usize,
    pub pot: i64,
    pub active_interaction: Option<ActiveInteraction>,
    /// Index of the tile the current player last landed on.
    pub current_tile: Option<usize>,
    pub show_turn_overlay: bool,
    pub winner: Option<Player>,
    pub dice: [u8; 2],
    pub is_rolling: bool,
    pub passive_income_banner: Option<PassiveIncomeBanner>,
    pub move_details: Option<MoveDetails>,
    pub route_move_details: Option<RouteMoveDetails>,
    pub showing_stat_changes: bool,
    pub phase: TurnPhase,
    pub animation: Option<AnimationCue>,
    pub overflow_steps: u32,
    pub room: Option<RoomBinding>,
    pub local_player_id: Option<PlayerId>,
}

impl GameState {
    /// A game already past setup with the given roster.
    #[must_use]
    pub fn playing(players: Vec<Player>) -> Self {
        Self {
            status: GameStatus::Playing,
            total_players: players.len(),
            players,
            show_turn_overlay: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player)
    }

    pub fn current_player_mut(&mut self) -> Option<&mut Player> {
        self.players.get_mut(self.current_player)
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.status, GameStatus::Playing)
    }

    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.move_details.is_some()
    }

    #[must_use]
    pub const fn is_moving_in_route(&self) -> bool {
        self.route_move_details.is_some()
    }

    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.room.is_some()
    }

    #[must_use]
    pub fn is_host(&self) -> bool {
        self.room.as_ref().is_some_and(|room| room.is_host)
    }

    #[must_use]
    pub fn room_id(&self) -> Option<&str> {
        self.room.as_ref().map(|room| room.id.as_str())
    }

    /// Hand the turn to the next player and show the turn overlay.
    pub fn rotate_turn(&mut self) {
        if !self.players.is_empty() {
            self.current_player = (self.current_player + 1) % self.players.len();
        }
        self.active_interaction = None;
        self.animation = None;
        self.passive_income_banner = None;
        self.showing_stat_changes = false;
        self.show_turn_overlay = true;
        self.phase = TurnPhase::Idle;
    }

    /// Drop transient movement and animation flags, as after a restore.
    pub fn clear_transient(&mut self) {
        self.is_rolling = false;
        self.move_details = None;
        self.route_move_details = None;
        self.animation = None;
    }

    /// Floor every player's stats, the winner's and the pot at zero.
    pub fn clamp_stats(&mut self) {
        for player in self.players.iter_mut().chain(self.winner.as_mut()) {
            player.stats.clamp();
        }
        self.pot = self.pot.max(0);
    }

    /// Sum of money across players plus the pot.
    #[must_use]
    pub fn total_money(&self) -> i64 {
        self.pot + self.players.iter().map(|p| p.stats.money).sum::<i64>()
    }
}
