//! Exito Game Engine
//!
//! Platform-agnostic core of Exito, a turn-based board game where players race
//! around a track balancing money, health and happiness to reach a success
//! score of 100. This crate holds the rules and the turn state machine; screens,
//! sound and transport live elsewhere and talk to it through [`Action`]s.

pub mod action;
pub mod board;
pub mod constants;
pub mod data;
pub mod player;
pub mod rng;
pub mod room;
pub mod session;
pub mod state;
pub mod success;
pub mod sync;
pub mod turn;

// Re-export commonly used types
pub use action::Action;
pub use board::{
    Board, BonusKind, CardCategory, CareOutcome, CornerKind, DiceEventKind, GameRules,
    RouteConfig, RouteId, Tile, TileKind,
};
pub use data::{Card, DeckId, Decks, Rewards};
pub use player::{
    Player, PlayerDraft, PlayerId, RouteStatus, SetupError, Stats, Targets, time_score_for_age,
};
pub use rng::{CountingRng, RandomSource, ScriptedRandom, SeededRandom};
pub use room::{generate_room_code, normalize_room_code, room_seed};
pub use session::{
    GameSession, GameStorage, NoStorage, Offline, OfflineError, RealtimeChannel, SAVE_SLOT,
    SessionError, SessionResult, SnapshotCallback, Subscription,
};
pub use state::{
    ActiveInteraction, AnimationCue, CardSource, GameState, GameStatus, GiftChain, MoveDetails,
    PassiveIncomeBanner, RoomBinding, RouteMoveDetails, TurnPhase,
};
pub use success::{first_to_cross, has_won, leader, success};
pub use sync::{
    PublishDecision, PublishGate, SnapshotError, merge_remote, normalize_snapshot,
    shared_snapshot, snapshot_signature, state_signature,
};
pub use turn::reduce;
