//! Centralized balance and tuning constants for Exito game logic.
//!
//! Board layout, routes and decks are data (see `assets/data`), but the
//! arithmetic of a turn lives here so it can only change through review.

// Setup -------------------------------------------------------------------
pub const MIN_PLAYERS: usize = 1;
pub const MAX_PLAYERS: usize = 4;
pub const MIN_NAME_LEN: usize = 2;
pub const MIN_AGE: u32 = 6;
pub const MAX_AGE: u32 = 99;
pub const MIN_HEALTH_GOAL: i32 = 10;
pub const MIN_HAPPINESS_GOAL: i32 = 10;
pub const MAX_MONEY_GOAL: i32 = 80;
pub const STARTING_MONEY: i64 = 5_000;
pub const STARTING_PASSIVE: i64 = 5_000;

// Success -----------------------------------------------------------------
pub const SUCCESS_TARGET: i32 = 100;
/// Money counted per success point.
pub const MONEY_PER_POINT: i64 = 1_000;

// Laps --------------------------------------------------------------------
pub const LAP_HEALTH_BASE: i32 = 2;
pub const LAP_PASSIVE_INCREMENT: i64 = 1_000;

// Routes ------------------------------------------------------------------
pub const DEFAULT_ROUTE_FEE: i64 = 3_000;
pub const DEFAULT_ROUTE_LENGTH: u32 = 8;
/// Step a player stands on right after entering a route.
pub const ROUTE_ENTRY_STEP: u32 = 1;

// Dice-driven tiles -------------------------------------------------------
pub const DIE_FACES: u8 = 6;
pub const DICE_EVENT_MONEY_PER_PIP: i64 = 1_000;
pub const CARE_COST_PER_PIP: i64 = 1_000;

// Fixed-card tiles --------------------------------------------------------
pub const SOLO_BIRTHDAY_BONUS: i64 = 1_000;
pub const POEM_HAPPINESS: i32 = 3;
pub const LUCKY_DAY_HAPPINESS: i32 = 1;
pub const LUCKY_DAY_HEALTH: i32 = 1;
pub const RELAX_HEALTH: i32 = 1;

// Online ------------------------------------------------------------------
pub const ROOM_CODE_LEN: usize = 6;
