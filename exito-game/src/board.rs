//! Static board, route table and tile rules.
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use crate::constants::{
    CARE_COST_PER_PIP, DEFAULT_ROUTE_FEE, DEFAULT_ROUTE_LENGTH, DICE_EVENT_MONEY_PER_PIP,
};
use crate::data::{Decks, Rewards};

const DEFAULT_BOARD_DATA: &str = include_str!("../assets/data/board.json");

/// Identifier of an inner route.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub String);

impl RouteId {
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerKind {
    Start,
    Hospital,
    Vacation,
    /// Pays out the whole shared pot.
    Jackpot,
}

/// Dice-driven cost/recovery paid at the hospital or on vacation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CareOutcome {
    pub cost: i64,
    pub health: i32,
    pub happiness: i32,
}

impl CornerKind {
    /// Outcome of the care roll for hospital/vacation corners.
    #[must_use]
    pub fn care_outcome(self, die: u8) -> Option<CareOutcome> {
        let pips = i32::from(die);
        let cost = i64::from(die) * CARE_COST_PER_PIP;
        match self {
            Self::Hospital => Some(CareOutcome {
                cost,
                health: pips,
                happiness: 0,
            }),
            Self::Vacation => Some(CareOutcome {
                cost,
                health: 0,
                happiness: pips,
            }),
            Self::Start | Self::Jackpot => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    Challenge,
    Expertise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiceEventKind {
    Restaurant,
    Lawsuit,
    Taxes,
    SocialCause,
    Pollution,
    Pandemic,
    Casino,
    Family,
}

impl DiceEventKind {
    /// Payout for a die roll on this event tile.
    #[must_use]
    pub fn rewards(self, die: u8) -> Rewards {
        let pips = i32::from(die);
        let cash = i64::from(die) * DICE_EVENT_MONEY_PER_PIP;
        match self {
            Self::Restaurant | Self::Lawsuit | Self::Taxes => Rewards::money(-cash),
            Self::SocialCause => Rewards::money(cash),
            Self::Pollution | Self::Pandemic => Rewards::health(-pips),
            Self::Casino => Rewards {
                money: -cash,
                happiness: -pips,
                ..Rewards::default()
            },
            Self::Family => Rewards {
                money: cash,
                health: pips,
                ..Rewards::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    /// Permanent passive income increase.
    YouWin,
    Birthday,
    Poem,
    LuckyDay,
}

/// Behavioural type of a tile, with only the fields that type uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TileKind {
    Corner {
        corner: CornerKind,
    },
    RouteEntrance {
        route: RouteId,
    },
    Card {
        category: CardCategory,
    },
    DiceEvent {
        event: DiceEventKind,
    },
    Fine {
        amount: i64,
        #[serde(default)]
        global: bool,
    },
    Bonus {
        bonus: BonusKind,
        #[serde(default)]
        amount: i64,
    },
    Relax,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(flatten)]
    pub kind: TileKind,
}

impl Tile {
    #[must_use]
    pub fn new(name: &str, kind: TileKind) -> Self {
        Self {
            name: name.to_string(),
            desc: String::new(),
            icon: None,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    pub id: RouteId,
    pub name: String,
    pub fee: i64,
    /// Passive income granted on completion; defaults to the fee.
    #[serde(default)]
    pub bonus: Option<i64>,
}

impl RouteConfig {
    #[must_use]
    pub fn completion_bonus(&self) -> i64 {
        self.bonus.unwrap_or(self.fee)
    }
}

fn default_route_length() -> u32 {
    DEFAULT_ROUTE_LENGTH
}

/// The closed main track plus the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default = "default_route_length")]
    pub route_length: u32,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub graduation_messages: Vec<String>,
}

impl Board {
    /// Load a board from a JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a board.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Four-tile board used when the bundled asset cannot be parsed.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            route_length: DEFAULT_ROUTE_LENGTH,
            routes: Vec::new(),
            tiles: vec![
                Tile::new(
                    "Start",
                    TileKind::Corner {
                        corner: CornerKind::Start,
                    },
                ),
                Tile::new(
                    "Challenge",
                    TileKind::Card {
                        category: CardCategory::Challenge,
                    },
                ),
                Tile::new("Relax", TileKind::Relax),
                Tile::new(
                    "Expertise",
                    TileKind::Card {
                        category: CardCategory::Expertise,
                    },
                ),
            ],
            graduation_messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    #[must_use]
    pub fn route(&self, id: &RouteId) -> Option<&RouteConfig> {
        self.routes.iter().find(|route| &route.id == id)
    }

    /// Entry fee for a route the player has not completed yet.
    #[must_use]
    pub fn route_fee(&self, id: &RouteId) -> i64 {
        self.route(id).map_or(DEFAULT_ROUTE_FEE, |route| route.fee)
    }

    #[must_use]
    pub fn route_bonus(&self, id: &RouteId) -> i64 {
        self.route(id)
            .map_or(DEFAULT_ROUTE_FEE, RouteConfig::completion_bonus)
    }

    /// Position reached after `steps` tiles, wrapping around the loop.
    #[must_use]
    pub fn advance(&self, from: usize, steps: u32) -> usize {
        if self.tiles.is_empty() {
            return 0;
        }
        (from + steps as usize) % self.tiles.len()
    }
}

/// Everything the reducer consults but never mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRules {
    pub board: Board,
    pub decks: Decks,
}

impl GameRules {
    #[must_use]
    pub const fn new(board: Board, decks: Decks) -> Self {
        Self { board, decks }
    }

    /// Build rules from board and deck JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if either document fails to parse.
    pub fn from_json(board_json: &str, decks_json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            Board::from_json(board_json)?,
            Decks::from_json(decks_json)?,
        ))
    }

    /// Read board and deck JSON files from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed.
    pub fn from_files(board_path: &Path, decks_path: &Path) -> anyhow::Result<Self> {
        let board_json = std::fs::read_to_string(board_path)
            .with_context(|| format!("reading board {}", board_path.display()))?;
        let decks_json = std::fs::read_to_string(decks_path)
            .with_context(|| format!("reading decks {}", decks_path.display()))?;
        let board = Board::from_json(&board_json)
            .with_context(|| format!("parsing board {}", board_path.display()))?;
        let decks = Decks::from_json(&decks_json)
            .with_context(|| format!("parsing decks {}", decks_path.display()))?;
        anyhow::ensure!(!board.is_empty(), "board {} has no tiles", board_path.display());
        Ok(Self::new(board, decks))
    }

    /// Rules bundled with the crate.
    #[must_use]
    pub fn standard() -> &'static Self {
        static RULES: OnceLock<GameRules> = OnceLock::new();
        RULES.get_or_init(|| {
            let board = Board::from_json(DEFAULT_BOARD_DATA).unwrap_or_else(|err| {
                log::warn!("bundled board data is invalid: {err}");
                Board::fallback()
            });
            Self::new(board, Decks::standard().clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_board_shape() {
        let board = &GameRules::standard().board;
        assert_eq!(board.len(), 39);
        assert_eq!(board.route_length, 8);
        assert!(matches!(
            board.tile(0).map(|tile| &tile.kind),
            Some(TileKind::Corner {
                corner: CornerKind::Start
            })
        ));
        for tile in &board.tiles {
            if let TileKind::RouteEntrance { route } = &tile.kind {
                assert!(board.route(route).is_some(), "unknown route {route}");
            }
        }
    }

    #[test]
    fn tile_json_flattens_kind() {
        let tile: Tile = serde_json::from_str(
            r#"{ "name": "Everyone Donates", "type": "fine", "amount": 1000, "global": true }"#,
        )
        .unwrap();
        assert_eq!(
            tile.kind,
            TileKind::Fine {
                amount: 1000,
                global: true
            }
        );
        let local: Tile =
            serde_json::from_str(r#"{ "name": "Fine", "type": "fine", "amount": 500 }"#).unwrap();
        assert_eq!(
            local.kind,
            TileKind::Fine {
                amount: 500,
                global: false
            }
        );
    }

    #[test]
    fn unknown_route_falls_back_to_default_fee() {
        let board = Board::fallback();
        let id = RouteId::new("mystery");
        assert_eq!(board.route_fee(&id), DEFAULT_ROUTE_FEE);
        assert_eq!(board.route_bonus(&id), DEFAULT_ROUTE_FEE);
    }

    #[test]
    fn rules_load_from_files() {
        let dir = std::env::temp_dir().join(format!("exito-rules-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let board = dir.join("board.json");
        let decks = dir.join("decks.json");
        std::fs::write(&board, DEFAULT_BOARD_DATA).unwrap();
        std::fs::write(&decks, r#"{ "challenge": [] }"#).unwrap();
        let rules = GameRules::from_files(&board, &decks).unwrap();
        assert_eq!(rules.board.len(), 39);
        assert!(rules.decks.challenge.is_empty());

        std::fs::write(&board, r#"{ "tiles": [] }"#).unwrap();
        assert!(GameRules::from_files(&board, &decks).is_err());
        assert!(GameRules::from_files(&dir.join("missing.json"), &decks).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn advance_wraps_around_the_loop() {
        let board = &GameRules::standard().board;
        assert_eq!(board.advance(38, 5), 4);
        assert_eq!(board.advance(0, 12), 12);
    }

    #[test]
    fn dice_event_table() {
        assert_eq!(DiceEventKind::Restaurant.rewards(3).money, -3_000);
        assert_eq!(DiceEventKind::SocialCause.rewards(2).money, 2_000);
        assert_eq!(DiceEventKind::Pandemic.rewards(4).health, -4);
        let casino = DiceEventKind::Casino.rewards(5);
        assert_eq!((casino.money, casino.happiness), (-5_000, -5));
        let family = DiceEventKind::Family.rewards(6);
        assert_eq!((family.money, family.health), (6_000, 6));
    }

    #[test]
    fn care_outcomes() {
        let hospital = CornerKind::Hospital.care_outcome(4).unwrap();
        assert_eq!((hospital.cost, hospital.health, hospital.happiness), (4_000, 4, 0));
        let vacation = CornerKind::Vacation.care_outcome(2).unwrap();
        assert_eq!((vacation.cost, vacation.health, vacation.happiness), (2_000, 0, 2));
        assert!(CornerKind::Start.care_outcome(1).is_none());
    }
}
