//! Reconciliation of remote snapshots and the outbound publish gate.
use serde_json::{Map, Value};
use std::hash::Hasher;
use thiserror::Error;
use twox_hash::XxHash64;

use crate::constants::DIE_FACES;
use crate::player::Player;
use crate::state::{GameState, GameStatus};

/// Fields describing this device rather than the shared game.
const IDENTITY_FIELDS: [&str; 2] = ["room", "local_player_id"];

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not a JSON object")]
    NotAnObject,
    #[error("snapshot does not describe a game state: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("snapshot carries no usable field")]
    NothingUsable,
}

/// Repair transport quirks: keyed maps back into ordered arrays, nulls
/// dropped so defaults apply, malformed dice and rosters reset. Absent
/// fields stay absent.
///
/// # Errors
///
/// Returns [`SnapshotError::NotAnObject`] when the root is not an object.
pub fn normalize_snapshot(snapshot: Value) -> Result<Value, SnapshotError> {
    if !snapshot.is_object() {
        return Err(SnapshotError::NotAnObject);
    }
    let Value::Object(mut root) = normalize(snapshot) else {
        return Err(SnapshotError::NotAnObject);
    };

    let dice_ok = root
        .get("dice")
        .and_then(Value::as_array)
        .is_some_and(|dice| {
            dice.len() == 2
                && dice
                    .iter()
                    .all(|die| die.as_u64().is_some_and(|pips| pips <= u64::from(DIE_FACES)))
        });
    if root.contains_key("dice") && !dice_ok {
        log::warn!("snapshot dice malformed; resetting to [0, 0]");
        root.insert("dice".into(), Value::from(vec![0, 0]));
    }

    if let Some(players) = root.get("players")
        && !players.is_array()
    {
        log::warn!("snapshot players is not a sequence; treating as empty");
        root.insert("players".into(), Value::Array(Vec::new()));
    }
    Ok(Value::Object(root))
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .filter(|(_, child)| !child.is_null())
                .map(|(key, child)| (key, normalize(child)))
                .collect();
            if is_index_keyed(&map) {
                let mut entries: Vec<(usize, Value)> = map
                    .into_iter()
                    .filter_map(|(key, child)| key.parse().ok().map(|index| (index, child)))
                    .collect();
                entries.sort_by_key(|(index, _)| *index);
                Value::Array(entries.into_iter().map(|(_, child)| child).collect())
            } else {
                Value::Object(map)
            }
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(normalize)
                .collect(),
        ),
        other => other,
    }
}

fn is_index_keyed(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|key| key.parse::<usize>().is_ok())
}

/// Overlay an inbound snapshot on the local state, keeping this device's
/// identity.
///
/// Fields the snapshot omits keep their local value and explicit nulls clear
/// optional fields. A field that fails to decode keeps its local value, and
/// a roster entry that fails to decode is dropped from the roster.
///
/// # Errors
///
/// Returns an error when the snapshot is not an object or none of its
/// fields can be applied.
pub fn merge_remote(local: &GameState, snapshot: Value) -> Result<GameState, SnapshotError> {
    let Value::Object(raw) = &snapshot else {
        return Err(SnapshotError::NotAnObject);
    };
    let cleared: Vec<String> = raw
        .iter()
        .filter(|(_, value)| value.is_null())
        .map(|(key, _)| key.clone())
        .collect();
    let Value::Object(incoming) = normalize_snapshot(snapshot)? else {
        return Err(SnapshotError::NotAnObject);
    };
    let Value::Object(mut base) = serde_json::to_value(local)? else {
        return Err(SnapshotError::NotAnObject);
    };

    let mut applied = 0_usize;
    let fields = incoming
        .into_iter()
        .chain(cleared.into_iter().map(|key| (key, Value::Null)));
    for (key, value) in fields {
        if IDENTITY_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let value = if key == "players" {
            decode_roster(value)
        } else {
            value
        };
        if field_decodes(&key, &value) {
            base.insert(key, value);
            applied += 1;
        } else {
            log::warn!("snapshot field {key} is malformed; keeping the local value");
        }
    }
    if applied == 0 {
        return Err(SnapshotError::NothingUsable);
    }

    let mut merged: GameState = serde_json::from_value(Value::Object(base))?;
    merged.clamp_stats();
    if merged.current_player >= merged.players.len() {
        merged.current_player = 0;
    }
    Ok(merged)
}

/// Keep the roster entries that decode as players, in order.
fn decode_roster(value: Value) -> Value {
    let Value::Array(entries) = value else {
        return Value::Array(Vec::new());
    };
    let total = entries.len();
    let players: Vec<Value> = entries
        .into_iter()
        .filter(|entry| serde_json::from_value::<Player>(entry.clone()).is_ok())
        .collect();
    if players.len() < total {
        log::warn!(
            "dropped {} malformed roster entries from snapshot",
            total - players.len()
        );
    }
    Value::Array(players)
}

fn field_decodes(key: &str, value: &Value) -> bool {
    let mut single = Map::new();
    single.insert(key.to_string(), value.clone());
    serde_json::from_value::<GameState>(Value::Object(single)).is_ok()
}

/// The state as published to other devices: identity fields stripped.
#[must_use]
pub fn shared_snapshot(state: &GameState) -> Value {
    match serde_json::to_value(state) {
        Ok(Value::Object(mut map)) => {
            for field in IDENTITY_FIELDS {
                map.remove(field);
            }
            Value::Object(map)
        }
        Ok(other) => other,
        Err(err) => {
            log::warn!("failed to serialize state: {err}");
            Value::Null
        }
    }
}

/// Stable hash of a snapshot's canonical JSON form.
#[must_use]
pub fn snapshot_signature(snapshot: &Value) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(snapshot.to_string().as_bytes());
    hasher.finish()
}

#[must_use]
pub fn state_signature(state: &GameState) -> u64 {
    snapshot_signature(&shared_snapshot(state))
}

/// Why a locally produced state is or is not sent to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishDecision {
    Publish,
    Offline,
    /// Guests only publish during setup or when their save started the game.
    NotPermitted,
    /// Identical to the last snapshot received.
    Echo,
}

/// Remembers the last inbound snapshot and decides outbound publishes.
#[derive(Debug, Clone, Default)]
pub struct PublishGate {
    last_inbound: Option<u64>,
}

impl PublishGate {
    #[must_use]
    pub const fn new() -> Self {
        Self { last_inbound: None }
    }

    /// Record the state produced by merging an inbound snapshot.
    pub fn record_inbound(&mut self, merged: &GameState) {
        self.last_inbound = Some(state_signature(merged));
    }

    #[must_use]
    pub const fn last_inbound(&self) -> Option<u64> {
        self.last_inbound
    }

    /// Decide whether `state`, produced locally from a state whose status was
    /// `previous`, should be published.
    #[must_use]
    pub fn decide(&self, previous: GameStatus, state: &GameState) -> PublishDecision {
        if !state.is_online() {
            return PublishDecision::Offline;
        }
        let in_setup = state.status == GameStatus::Setup;
        let started_game = previous == GameStatus::Setup && state.status == GameStatus::Playing;
        if !(state.is_host() || in_setup || started_game) {
            return PublishDecision::NotPermitted;
        }
        if self.last_inbound == Some(state_signature(state)) {
            return PublishDecision::Echo;
        }
        PublishDecision::Publish
    }
}
