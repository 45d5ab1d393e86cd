//! Session driver binding the reducer to persistence and a realtime room.
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

use crate::action::Action;
use crate::board::GameRules;
use crate::rng::RandomSource;
use crate::room::normalize_room_code;
use crate::state::{GameState, GameStatus};
use crate::sync::{PublishDecision, PublishGate, shared_snapshot};
use crate::turn::{reduce, try_reduce};

/// Fixed slot the autosave writes to.
pub const SAVE_SLOT: &str = "exito_savegame";

/// Trait for abstracting game persistence operations
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, slot: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self, slot: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, slot: &str) -> Result<(), Self::Error>;
}

/// Callback receiving every snapshot pushed to a room.
pub type SnapshotCallback = Box<dyn FnMut(Value)>;

/// Push-based transport shared by the devices in a room.
pub trait RealtimeChannel {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a full snapshot to everyone in `room`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be delivered.
    fn publish(&self, room: &str, snapshot: &Value) -> Result<(), Self::Error>;

    /// Start receiving snapshots for `room`.
    ///
    /// # Errors
    ///
    /// Returns an error if the room does not exist or cannot be joined.
    fn subscribe(&self, room: &str, on_snapshot: SnapshotCallback)
    -> Result<Subscription, Self::Error>;
}

/// Live subscription; dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    #[must_use]
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Storage that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStorage;

impl GameStorage for NoStorage {
    type Error = Infallible;

    fn save_game(&self, _slot: &str, _game_state: &GameState) -> Result<(), Self::Error> {
        Ok(())
    }

    fn load_game(&self, _slot: &str) -> Result<Option<GameState>, Self::Error> {
        Ok(None)
    }

    fn delete_save(&self, _slot: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Error)]
#[error("no realtime channel is configured")]
pub struct OfflineError;

/// Channel for local-only sessions; every room operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl RealtimeChannel for Offline {
    type Error = OfflineError;

    fn publish(&self, _room: &str, _snapshot: &Value) -> Result<(), Self::Error> {
        Err(OfflineError)
    }

    fn subscribe(
        &self,
        _room: &str,
        _on_snapshot: SnapshotCallback,
    ) -> Result<Subscription, Self::Error> {
        Err(OfflineError)
    }
}

#[derive(Debug, Error)]
pub enum SessionError<S, C>
where
    S: std::error::Error + 'static,
    C: std::error::Error + 'static,
{
    #[error("storage failed: {0}")]
    Storage(#[source] S),
    #[error("realtime channel failed: {0}")]
    Channel(#[source] C),
    #[error("invalid room code {0:?}")]
    InvalidRoom(String),
}

pub type SessionResult<T, S, C> =
    Result<T, SessionError<<S as GameStorage>::Error, <C as RealtimeChannel>::Error>>;

/// One device's view of a game: state, randomness and collaborators.
pub struct GameSession<'a, R, S, C>
where
    R: RandomSource,
    S: GameStorage,
    C: RealtimeChannel,
{
    rules: &'a GameRules,
    rng: R,
    storage: S,
    channel: C,
    state: GameState,
    gate: PublishGate,
    inbox: Rc<RefCell<VecDeque<Value>>>,
    subscription: Option<Subscription>,
}

impl<'a, R, S, C> GameSession<'a, R, S, C>
where
    R: RandomSource,
    S: GameStorage,
    C: RealtimeChannel,
{
    pub fn new(rules: &'a GameRules, rng: R, storage: S, channel: C) -> Self {
        Self {
            rules,
            rng,
            storage,
            channel,
            state: GameState::default(),
            gate: PublishGate::new(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            subscription: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub const fn rules(&self) -> &'a GameRules {
        self.rules
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Run a locally issued action, then autosave and publish as the policy
    /// allows.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage or the channel fails; the new state is
    /// kept either way.
    pub fn dispatch(&mut self, action: Action) -> SessionResult<&GameState, S, C> {
        let previous = self.state.status;
        self.state = reduce(&self.state, action, self.rules, &mut self.rng);
        self.autosave()?;
        self.publish_if_allowed(previous)?;
        Ok(&self.state)
    }

    fn autosave(&self) -> SessionResult<(), S, C> {
        if self.state.is_online() {
            return Ok(());
        }
        match self.state.status {
            GameStatus::Playing | GameStatus::Celebrating => self
                .storage
                .save_game(SAVE_SLOT, &self.state)
                .map_err(SessionError::Storage),
            GameStatus::Win => self
                .storage
                .delete_save(SAVE_SLOT)
                .map_err(SessionError::Storage),
            _ => Ok(()),
        }
    }

    fn publish_if_allowed(&self, previous: GameStatus) -> SessionResult<(), S, C> {
        let Some(room) = self.state.room_id() else {
            return Ok(());
        };
        match self.gate.decide(previous, &self.state) {
            PublishDecision::Publish => self
                .channel
                .publish(room, &shared_snapshot(&self.state))
                .map_err(SessionError::Channel),
            decision => {
                log::debug!("not publishing to {room}: {decision:?}");
                Ok(())
            }
        }
    }

    /// Whether a resumable game sits in the save slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn has_save(&self) -> SessionResult<bool, S, C> {
        self.storage
            .load_game(SAVE_SLOT)
            .map(|saved| saved.is_some())
            .map_err(SessionError::Storage)
    }

    /// Restore the autosaved game, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    pub fn resume(&mut self) -> SessionResult<bool, S, C> {
        let Some(saved) = self
            .storage
            .load_game(SAVE_SLOT)
            .map_err(SessionError::Storage)?
        else {
            return Ok(false);
        };
        self.dispatch(Action::LoadSavedGame(Box::new(saved)))?;
        Ok(true)
    }

    /// Join (or create, as host) a room. The state only changes once the
    /// subscription is live, so a failed join leaves the game untouched.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed code or when the channel refuses the
    /// subscription.
    pub fn join_room(&mut self, code: &str, is_host: bool) -> SessionResult<(), S, C> {
        let room = normalize_room_code(code).ok_or_else(|| SessionError::InvalidRoom(code.into()))?;
        let inbox = Rc::clone(&self.inbox);
        let subscription = self
            .channel
            .subscribe(
                &room,
                Box::new(move |snapshot| inbox.borrow_mut().push_back(snapshot)),
            )
            .map_err(SessionError::Channel)?;
        if let Some(previous) = self.subscription.replace(subscription) {
            previous.unsubscribe();
        }
        log::info!("joined room {room} as {}", if is_host { "host" } else { "guest" });
        let previous = self.state.status;
        self.state = reduce(
            &self.state,
            Action::SetRoom { id: room, is_host },
            self.rules,
            &mut self.rng,
        );
        if is_host {
            self.publish_if_allowed(previous)?;
        }
        self.pump_remote();
        Ok(())
    }

    /// Unsubscribe and return to the intro screen.
    pub fn leave_room(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.inbox.borrow_mut().clear();
        self.gate = PublishGate::new();
        self.state = reduce(&self.state, Action::Reset, self.rules, &mut self.rng);
    }

    /// Apply every queued remote snapshot in arrival order.
    ///
    /// Returns how many snapshots were merged.
    pub fn pump_remote(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let Some(snapshot) = self.inbox.borrow_mut().pop_front() else {
                break;
            };
            let merged = try_reduce(
                &self.state,
                Action::SyncRemoteState(snapshot),
                self.rules,
                &mut self.rng,
            );
            let Ok(merged) = merged else {
                continue;
            };
            self.state = merged;
            self.gate.record_inbound(&self.state);
            applied += 1;
        }
        applied
    }
}

impl<R, S, C> fmt::Debug for GameSession<'_, R, S, C>
where
    R: RandomSource,
    S: GameStorage,
    C: RealtimeChannel,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("state", &self.state)
            .field("gate", &self.gate)
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}
