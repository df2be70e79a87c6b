//! In-memory host: a small world of players and blocks.
//!
//! Backs the console demo and the pipeline tests. Deliveries and notices are
//! recorded so they can be inspected afterwards.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use crate::common::error::{DeliveryError, DeliveryResult};
use crate::common::messages::OutgoingChat;
use crate::common::types::{BlockPos, Location, PlayerId, PlayerProfile};
use crate::host::{ChatSink, PlayerDirectory, WorldView};

#[derive(Debug, Clone)]
struct MemoryPlayer {
    profile: PlayerProfile,
    location: Location,
}

/// Single-threaded in-memory implementation of every host trait.
#[derive(Debug, Default)]
pub struct MemoryHost {
    players: RefCell<BTreeMap<PlayerId, MemoryPlayer>>,
    solid: RefCell<HashSet<(String, BlockPos)>>,
    deliveries: RefCell<Vec<(PlayerId, OutgoingChat)>>,
    notices: RefCell<Vec<(PlayerId, String)>>,
    /// Recipients whose delivery always fails.
    unreachable: RefCell<HashSet<PlayerId>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a player.
    pub fn add_player(&self, id: PlayerId, profile: PlayerProfile, location: Location) {
        self.players
            .borrow_mut()
            .insert(id, MemoryPlayer { profile, location });
    }

    pub fn remove_player(&self, id: PlayerId) -> bool {
        self.players.borrow_mut().remove(&id).is_some()
    }

    /// Find a player by username (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        self.players
            .borrow()
            .iter()
            .find(|(_, p)| p.profile.username.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }

    pub fn next_id(&self) -> PlayerId {
        self.players
            .borrow()
            .keys()
            .next_back()
            .map_or(1, |id| id + 1)
    }

    /// Edit a player's profile in place. Returns false for unknown players.
    pub fn update_profile(&self, id: PlayerId, edit: impl FnOnce(&mut PlayerProfile)) -> bool {
        match self.players.borrow_mut().get_mut(&id) {
            Some(player) => {
                edit(&mut player.profile);
                true
            }
            None => false,
        }
    }

    pub fn move_player(&self, id: PlayerId, location: Location) -> bool {
        match self.players.borrow_mut().get_mut(&id) {
            Some(player) => {
                player.location = location;
                true
            }
            None => false,
        }
    }

    pub fn set_solid(&self, world: &str, pos: BlockPos, solid: bool) {
        let key = (world.to_string(), pos);
        if solid {
            self.solid.borrow_mut().insert(key);
        } else {
            self.solid.borrow_mut().remove(&key);
        }
    }

    /// Make every delivery to `player` fail.
    pub fn set_unreachable(&self, player: PlayerId) {
        self.unreachable.borrow_mut().insert(player);
    }

    /// Drain recorded deliveries.
    pub fn take_deliveries(&self) -> Vec<(PlayerId, OutgoingChat)> {
        std::mem::take(&mut *self.deliveries.borrow_mut())
    }

    /// Drain recorded notices.
    pub fn take_notices(&self) -> Vec<(PlayerId, String)> {
        std::mem::take(&mut *self.notices.borrow_mut())
    }
}

impl PlayerDirectory for MemoryHost {
    fn online_players(&self) -> Vec<PlayerId> {
        self.players.borrow().keys().copied().collect()
    }

    fn profile(&self, player: PlayerId) -> Option<PlayerProfile> {
        self.players
            .borrow()
            .get(&player)
            .map(|p| p.profile.clone())
    }
}

impl WorldView for MemoryHost {
    fn location(&self, player: PlayerId) -> Option<Location> {
        self.players
            .borrow()
            .get(&player)
            .map(|p| p.location.clone())
    }

    fn is_solid(&self, world: &str, pos: BlockPos) -> bool {
        self.solid.borrow().contains(&(world.to_string(), pos))
    }
}

impl ChatSink for MemoryHost {
    fn deliver(&self, recipient: PlayerId, message: OutgoingChat) -> DeliveryResult {
        if self.unreachable.borrow().contains(&recipient) {
            return Err(DeliveryError::ChannelClosed { player: recipient });
        }
        if !self.players.borrow().contains_key(&recipient) {
            return Err(DeliveryError::UnknownRecipient { player: recipient });
        }
        self.deliveries.borrow_mut().push((recipient, message));
        Ok(())
    }

    fn notify(&self, player: PlayerId, notice: &str) {
        self.notices.borrow_mut().push((player, notice.to_string()));
    }
}
