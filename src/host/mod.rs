//! Seams to the host game.
//!
//! The pipeline never owns player data, world state or network channels. It reads
//! them through these traits on every message:
//!
//! - `PlayerDirectory`: who is online and their chat-relevant profile
//! - `WorldView`: where players are and which blocks are solid
//! - `ChatSink`: per-player delivery and private sender notices

pub mod channels;
pub mod console;
pub mod memory;

pub use channels::ChannelSink;
pub use memory::MemoryHost;

use crate::common::error::DeliveryResult;
use crate::common::messages::OutgoingChat;
use crate::common::types::{BlockPos, Location, PlayerId, PlayerProfile};

/// Read access to connected players.
pub trait PlayerDirectory {
    /// Connected players, in a stable order.
    fn online_players(&self) -> Vec<PlayerId>;

    /// Current profile snapshot for a player.
    fn profile(&self, player: PlayerId) -> Option<PlayerProfile>;
}

/// Read access to the world.
pub trait WorldView {
    fn location(&self, player: PlayerId) -> Option<Location>;

    /// Whether the block blocks sight.
    fn is_solid(&self, world: &str, pos: BlockPos) -> bool;

    /// Whether a player can walk through the block.
    fn is_passable(&self, world: &str, pos: BlockPos) -> bool {
        !self.is_solid(world, pos)
    }
}

/// Outbound side of the pipeline.
pub trait ChatSink {
    /// Push a rendered message to one recipient.
    fn deliver(&self, recipient: PlayerId, message: OutgoingChat) -> DeliveryResult;

    /// Show a private notice (validation failure, babble warning) to one player.
    fn notify(&self, player: PlayerId, notice: &str);
}
