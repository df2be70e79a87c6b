//! Channel-backed delivery.
//!
//! Each registered player gets an unbounded mpsc receiver. The pipeline pushes
//! rendered messages and notices into the matching sender; a per-player task on
//! the host side drains it.

use std::cell::RefCell;
use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::common::error::{DeliveryError, DeliveryResult};
use crate::common::messages::OutgoingChat;
use crate::common::types::PlayerId;
use crate::host::ChatSink;

/// What a player receives.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// A rendered chat message.
    Chat(OutgoingChat),
    /// Private feedback from the pipeline.
    Notice(String),
}

/// `ChatSink` over per-player tokio channels.
#[derive(Debug, Default)]
pub struct ChannelSink {
    senders: RefCell<HashMap<PlayerId, mpsc::UnboundedSender<Delivery>>>,
}

impl ChannelSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a channel for `player`, replacing any previous one.
    pub fn register(&self, player: PlayerId) -> mpsc::UnboundedReceiver<Delivery> {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.senders.borrow_mut().insert(player, tx).is_some() {
            debug!(player, "Replaced delivery channel");
        }
        rx
    }

    /// Drop the channel for `player`. The receiving task sees the channel close.
    pub fn unregister(&self, player: PlayerId) -> bool {
        self.senders.borrow_mut().remove(&player).is_some()
    }

    pub fn is_registered(&self, player: PlayerId) -> bool {
        self.senders.borrow().contains_key(&player)
    }

    fn send(&self, player: PlayerId, delivery: Delivery) -> DeliveryResult {
        let senders = self.senders.borrow();
        let tx = senders
            .get(&player)
            .ok_or(DeliveryError::UnknownRecipient { player })?;
        tx.send(delivery)
            .map_err(|_| DeliveryError::ChannelClosed { player })
    }
}

impl ChatSink for ChannelSink {
    fn deliver(&self, recipient: PlayerId, message: OutgoingChat) -> DeliveryResult {
        self.send(recipient, Delivery::Chat(message))
    }

    fn notify(&self, player: PlayerId, notice: &str) {
        if let Err(e) = self.send(player, Delivery::Notice(notice.to_string())) {
            warn!(player, "Failed to deliver notice: {}", e);
        }
    }
}
