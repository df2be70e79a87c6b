//! Canonical message types entering and leaving the pipeline.

use serde::Serialize;

use crate::common::types::{ChatType, PlayerId};

/// How a message entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatOrigin {
    /// Typed into the chat box; the leading sigil decides the kind.
    #[default]
    Chat,
    /// Sent through a chat command that already decided the kind (`/me`, `/ooc`, ...).
    Command(CommandKind),
}

/// Message kind chosen by a chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Speech,
    Emote,
    Ooc,
    GlobalOoc,
    Environmental,
}

/// Raw chat event handed over by the host's chat dispatcher.
#[derive(Debug, Clone)]
pub struct InboundChat {
    pub sender: PlayerId,
    pub text: String,
    /// Host channel / group identifier, passed through to delivery.
    pub channel: Option<String>,
    /// Opaque host data, passed through to delivery.
    pub side_data: Option<String>,
    pub origin: ChatOrigin,
}

impl InboundChat {
    /// A plain chat-box line.
    pub fn chat(sender: PlayerId, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            channel: None,
            side_data: None,
            origin: ChatOrigin::Chat,
        }
    }

    /// A line sent through a chat command.
    pub fn command(sender: PlayerId, kind: CommandKind, text: impl Into<String>) -> Self {
        Self {
            origin: ChatOrigin::Command(kind),
            ..Self::chat(sender, text)
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_side_data(mut self, side_data: impl Into<String>) -> Self {
        self.side_data = Some(side_data.into());
        self
    }
}

/// Rendered message for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingChat {
    pub sender: PlayerId,
    pub text: String,
    pub chat_type: ChatType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}
