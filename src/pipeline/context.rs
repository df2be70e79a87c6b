//! Per-message state carried through the transformer chain.

use crate::common::messages::{ChatOrigin, CommandKind, InboundChat};
use crate::common::types::{ChatMode, ChatType, PlayerId};

/// Where a context is in its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Continue,
    /// Benign suppression (validation failure, nothing to send).
    Stop,
    /// Something went wrong; already logged.
    Error,
}

/// Boolean classification of a message. Set once, read by later steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageFlags {
    pub emote: bool,
    pub ooc: bool,
    pub global_ooc: bool,
    pub environmental: bool,
    pub speech: bool,
    /// Sender has roleplay mode on.
    pub roleplay: bool,
    /// Typed into the chat box rather than sent by a command.
    pub player_chat: bool,
    pub from_command: bool,
    /// Markup escaping already happened.
    pub escaped: bool,
    /// Spoken in the fallback language.
    pub babble: bool,
}

impl MessageFlags {
    /// OOC of either reach.
    pub fn is_any_ooc(&self) -> bool {
        self.ooc || self.global_ooc
    }

    /// Whether any kind has been decided.
    pub fn is_classified(&self) -> bool {
        self.emote || self.ooc || self.global_ooc || self.environmental || self.speech
    }
}

/// Typed metadata written along the way. Last write wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageMeta {
    /// Resolved language name.
    pub language: Option<String>,
    pub chat_mode: ChatMode,
    pub chat_type: ChatType,
    /// Sender's name as shown to others.
    pub formatted_name: String,
    /// Speech verb chosen for this message.
    pub verb: Option<String>,
    /// Font size for the receiver.
    pub font_size: Option<u32>,
}

/// Mutable record for one message, or one recipient's copy of it.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageContext {
    pub message: String,
    pub sender: PlayerId,
    /// Unset during the sender phase.
    pub receiver: Option<PlayerId>,
    pub channel: Option<String>,
    pub side_data: Option<String>,
    pub flags: MessageFlags,
    pub meta: MessageMeta,
    pub state: PipelineState,
    /// Filled by recipient determination at the end of the sender phase.
    pub recipients: Vec<PlayerId>,
    /// Private feedback for the sender.
    pub notices: Vec<String>,
}

impl MessageContext {
    /// Context for a fresh chat event. Command-originated messages arrive classified.
    pub fn new(inbound: InboundChat) -> Self {
        let mut flags = MessageFlags::default();
        let mut meta = MessageMeta::default();
        match inbound.origin {
            ChatOrigin::Chat => flags.player_chat = true,
            ChatOrigin::Command(kind) => {
                flags.from_command = true;
                meta.chat_type = match kind {
                    CommandKind::Speech => {
                        flags.speech = true;
                        ChatType::Speech
                    }
                    CommandKind::Emote => {
                        flags.emote = true;
                        ChatType::Emote
                    }
                    CommandKind::Ooc => {
                        flags.ooc = true;
                        ChatType::Ooc
                    }
                    CommandKind::GlobalOoc => {
                        flags.global_ooc = true;
                        ChatType::GlobalOoc
                    }
                    CommandKind::Environmental => {
                        flags.environmental = true;
                        ChatType::Environmental
                    }
                };
            }
        }
        Self {
            message: inbound.text,
            sender: inbound.sender,
            receiver: None,
            channel: inbound.channel,
            side_data: inbound.side_data,
            flags,
            meta,
            state: PipelineState::Continue,
            recipients: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Independent copy for one recipient.
    ///
    /// Recipients and notices belong to the sender-phase context and are not carried.
    pub fn fork(&self, receiver: PlayerId) -> Self {
        Self {
            message: self.message.clone(),
            sender: self.sender,
            receiver: Some(receiver),
            channel: self.channel.clone(),
            side_data: self.side_data.clone(),
            flags: self.flags,
            meta: self.meta.clone(),
            state: PipelineState::Continue,
            recipients: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn is_continue(&self) -> bool {
        self.state == PipelineState::Continue
    }

    /// Suppress the message and tell the sender why.
    pub fn stop_with_notice(&mut self, notice: impl Into<String>) {
        self.notices.push(notice.into());
        self.state = PipelineState::Stop;
    }

    pub fn stop(&mut self) {
        self.state = PipelineState::Stop;
    }

    pub fn fail(&mut self) {
        self.state = PipelineState::Error;
    }

    pub fn notify_sender(&mut self, notice: impl Into<String>) {
        self.notices.push(notice.into());
    }

    /// Whether this fork is being rendered for the speaker themself.
    pub fn is_self_receiver(&self) -> bool {
        self.receiver == Some(self.sender)
    }
}
