//! Concrete pipeline steps and the standard chain.
//!
//! Sender phase, in order:
//! 1. resolve sender, classify, require nickname
//! 2. escape markup (before any markup is injected)
//! 3. resolve language, pick verb
//! 4. capitalize, punctuate, accent markup
//! 5. OOC / environmental wrapping
//! 6. recipient determination (always last)
//!
//! Recipient phase: language rendering, distance masking, font sizing, then
//! emote and speech framing.

pub mod classify;
pub mod format;
pub mod language;
pub mod proximity;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{ClassifyMessage, EscapeMarkup, RequireNickname, ResolveSender};
pub use format::{
    AccentMarkup, Capitalize, FormatEmote, FormatEnvironmental, FormatOoc, FrameSpeech, PickVerb,
    Punctuate,
};
pub use language::{RenderLanguage, ResolveLanguage};
pub use proximity::{DetermineRecipients, ObfuscateSpeech, ScaleFont};

use crate::pipeline::Transformer;

/// Standard sender-phase steps.
pub fn sender_phase() -> Vec<Box<dyn Transformer>> {
    vec![
        Box::new(ResolveSender),
        Box::new(ClassifyMessage),
        Box::new(RequireNickname),
        Box::new(EscapeMarkup),
        Box::new(ResolveLanguage),
        Box::new(PickVerb),
        Box::new(Capitalize),
        Box::new(Punctuate),
        Box::new(AccentMarkup),
        Box::new(FormatOoc),
        Box::new(FormatEnvironmental),
        Box::new(DetermineRecipients),
    ]
}

/// Standard recipient-phase steps.
pub fn recipient_phase() -> Vec<Box<dyn Transformer>> {
    vec![
        Box::new(RenderLanguage),
        Box::new(ObfuscateSpeech),
        Box::new(ScaleFont),
        Box::new(FormatEmote),
        Box::new(FrameSpeech),
    ]
}
