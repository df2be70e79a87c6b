//! Sender lookup, classification and input sanitizing.

use tracing::debug;

use crate::common::error::TransformResult;
use crate::common::text::escape_markup;
use crate::common::types::ChatType;
use crate::pipeline::{MessageContext, PipelineEnv, Transformer};

/// Loads the sender's profile into the context and drops empty messages.
pub struct ResolveSender;

impl Transformer for ResolveSender {
    fn name(&self) -> &'static str {
        "resolve-sender"
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let profile = env.profile(ctx.sender)?;

        let trimmed = ctx.message.trim();
        if trimmed.is_empty() {
            ctx.stop();
            return Ok(());
        }
        if trimmed.len() != ctx.message.len() {
            ctx.message = trimmed.to_string();
        }

        ctx.meta.formatted_name = profile.display_name().to_string();
        ctx.meta.chat_mode = profile.chat_mode;
        ctx.flags.roleplay = profile.roleplay;
        Ok(())
    }
}

/// Decides the message kind from its leading sigil.
///
/// `((` global OOC, `(` local OOC, `*` emote, `!` environmental. Without a sigil
/// the message is speech in roleplay mode and local OOC otherwise.
pub struct ClassifyMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Speech,
    Emote,
    Ooc,
    GlobalOoc,
    Environmental,
}

impl Transformer for ClassifyMessage {
    fn name(&self) -> &'static str {
        "classify"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.player_chat && !ctx.flags.is_classified()
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let d = &env.settings.delimiters;
        let text = ctx.message.as_str();

        let (kind, body) = if let Some(rest) = strip_sigil(text, &d.global_ooc) {
            (Kind::GlobalOoc, strip_close(rest, &d.global_ooc_close))
        } else if let Some(rest) = strip_sigil(text, &d.ooc) {
            (Kind::Ooc, strip_close(rest, &d.ooc_close))
        } else if let Some(rest) = strip_sigil(text, &d.emote) {
            (Kind::Emote, rest)
        } else if let Some(rest) = strip_sigil(text, &d.environmental) {
            (Kind::Environmental, rest)
        } else if ctx.flags.roleplay {
            (Kind::Speech, text)
        } else {
            (Kind::Ooc, text)
        };

        if body.is_empty() {
            ctx.stop();
            return Ok(());
        }
        ctx.message = body.to_string();

        debug!(sender = ctx.sender, ?kind, "Classified message");
        ctx.meta.chat_type = match kind {
            Kind::Speech => {
                ctx.flags.speech = true;
                ChatType::Speech
            }
            Kind::Emote => {
                ctx.flags.emote = true;
                ChatType::Emote
            }
            Kind::Ooc => {
                ctx.flags.ooc = true;
                ChatType::Ooc
            }
            Kind::GlobalOoc => {
                ctx.flags.global_ooc = true;
                ChatType::GlobalOoc
            }
            Kind::Environmental => {
                ctx.flags.environmental = true;
                ChatType::Environmental
            }
        };
        Ok(())
    }
}

fn strip_sigil<'t>(text: &'t str, sigil: &str) -> Option<&'t str> {
    if sigil.is_empty() {
        return None;
    }
    text.strip_prefix(sigil).map(str::trim_start)
}

fn strip_close<'t>(text: &'t str, close: &str) -> &'t str {
    let text = text.trim_end();
    if close.is_empty() {
        return text;
    }
    text.strip_suffix(close).unwrap_or(text).trim_end()
}

/// Refuses in-character messages from players without a character name.
pub struct RequireNickname;

impl Transformer for RequireNickname {
    fn name(&self) -> &'static str {
        "require-nickname"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.is_classified() && !ctx.flags.is_any_ooc()
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        if !env.settings.require_nickname {
            return Ok(());
        }
        let profile = env.profile(ctx.sender)?;
        if !profile.has_nickname() {
            ctx.stop_with_notice("You need a character name before speaking in character.");
        }
        Ok(())
    }
}

/// Neutralizes angle brackets typed by the player. Runs once per message.
pub struct EscapeMarkup;

impl Transformer for EscapeMarkup {
    fn name(&self) -> &'static str {
        "escape-markup"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        !ctx.flags.escaped
    }

    fn apply(&self, ctx: &mut MessageContext, _env: &PipelineEnv<'_>) -> TransformResult {
        ctx.message = escape_markup(&ctx.message);
        ctx.flags.escaped = true;
        Ok(())
    }
}
