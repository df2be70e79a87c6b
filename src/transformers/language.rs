//! Choosing the spoken language and rendering it for each listener.

use tracing::debug;

use crate::common::error::TransformResult;
use crate::common::types::{ChatMode, PlayerProfile};
use crate::language::{render_for, Language, LanguageRegistry};
use crate::pipeline::{MessageContext, PipelineEnv, Transformer};

/// Picks the language for speech and emotes.
///
/// An optional `:prefix ` at the start overrides the sender's current language.
/// A bad override stops the message; a bad current language falls back to babble
/// with a warning to the sender.
pub struct ResolveLanguage;

impl Transformer for ResolveLanguage {
    fn name(&self) -> &'static str {
        "resolve-language"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.speech || ctx.flags.emote
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let profile = env.profile(ctx.sender)?;
        let registry = env.languages;

        let prefixed = split_prefix(&ctx.message, &env.settings.delimiters.language_prefix)
            .map(|(prefix, rest)| (prefix.to_string(), rest.to_string()));

        let language = match prefixed {
            Some((prefix, rest)) => {
                let Some(language) = registry
                    .by_prefix(&prefix)
                    .filter(|l| registry.is_visible_to(&profile, l))
                else {
                    ctx.stop_with_notice(format!("Unknown language '{}'.", prefix));
                    return Ok(());
                };
                if !registry.can_speak(&profile, language) {
                    ctx.stop_with_notice(format!("You don't know how to speak {}.", language.name));
                    return Ok(());
                }
                if rest.is_empty() {
                    ctx.stop();
                    return Ok(());
                }
                ctx.message = rest;
                language
            }
            None => match current_language(registry, &profile) {
                Ok(language) => language,
                Err(notice) => {
                    ctx.notify_sender(notice);
                    registry.babble()
                }
            },
        };

        debug!(sender = ctx.sender, language = %language.name, "Resolved language");
        ctx.flags.babble = registry.is_babble(language);
        ctx.meta.language = Some(language.name.clone());
        if language.is_sign_language {
            ctx.meta.chat_mode = ChatMode::Sign;
        } else if ctx.meta.chat_mode == ChatMode::Sign {
            // Signing mode only makes sense with a sign language.
            ctx.meta.chat_mode = ChatMode::Normal;
        }
        Ok(())
    }
}

/// `(prefix, rest)` for text starting with `<marker><alphanumerics><whitespace>`
/// or consisting only of `<marker><alphanumerics>`.
fn split_prefix<'t>(text: &'t str, marker: &str) -> Option<(&'t str, &'t str)> {
    if marker.is_empty() {
        return None;
    }
    let after = text.strip_prefix(marker)?;
    let end = after
        .find(|c: char| !c.is_alphanumeric())
        .unwrap_or(after.len());
    let (prefix, rest) = after.split_at(end);
    if prefix.is_empty() {
        return None;
    }
    match rest.chars().next() {
        None => Some((prefix, "")),
        Some(c) if c.is_whitespace() => Some((prefix, rest.trim_start())),
        Some(_) => None,
    }
}

/// The sender's selected language, or the notice explaining why it can't be used.
fn current_language<'r>(
    registry: &'r LanguageRegistry,
    profile: &PlayerProfile,
) -> Result<&'r Language, String> {
    let Some(name) = profile.current_language.as_deref() else {
        return Err("You have no language selected, so you babble.".to_string());
    };
    match registry.get(name) {
        Some(language) if registry.is_babble(language) => Ok(language),
        Some(language) if registry.can_speak(profile, language) => Ok(language),
        Some(language) => Err(format!(
            "You no longer know {}, so you babble.",
            language.name
        )),
        None => Err(format!("'{}' is not a language, so you babble.", name)),
    }
}

/// Scrambles speech for listeners who don't know the language.
pub struct RenderLanguage;

impl Transformer for RenderLanguage {
    fn name(&self) -> &'static str {
        "render-language"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.speech && ctx.meta.language.is_some()
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let receiver = env.receiver(ctx)?;
        let Some(language) = env.language(ctx)? else {
            return Ok(());
        };
        let listener = env.profile(receiver)?;
        ctx.message = render_for(
            env.languages,
            language,
            &ctx.message,
            &listener,
            ctx.is_self_receiver(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::messages::{CommandKind, InboundChat};
    use crate::pipeline::PipelineState;
    use crate::transformers::testing::Fixture;

    fn resolved(fixture: &Fixture, text: &str) -> MessageContext {
        let mut ctx = MessageContext::new(InboundChat::command(Fixture::ANN, CommandKind::Speech, text));
        fixture.run(&[&ResolveLanguage], &mut ctx);
        ctx
    }

    #[test]
    fn test_split_prefix() {
        assert_eq!(split_prefix(":el hello", ":"), Some(("el", "hello")));
        assert_eq!(split_prefix(":el", ":"), Some(("el", "")));
        assert_eq!(split_prefix(":) hi", ":"), None);
        assert_eq!(split_prefix(":el, hi", ":"), None);
        assert_eq!(split_prefix("hello", ":"), None);
        assert_eq!(split_prefix(":el hi", ""), None);
    }

    #[test]
    fn test_current_language_used_without_prefix() {
        let fixture = Fixture::new();
        let ctx = resolved(&fixture, "hello");
        assert_eq!(ctx.meta.language.as_deref(), Some("Common"));
        assert!(!ctx.flags.babble);
        assert!(ctx.notices.is_empty());
    }

    #[test]
    fn test_prefix_override() {
        let fixture = Fixture::new();
        fixture.host.update_profile(Fixture::ANN, |p| {
            p.known_languages.insert("Elvish".to_string());
        });
        let ctx = resolved(&fixture, ":el mae govannen");
        assert_eq!(ctx.meta.language.as_deref(), Some("Elvish"));
        assert_eq!(ctx.message, "mae govannen");
    }

    #[test]
    fn test_unknown_prefix_stops_with_notice() {
        let fixture = Fixture::new();
        let ctx = resolved(&fixture, ":zz hello");
        assert_eq!(ctx.state, PipelineState::Stop);
        assert_eq!(ctx.notices.len(), 1);
    }

    #[test]
    fn test_unknown_language_cannot_be_spoken() {
        let fixture = Fixture::new();
        let ctx = resolved(&fixture, ":el hello");
        assert_eq!(ctx.state, PipelineState::Stop);
        assert!(ctx.notices[0].contains("Elvish"));
    }

    #[test]
    fn test_hidden_language_needs_privilege() {
        let fixture = Fixture::new();
        let ctx = resolved(&fixture, ":dr hello");
        assert_eq!(ctx.state, PipelineState::Stop);
        // Hidden languages are reported as unknown, not named.
        assert!(!ctx.notices[0].contains("Draconic"));

        fixture.host.update_profile(Fixture::ANN, |p| p.is_staff = true);
        let ctx = resolved(&fixture, ":dr hello");
        assert!(ctx.is_continue());
        assert_eq!(ctx.meta.language.as_deref(), Some("Draconic"));
    }

    #[test]
    fn test_fallback_to_babble() {
        let fixture = Fixture::new();
        fixture.host.update_profile(Fixture::ANN, |p| p.current_language = Some("Elvish".to_string()));
        let ctx = resolved(&fixture, "hello");
        assert!(ctx.is_continue());
        assert!(ctx.flags.babble);
        assert_eq!(ctx.meta.language.as_deref(), Some("Babble"));
        assert_eq!(ctx.notices.len(), 1);

        fixture.host.update_profile(Fixture::ANN, |p| p.current_language = None);
        let ctx = resolved(&fixture, "hello");
        assert!(ctx.flags.babble);
        assert_eq!(ctx.notices.len(), 1);
    }

    #[test]
    fn test_sign_language_switches_mode() {
        let fixture = Fixture::new();
        fixture.host.update_profile(Fixture::ANN, |p| {
            p.known_languages.insert("Handsign".to_string());
        });
        let ctx = resolved(&fixture, ":hs hello");
        assert_eq!(ctx.meta.chat_mode, ChatMode::Sign);

        let mut ctx = MessageContext::new(InboundChat::command(Fixture::ANN, CommandKind::Speech, "hi"));
        ctx.meta.chat_mode = ChatMode::Sign;
        fixture.run(&[&ResolveLanguage], &mut ctx);
        assert_eq!(ctx.meta.chat_mode, ChatMode::Normal);
    }

    #[test]
    fn test_render_for_listeners() {
        let fixture = Fixture::new();
        let mut base = MessageContext::new(InboundChat::command(Fixture::ANN, CommandKind::Speech, "hello friend"));
        base.meta.language = Some("Elvish".to_string());

        // Bob knows Elvish, Cat doesn't, Ann is the speaker.
        let mut to_ann = base.fork(Fixture::ANN);
        let mut to_bob = base.fork(Fixture::BOB);
        let mut to_cat = base.fork(Fixture::CAT);
        for ctx in [&mut to_ann, &mut to_bob, &mut to_cat] {
            fixture.run(&[&RenderLanguage], ctx);
        }

        assert_eq!(to_ann.message, "hello friend");
        assert_eq!(to_bob.message, "hello friend");
        assert_ne!(to_cat.message, "hello friend");
        assert_eq!(to_cat.message.split(' ').count(), 2);
    }

    #[test]
    fn test_babble_only_readable_by_speaker() {
        let fixture = Fixture::new();
        let mut base = MessageContext::new(InboundChat::command(Fixture::ANN, CommandKind::Speech, "hello"));
        base.meta.language = Some("Babble".to_string());

        let mut to_ann = base.fork(Fixture::ANN);
        let mut to_bob = base.fork(Fixture::BOB);
        fixture.run(&[&RenderLanguage], &mut to_ann);
        fixture.run(&[&RenderLanguage], &mut to_bob);
        assert_eq!(to_ann.message, "hello");
        assert_ne!(to_bob.message, "hello");
    }
}
