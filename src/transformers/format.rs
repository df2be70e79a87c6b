//! Text formatting: capitalization, punctuation, markup and framing.
//!
//! Sender-phase steps work on the shared text; `FormatEmote` and `FrameSpeech`
//! run per recipient because they embed language-rendered speech.

use rand::seq::SliceRandom;

use crate::common::error::{TransformError, TransformResult};
use crate::common::text::is_punctuation;
use crate::language::render_for;
use crate::pipeline::{MessageContext, PipelineEnv, Transformer};

/// Draws the speech verb for the message from the chat mode's list.
pub struct PickVerb;

impl Transformer for PickVerb {
    fn name(&self) -> &'static str {
        "pick-verb"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.speech
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let mode = ctx.meta.chat_mode;
        let verb = env
            .settings
            .verbs(mode)
            .and_then(|verbs| verbs.choose(&mut rand::thread_rng()))
            .ok_or(TransformError::MissingModeConfig {
                table: "verbs",
                mode,
            })?;
        ctx.meta.verb = Some(verb.clone());
        Ok(())
    }
}

/// Uppercases the first content character of speech and narration.
pub struct Capitalize;

impl Transformer for Capitalize {
    fn name(&self) -> &'static str {
        "capitalize"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.speech || ctx.flags.environmental
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        if env.settings.auto_capitalize {
            let skip = env.settings.delimiters.formatting_chars();
            ctx.message = capitalize_content(&ctx.message, &skip);
        }
        Ok(())
    }
}

fn capitalize_content(text: &str, skip: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut done = false;
    for c in text.chars() {
        if !done && !c.is_whitespace() && !skip.contains(&c) {
            out.extend(c.to_uppercase());
            done = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Ends in-character text with punctuation when the player left it off.
pub struct Punctuate;

impl Transformer for Punctuate {
    fn name(&self) -> &'static str {
        "punctuate"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.speech || ctx.flags.emote || ctx.flags.environmental
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        if !env.settings.auto_punctuate {
            return Ok(());
        }
        let mark = if ctx.flags.speech {
            let mode = ctx.meta.chat_mode;
            env.settings
                .punctuation(mode)
                .ok_or(TransformError::MissingModeConfig {
                    table: "punctuation",
                    mode,
                })?
        } else {
            "."
        };
        let skip = env.settings.delimiters.formatting_chars();
        ctx.message = punctuate(&ctx.message, &skip, mark);
        Ok(())
    }
}

fn punctuate(text: &str, skip: &[char], mark: &str) -> String {
    let text = text.trim_end();
    let last = text
        .chars()
        .rev()
        .find(|c| !c.is_whitespace() && !skip.contains(c));
    match last {
        Some(c) if !is_punctuation(c) => format!("{}{}", text, mark),
        _ => text.to_string(),
    }
}

/// `|text|` becomes italic and `+text+` bold. An unpaired delimiter runs to the end.
pub struct AccentMarkup;

impl Transformer for AccentMarkup {
    fn name(&self) -> &'static str {
        "accent-markup"
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let d = &env.settings.delimiters;
        let italic = wrap_pairs(&ctx.message, d.italic_char(), "<i>", "</i>");
        ctx.message = wrap_pairs(&italic, d.bold_char(), "<strong>", "</strong>");
        Ok(())
    }
}

fn wrap_pairs(text: &str, delimiter: char, open: &str, close: &str) -> String {
    if !text.contains(delimiter) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 16);
    let mut inside = false;
    for c in text.chars() {
        if c == delimiter {
            out.push_str(if inside { close } else { open });
            inside = !inside;
        } else {
            out.push(c);
        }
    }
    if inside {
        out.push_str(close);
    }
    out
}

/// `(OOC) Name: text` and `(GOOC) Name: text` in the theme colors.
pub struct FormatOoc;

impl Transformer for FormatOoc {
    fn name(&self) -> &'static str {
        "format-ooc"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.is_any_ooc()
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let theme = &env.settings.theme;
        let (tag, color) = if ctx.flags.global_ooc {
            ("GOOC", &theme.global_ooc)
        } else {
            ("OOC", &theme.ooc)
        };
        ctx.message = format!(
            "<font color=\"{}\">({}) {}: {}</font>",
            color, tag, ctx.meta.formatted_name, ctx.message
        );
        Ok(())
    }
}

/// Environmental narration: italic, theme colored, no speaker name.
pub struct FormatEnvironmental;

impl Transformer for FormatEnvironmental {
    fn name(&self) -> &'static str {
        "format-environmental"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.environmental
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        ctx.message = format!(
            "<font color=\"{}\"><i>{}</i></font>",
            env.settings.theme.environmental, ctx.message
        );
        Ok(())
    }
}

/// Renders an emote for one receiver.
///
/// Text between quote characters is speech in the message's language and is
/// rendered (possibly scrambled) for the receiver; the rest is narration.
pub struct FormatEmote;

impl Transformer for FormatEmote {
    fn name(&self) -> &'static str {
        "format-emote"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.emote
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let receiver = env.receiver(ctx)?;
        let language = env.language(ctx)?;
        let listener = env.profile(receiver)?;
        let settings = env.settings;
        let quote = settings.delimiters.quote_char();

        let (color, shown_quote) = match language {
            Some(l) if l.is_sign_language => (l.color.as_str(), settings.delimiters.sign_quote_char()),
            Some(l) => (l.color.as_str(), quote),
            None => (settings.theme.name.as_str(), quote),
        };

        let mut body = String::with_capacity(ctx.message.len() + 32);
        for (i, part) in ctx.message.split(quote).enumerate() {
            if i % 2 == 0 {
                body.push_str(part);
                continue;
            }
            let spoken = match language {
                Some(l) => render_for(env.languages, l, part, &listener, ctx.is_self_receiver()),
                None => part.to_string(),
            };
            body.push(shown_quote);
            body.push_str(&format!("<font color=\"{}\">{}</font>", color, spoken));
            body.push(shown_quote);
        }

        ctx.message = format!(
            "<font color=\"{}\">{} {}</font>",
            settings.theme.emote, ctx.meta.formatted_name, body
        );
        Ok(())
    }
}

/// `Name verb, "<font color=.. size=..>body</font>"` for one receiver.
pub struct FrameSpeech;

impl Transformer for FrameSpeech {
    fn name(&self) -> &'static str {
        "frame-speech"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.speech
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let language = env.language(ctx)?;
        let delimiters = &env.settings.delimiters;

        let (color, quote) = match language {
            Some(l) if l.is_sign_language => (l.color.as_str(), delimiters.sign_quote_char()),
            Some(l) => (l.color.as_str(), delimiters.quote_char()),
            None => (env.settings.theme.name.as_str(), delimiters.quote_char()),
        };
        let size = ctx
            .meta
            .font_size
            .map(|s| format!(" size=\"{}\"", s))
            .unwrap_or_default();
        let verb = ctx.meta.verb.as_deref().unwrap_or("says");

        ctx.message = format!(
            "{} {}, {}<font color=\"{}\"{}>{}</font>{}",
            ctx.meta.formatted_name, verb, quote, color, size, ctx.message, quote
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::messages::{CommandKind, InboundChat};
    use crate::common::types::ChatMode;
    use crate::pipeline::PipelineState;
    use crate::transformers::testing::Fixture;

    const SKIP: [char; 5] = ['+', '|', '"', '\'', '*'];

    fn speech(text: &str) -> MessageContext {
        let mut ctx = MessageContext::new(InboundChat::command(Fixture::ANN, CommandKind::Speech, text));
        ctx.meta.formatted_name = "Ann".to_string();
        ctx
    }

    #[test]
    fn test_capitalize_skips_delimiters() {
        assert_eq!(capitalize_content("hello world", &SKIP), "Hello world");
        assert_eq!(capitalize_content("  |oh| no", &SKIP), "  |Oh| no");
        assert_eq!(capitalize_content("+\"yes\"+", &SKIP), "+\"Yes\"+");
        assert_eq!(capitalize_content("", &SKIP), "");
    }

    #[test]
    fn test_punctuate() {
        assert_eq!(punctuate("hello world", &SKIP, "."), "hello world.");
        assert_eq!(punctuate("really?", &SKIP, "."), "really?");
        assert_eq!(punctuate("|quiet|  ", &SKIP, "..."), "|quiet|...");
        assert_eq!(punctuate("waves \"hi!\"", &SKIP, "."), "waves \"hi!\"");
        assert_eq!(punctuate("+++", &SKIP, "."), "+++");
    }

    #[test]
    fn test_punctuation_by_mode() {
        let fixture = Fixture::new();
        let mut ctx = speech("hey");
        ctx.meta.chat_mode = ChatMode::Yell;
        fixture.run(&[&Punctuate], &mut ctx);
        assert_eq!(ctx.message, "hey!");

        let mut ctx = MessageContext::new(InboundChat::command(Fixture::ANN, CommandKind::Emote, "nods"));
        ctx.meta.chat_mode = ChatMode::Yell;
        fixture.run(&[&Punctuate], &mut ctx);
        assert_eq!(ctx.message, "nods.");
    }

    #[test]
    fn test_missing_mode_entry_is_error() {
        let mut fixture = Fixture::new();
        fixture.settings.punctuation.remove("whisper");
        fixture.settings.verbs.remove("whisper");

        let mut ctx = speech("psst");
        ctx.meta.chat_mode = ChatMode::Whisper;
        fixture.run(&[&Punctuate], &mut ctx);
        assert_eq!(ctx.state, PipelineState::Error);

        let mut ctx = speech("psst");
        ctx.meta.chat_mode = ChatMode::Whisper;
        fixture.run(&[&PickVerb], &mut ctx);
        assert_eq!(ctx.state, PipelineState::Error);
    }

    #[test]
    fn test_toggles_disable_formatting() {
        let mut fixture = Fixture::new();
        fixture.settings.auto_capitalize = false;
        fixture.settings.auto_punctuate = false;
        let mut ctx = speech("hello world");
        fixture.run(&[&Capitalize, &Punctuate], &mut ctx);
        assert_eq!(ctx.message, "hello world");
    }

    #[test]
    fn test_pick_verb_from_mode_list() {
        let fixture = Fixture::new();
        let mut ctx = speech("hi");
        ctx.meta.chat_mode = ChatMode::Yell;
        fixture.run(&[&PickVerb], &mut ctx);
        let verb = ctx.meta.verb.unwrap();
        assert!(verb == "yells" || verb == "shouts", "{}", verb);
    }

    #[test]
    fn test_accent_markup() {
        assert_eq!(wrap_pairs("a |b| c", '|', "<i>", "</i>"), "a <i>b</i> c");
        assert_eq!(wrap_pairs("a |b c", '|', "<i>", "</i>"), "a <i>b c</i>");
        assert_eq!(wrap_pairs("plain", '|', "<i>", "</i>"), "plain");

        let fixture = Fixture::new();
        let mut ctx = speech("|very| +loud+ words");
        fixture.run(&[&AccentMarkup], &mut ctx);
        assert_eq!(ctx.message, "<i>very</i> <strong>loud</strong> words");
    }

    #[test]
    fn test_ooc_formats() {
        let fixture = Fixture::new();
        let mut ctx = MessageContext::new(InboundChat::command(Fixture::ANN, CommandKind::Ooc, "brb"));
        ctx.meta.formatted_name = "Ann".to_string();
        fixture.run(&[&FormatOoc], &mut ctx);
        assert!(ctx.message.contains("(OOC) Ann: brb"));
        assert!(ctx.message.contains(&fixture.settings.theme.ooc));

        let mut ctx = MessageContext::new(InboundChat::command(Fixture::ANN, CommandKind::GlobalOoc, "hi all"));
        ctx.meta.formatted_name = "Ann".to_string();
        fixture.run(&[&FormatOoc], &mut ctx);
        assert!(ctx.message.contains("(GOOC) Ann: hi all"));
    }

    #[test]
    fn test_environmental_has_no_name() {
        let fixture = Fixture::new();
        let mut ctx = MessageContext::new(InboundChat::command(Fixture::ANN, CommandKind::Environmental, "Thunder rolls."));
        ctx.meta.formatted_name = "Ann".to_string();
        fixture.run(&[&FormatEnvironmental], &mut ctx);
        assert!(ctx.message.contains("<i>Thunder rolls.</i>"));
        assert!(!ctx.message.contains("Ann"));
    }

    #[test]
    fn test_emote_renders_quoted_speech_per_listener() {
        let fixture = Fixture::new();
        let mut base = MessageContext::new(InboundChat::command(
            Fixture::ANN,
            CommandKind::Emote,
            "bows. \"well met\" she says.",
        ));
        base.meta.formatted_name = "Ann".to_string();
        base.meta.language = Some("Elvish".to_string());

        let mut to_bob = base.fork(Fixture::BOB);
        let mut to_cat = base.fork(Fixture::CAT);
        fixture.run(&[&FormatEmote], &mut to_bob);
        fixture.run(&[&FormatEmote], &mut to_cat);

        assert!(to_bob.message.contains("Ann bows. \"<font"));
        assert!(to_bob.message.contains(">well met</font>\" she says."));
        assert!(to_cat.message.contains("Ann bows. \""));
        assert!(!to_cat.message.contains("well met"));
        assert!(to_cat.message.contains("\" she says."));
    }

    #[test]
    fn test_frame_speech() {
        let fixture = Fixture::new();
        let mut ctx = speech("Hello world.").fork(Fixture::BOB);
        ctx.meta.language = Some("Common".to_string());
        ctx.meta.verb = Some("says".to_string());
        ctx.meta.font_size = Some(16);
        fixture.run(&[&FrameSpeech], &mut ctx);
        assert_eq!(
            ctx.message,
            "Ann says, \"<font color=\"#FFFFFF\" size=\"16\">Hello world.</font>\""
        );
    }

    #[test]
    fn test_frame_sign_language_uses_sign_quotes() {
        let fixture = Fixture::new();
        let mut ctx = speech("Hi.").fork(Fixture::BOB);
        ctx.meta.language = Some("Handsign".to_string());
        ctx.meta.verb = Some("signs".to_string());
        fixture.run(&[&FrameSpeech], &mut ctx);
        assert!(ctx.message.starts_with("Ann signs, '<font"));
        assert!(ctx.message.ends_with("Hi.</font>'"));
        assert!(!ctx.message.contains("size="));
    }
}
