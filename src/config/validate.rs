//! Configuration validation.
//!
//! Collects every problem into one error so a broken file can be fixed in one pass.
//! Gaps in the per-mode tables are only warned about: they fail the affected
//! messages at runtime instead.

use std::collections::HashSet;

use tracing::warn;

use crate::common::error::ConfigError;
use crate::common::types::ChatMode;
use crate::config::types::Config;
use crate::language::GrantRules;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();
    let chat = &config.chat;

    // Single-character settings
    if chat.mask_char.chars().count() != 1 {
        errors.push(format!(
            "chat.mask_char must be a single character (got '{}')",
            chat.mask_char
        ));
    }
    let d = &chat.delimiters;
    for (key, value) in [
        ("bold", &d.bold),
        ("italic", &d.italic),
        ("quote", &d.quote),
        ("sign_quote", &d.sign_quote),
        ("emote", &d.emote),
    ] {
        if value.chars().count() != 1 {
            errors.push(format!(
                "chat.delimiters.{} must be a single character (got '{}')",
                key, value
            ));
        }
    }
    if d.language_prefix.is_empty() {
        warn!("chat.delimiters.language_prefix is empty; inline language overrides are disabled");
    }

    // Font
    if chat.font.clamp_sizes.is_empty() {
        errors.push("chat.font.clamp_sizes must not be empty".to_string());
    }
    if chat.font.clamp_sizes.contains(&0) {
        errors.push("chat.font.clamp_sizes must not contain 0".to_string());
    }

    // Per-mode tables
    for mode in ChatMode::ALL {
        // Signing is never masked, so a sign onset is ignored.
        let onset = if mode == ChatMode::Sign {
            None
        } else {
            chat.obfuscation_range(mode)
        };
        match (onset, chat.distance(mode)) {
            (Some(onset), Some(range)) if onset >= range => errors.push(format!(
                "chat.obfuscation_ranges.{} ({}) must be below chat.distances.{} ({})",
                mode, onset, mode, range
            )),
            (_, Some(0)) => errors.push(format!("chat.distances.{} must be non-zero", mode)),
            _ => {}
        }
        let gaps: Vec<&str> = [
            ("distances", chat.distance(mode).is_none()),
            (
                "obfuscation_ranges",
                mode != ChatMode::Sign && chat.obfuscation_range(mode).is_none(),
            ),
            ("font_sizes", chat.font_size(mode).is_none()),
            ("verbs", chat.verbs(mode).is_none()),
            ("punctuation", chat.punctuation(mode).is_none()),
        ]
        .into_iter()
        .filter_map(|(table, missing)| missing.then_some(table))
        .collect();
        if !gaps.is_empty() {
            warn!(
                "Chat mode '{}' has no entry in: {} (messages in this mode will fail)",
                mode,
                gaps.join(", ")
            );
        }
    }

    // Languages
    let babble = config.babble.name.to_lowercase();
    if babble.trim().is_empty() {
        errors.push("babble.name is required".to_string());
    }
    if config.babble.syllables.iter().all(|s| s.is_empty()) {
        errors.push("babble.syllables must not be empty".to_string());
    }

    let mut names = HashSet::new();
    let mut prefixes = HashSet::new();
    for (i, language) in config.languages.iter().enumerate() {
        let label = if language.name.is_empty() {
            format!("languages[{}]", i)
        } else {
            format!("languages[{}] ({})", i, language.name)
        };

        if language.name.trim().is_empty() {
            errors.push(format!("{}.name is required", label));
        } else if !names.insert(language.name.to_lowercase()) {
            errors.push(format!("{}.name is a duplicate", label));
        }
        if language.name.to_lowercase() == babble {
            errors.push(format!("{}.name collides with the babble language", label));
        }

        if language.prefix.is_empty() || !language.prefix.chars().all(char::is_alphanumeric) {
            errors.push(format!(
                "{}.prefix must be non-empty and alphanumeric (got '{}')",
                label, language.prefix
            ));
        } else if !prefixes.insert(language.prefix.to_lowercase()) {
            errors.push(format!("{}.prefix '{}' is a duplicate", label, language.prefix));
        }

        if language.syllables.is_empty() || language.syllables.iter().any(|s| s.is_empty()) {
            errors.push(format!("{}.syllables must be non-empty strings", label));
        }

        if let Err(e) = GrantRules::compile(&language.grants) {
            errors.push(format!("{}.grants: {}", label, e));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}
