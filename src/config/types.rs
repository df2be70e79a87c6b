//! Configuration type definitions.

use std::collections::HashMap;

use serde::Deserialize;

use crate::common::types::ChatMode;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chat: ChatConfig,
    pub languages: Vec<LanguageConfig>,
    pub babble: BabbleConfig,
}

/// Chat behaviour: per-mode tables, toggles, delimiters and theme.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub auto_capitalize: bool,
    pub auto_punctuate: bool,
    /// Refuse roleplay messages from players without a nickname.
    pub require_nickname: bool,
    /// Character substituted for masked characters at a distance.
    pub mask_char: String,
    /// Hearing range per chat mode (Manhattan blocks, exclusive).
    pub distances: HashMap<String, u32>,
    /// Distance at which masking begins, per chat mode.
    pub obfuscation_ranges: HashMap<String, u32>,
    /// Font size at zero distance, per chat mode.
    pub font_sizes: HashMap<String, u32>,
    /// Speech verbs per chat mode ("says", "yells", ...).
    pub verbs: HashMap<String, Vec<String>>,
    /// Terminal punctuation appended per chat mode.
    pub punctuation: HashMap<String, String>,
    pub ranges: RangesConfig,
    pub font: FontConfig,
    pub delimiters: DelimiterConfig,
    pub theme: ThemeConfig,
    pub proximity: ProximityConfig,
}

impl ChatConfig {
    pub fn distance(&self, mode: ChatMode) -> Option<u32> {
        self.distances.get(mode.key()).copied()
    }

    pub fn obfuscation_range(&self, mode: ChatMode) -> Option<u32> {
        self.obfuscation_ranges.get(mode.key()).copied()
    }

    pub fn font_size(&self, mode: ChatMode) -> Option<u32> {
        self.font_sizes.get(mode.key()).copied()
    }

    pub fn verbs(&self, mode: ChatMode) -> Option<&[String]> {
        self.verbs
            .get(mode.key())
            .map(Vec::as_slice)
            .filter(|v| !v.is_empty())
    }

    pub fn punctuation(&self, mode: ChatMode) -> Option<&str> {
        self.punctuation.get(mode.key()).map(String::as_str)
    }

    pub fn mask_char(&self) -> char {
        self.mask_char.chars().next().unwrap_or('*')
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        fn table<T: Clone, const N: usize>(entries: [(&str, T); N]) -> HashMap<String, T> {
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect()
        }

        Self {
            auto_capitalize: true,
            auto_punctuate: true,
            require_nickname: false,
            mask_char: "*".to_string(),
            distances: table([("whisper", 6), ("normal", 35), ("yell", 70), ("sign", 35)]),
            // Sign language is seen, not heard: no masking onset.
            obfuscation_ranges: table([("whisper", 3), ("normal", 15), ("yell", 40)]),
            font_sizes: table([("whisper", 12), ("normal", 16), ("yell", 30), ("sign", 16)]),
            verbs: table([
                ("whisper", vec!["whispers".to_string()]),
                ("normal", vec!["says".to_string()]),
                ("yell", vec!["yells".to_string(), "shouts".to_string()]),
                ("sign", vec!["signs".to_string()]),
            ]),
            punctuation: table([
                ("whisper", "...".to_string()),
                ("normal", ".".to_string()),
                ("yell", "!".to_string()),
                ("sign", ".".to_string()),
            ]),
            ranges: RangesConfig::default(),
            font: FontConfig::default(),
            delimiters: DelimiterConfig::default(),
            theme: ThemeConfig::default(),
            proximity: ProximityConfig::default(),
        }
    }
}

/// Ranges that are not tied to a chat mode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RangesConfig {
    /// Range for sign-language messages (line of sight also required).
    pub sign_language: u32,
    /// Range for local out-of-character chat.
    pub ooc: u32,
    /// Range for environmental narration.
    pub environmental: u32,
}

impl Default for RangesConfig {
    fn default() -> Self {
        Self {
            sign_language: 12,
            ooc: 35,
            environmental: 35,
        }
    }
}

/// Font size clamping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Sizes rendered fonts snap to. Order in the file does not matter.
    pub clamp_sizes: Vec<u32>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            clamp_sizes: vec![6, 12, 16, 30],
        }
    }
}

/// Delimiters recognised in raw chat text.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DelimiterConfig {
    pub emote: String,
    pub ooc: String,
    pub ooc_close: String,
    pub global_ooc: String,
    pub global_ooc_close: String,
    pub environmental: String,
    pub bold: String,
    pub italic: String,
    pub quote: String,
    pub sign_quote: String,
    /// Marks an inline language override (`:el hello`).
    pub language_prefix: String,
}

impl DelimiterConfig {
    pub fn bold_char(&self) -> char {
        first_char(&self.bold, '+')
    }

    pub fn italic_char(&self) -> char {
        first_char(&self.italic, '|')
    }

    pub fn quote_char(&self) -> char {
        first_char(&self.quote, '"')
    }

    pub fn sign_quote_char(&self) -> char {
        first_char(&self.sign_quote, '\'')
    }

    pub fn emote_char(&self) -> char {
        first_char(&self.emote, '*')
    }

    /// Characters that are formatting delimiters rather than content.
    pub fn formatting_chars(&self) -> [char; 5] {
        [
            self.bold_char(),
            self.italic_char(),
            self.quote_char(),
            self.sign_quote_char(),
            self.emote_char(),
        ]
    }
}

impl Default for DelimiterConfig {
    fn default() -> Self {
        Self {
            emote: "*".to_string(),
            ooc: "(".to_string(),
            ooc_close: ")".to_string(),
            global_ooc: "((".to_string(),
            global_ooc_close: "))".to_string(),
            environmental: "!".to_string(),
            bold: "+".to_string(),
            italic: "|".to_string(),
            quote: "\"".to_string(),
            sign_quote: "'".to_string(),
            language_prefix: ":".to_string(),
        }
    }
}

fn first_char(s: &str, fallback: char) -> char {
    s.chars().next().unwrap_or(fallback)
}

/// Colors for the rendered message kinds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,
    pub ooc: String,
    pub global_ooc: String,
    pub environmental: String,
    pub emote: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "#FFFFFF".to_string(),
            ooc: "#9A9A9A".to_string(),
            global_ooc: "#7FB2E5".to_string(),
            environmental: "#D8C28A".to_string(),
            emote: "#E0E0E0".to_string(),
        }
    }
}

/// Recipient-selection options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Also require a walkable path (through passable blocks) shorter than the range.
    pub require_walkable_path: bool,
}

/// One configured in-fiction language.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Shorthand used in `:prefix` overrides and commands.
    pub prefix: String,
    #[serde(default = "default_language_color")]
    pub color: String,
    pub syllables: Vec<String>,
    /// Known by everyone.
    #[serde(default)]
    pub default: bool,
    /// Only usable by staff unless learned.
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub sign_language: bool,
    #[serde(default)]
    pub grants: GrantConfig,
}

fn default_language_color() -> String {
    "#FFFFFF".to_string()
}

/// Player attributes that automatically grant a language. Patterns accept `*` and `?`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GrantConfig {
    pub classes: Vec<String>,
    pub traits: Vec<String>,
    pub models: Vec<String>,
    pub model_groups: Vec<String>,
}

/// Fallback pseudo-language.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BabbleConfig {
    pub name: String,
    pub color: String,
    pub syllables: Vec<String>,
}

impl Default for BabbleConfig {
    fn default() -> Self {
        Self {
            name: "Babble".to_string(),
            color: "#AAAAAA".to_string(),
            syllables: ["ba", "bu", "ga", "gu", "ma", "mu", "da", "du", "wa", "ah"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
