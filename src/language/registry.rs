//! Language registry and known-language evaluation.
//!
//! Languages come from configuration and are immutable after startup. Whether a
//! player knows a language is evaluated on demand from their profile: default
//! languages are known by everyone, learned languages are listed in the profile, and
//! grant rules match the profile's class, trait, model and model-group codes.

use fancy_regex::Regex;
use tracing::warn;

use crate::common::error::ConfigError;
use crate::common::types::PlayerProfile;
use crate::config::types::{BabbleConfig, Config, GrantConfig, LanguageConfig};

/// An in-fiction language.
#[derive(Debug, Clone)]
pub struct Language {
    pub name: String,
    pub description: String,
    pub prefix: String,
    pub color: String,
    pub syllables: Vec<String>,
    pub is_default: bool,
    pub is_hidden: bool,
    pub is_sign_language: bool,
    pub grants: GrantRules,
}

impl Language {
    fn from_config(config: &LanguageConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.name.clone(),
            description: config.description.clone(),
            prefix: config.prefix.clone(),
            color: config.color.clone(),
            syllables: config.syllables.clone(),
            is_default: config.default,
            is_hidden: config.hidden,
            is_sign_language: config.sign_language,
            grants: GrantRules::compile(&config.grants).map_err(|message| {
                ConfigError::ValidationError {
                    message: format!("language '{}': {}", config.name, message),
                }
            })?,
        })
    }

    fn babble(config: &BabbleConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: "Unintelligible noises".to_string(),
            prefix: String::new(),
            color: config.color.clone(),
            syllables: config.syllables.clone(),
            is_default: false,
            is_hidden: true,
            is_sign_language: false,
            grants: GrantRules::default(),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A `*`/`?` wildcard pattern, matched case-insensitively against the whole input.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    original: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> Result<Self, fancy_regex::Error> {
        Ok(Self {
            original: pattern.to_string(),
            regex: Regex::new(&wildcard_to_regex(pattern))?,
        })
    }

    pub fn matches(&self, input: &str) -> bool {
        self.regex.is_match(input).unwrap_or_else(|e| {
            warn!("Wildcard match error for pattern '{}': {}", self.original, e);
            false
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}

/// Translate a wildcard pattern into an anchored, case-insensitive regex.
pub fn wildcard_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push_str("(?i)^");
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '\\' | '.' | '+' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
    }
    regex.push('$');
    regex
}

/// Compiled auto-grant rules for one language.
#[derive(Debug, Clone, Default)]
pub struct GrantRules {
    classes: Vec<WildcardPattern>,
    traits: Vec<WildcardPattern>,
    models: Vec<WildcardPattern>,
    model_groups: Vec<WildcardPattern>,
}

impl GrantRules {
    /// Compile grant rules, reporting the first invalid pattern.
    pub fn compile(config: &GrantConfig) -> Result<Self, String> {
        let compile = |patterns: &[String]| -> Result<Vec<WildcardPattern>, String> {
            patterns
                .iter()
                .map(|p| {
                    WildcardPattern::new(p)
                        .map_err(|e| format!("invalid grant pattern '{}': {}", p, e))
                })
                .collect()
        };

        Ok(Self {
            classes: compile(&config.classes)?,
            traits: compile(&config.traits)?,
            models: compile(&config.models)?,
            model_groups: compile(&config.model_groups)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.traits.is_empty()
            && self.models.is_empty()
            && self.model_groups.is_empty()
    }

    /// True when any of the profile's codes matches any rule.
    pub fn grants(&self, profile: &PlayerProfile) -> bool {
        let any = |patterns: &[WildcardPattern], code: Option<&str>| {
            code.is_some_and(|code| patterns.iter().any(|p| p.matches(code)))
        };

        any(&self.classes, profile.class_code.as_deref())
            || profile
                .trait_codes
                .iter()
                .any(|code| any(&self.traits, Some(code)))
            || any(&self.models, profile.model_code.as_deref())
            || any(&self.model_groups, profile.model_group.as_deref())
    }
}

/// All configured languages plus the babble fallback.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
    babble: Language,
}

impl LanguageRegistry {
    /// Build the registry from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let languages = config
            .languages
            .iter()
            .map(Language::from_config)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            languages,
            babble: Language::babble(&config.babble),
        })
    }

    /// Configured languages, in configuration order. Babble is not included.
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn babble(&self) -> &Language {
        &self.babble
    }

    pub fn is_babble(&self, language: &Language) -> bool {
        language.is_named(&self.babble.name)
    }

    /// Look a language up by name (case-insensitive), including babble.
    pub fn get(&self, name: &str) -> Option<&Language> {
        if self.babble.is_named(name) {
            return Some(&self.babble);
        }
        self.languages.iter().find(|l| l.is_named(name))
    }

    /// Look a language up by its shorthand prefix (case-insensitive).
    pub fn by_prefix(&self, prefix: &str) -> Option<&Language> {
        self.languages
            .iter()
            .find(|l| l.prefix.eq_ignore_ascii_case(prefix))
    }

    /// Whether the player understands the language.
    ///
    /// Nobody understands babble; only its speaker sees the original text.
    pub fn knows(&self, profile: &PlayerProfile, language: &Language) -> bool {
        if self.is_babble(language) {
            return false;
        }
        language.is_default
            || profile.knows_explicitly(&language.name)
            || language.grants.grants(profile)
    }

    /// Whether the player may speak the language. Staff may speak anything.
    pub fn can_speak(&self, profile: &PlayerProfile, language: &Language) -> bool {
        self.is_babble(language) || profile.is_staff || self.knows(profile, language)
    }

    /// Languages the player may select with a prefix. Hidden languages are only
    /// visible to staff or to players who know them.
    pub fn is_visible_to(&self, profile: &PlayerProfile, language: &Language) -> bool {
        !language.is_hidden || profile.is_staff || self.knows(profile, language)
    }

    /// Every configured language the player knows.
    pub fn known_by<'a>(&'a self, profile: &'a PlayerProfile) -> impl Iterator<Item = &'a Language> {
        self.languages.iter().filter(move |l| self.knows(profile, l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::load_config_str;

    fn registry() -> LanguageRegistry {
        let config = load_config_str(
            r#"
            languages = [
                { name = "Common", prefix = "co", syllables = ["a", "b"], default = true }
                {
                    name = "Elvish"
                    prefix = "el"
                    syllables = ["ae", "lor"]
                    grants { classes = ["elf*"], model_groups = ["sylvan"] }
                }
                { name = "Draconic", prefix = "dr", syllables = ["kra"], hidden = true }
                {
                    name = "Dwarvish"
                    prefix = "dw"
                    syllables = ["khaz"]
                    grants { traits = ["stone?orn"] }
                }
            ]
            "#,
        )
        .unwrap();
        LanguageRegistry::from_config(&config).unwrap()
    }

    #[test]
    fn test_lookup_by_name_and_prefix() {
        let registry = registry();
        assert_eq!(registry.get("elvish").unwrap().prefix, "el");
        assert_eq!(registry.by_prefix("DR").unwrap().name, "Draconic");
        assert!(registry.by_prefix("xx").is_none());
        assert!(registry.get("babble").is_some());
        assert_eq!(registry.languages().len(), 4);
    }

    #[test]
    fn test_default_language_known_by_everyone() {
        let registry = registry();
        let profile = PlayerProfile::new("p");
        let common = registry.get("Common").unwrap();
        assert!(registry.knows(&profile, common));
        assert!(!registry.knows(&profile, registry.get("Elvish").unwrap()));
    }

    #[test]
    fn test_explicit_and_granted_languages() {
        let registry = registry();
        let elvish = registry.get("Elvish").unwrap();
        let dwarvish = registry.get("Dwarvish").unwrap();

        let mut learned = PlayerProfile::new("learner");
        learned.known_languages.insert("ELVISH".to_string());
        assert!(registry.knows(&learned, elvish));

        let mut elf = PlayerProfile::new("elf");
        elf.class_code = Some("ElfRanger".to_string());
        assert!(registry.knows(&elf, elvish));

        let mut sylvan = PlayerProfile::new("sylvan");
        sylvan.model_group = Some("Sylvan".to_string());
        assert!(registry.knows(&sylvan, elvish));

        let mut dwarf = PlayerProfile::new("dwarf");
        dwarf.trait_codes = vec!["brave".to_string(), "stoneborn".to_string()];
        assert!(registry.knows(&dwarf, dwarvish));
        assert!(!registry.knows(&dwarf, elvish));

        let names: Vec<&str> = registry.known_by(&dwarf).map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Common", "Dwarvish"]);
    }

    #[test]
    fn test_babble_spoken_by_all_understood_by_none() {
        let registry = registry();
        let mut staff = PlayerProfile::new("admin");
        staff.is_staff = true;
        let babble = registry.babble();

        assert!(registry.can_speak(&PlayerProfile::new("p"), babble));
        assert!(!registry.knows(&staff, babble));
    }

    #[test]
    fn test_hidden_language_visibility() {
        let registry = registry();
        let draconic = registry.get("Draconic").unwrap();
        let player = PlayerProfile::new("p");
        let mut staff = PlayerProfile::new("admin");
        staff.is_staff = true;

        assert!(!registry.is_visible_to(&player, draconic));
        assert!(registry.is_visible_to(&staff, draconic));
        assert!(registry.can_speak(&staff, draconic));
        assert!(!registry.can_speak(&player, draconic));
    }

    #[test]
    fn test_wildcard_patterns() {
        let pattern = WildcardPattern::new("orc.*").unwrap();
        assert!(pattern.matches("orc.warrior"));
        assert!(pattern.matches("ORC.shaman"));
        assert!(!pattern.matches("orcwarrior"));

        let single = WildcardPattern::new("h?man").unwrap();
        assert!(single.matches("human"));
        assert!(!single.matches("hman"));
        assert_eq!(single.as_str(), "h?man");

        assert_eq!(wildcard_to_regex("a(b)"), r"(?i)^a\(b\)$");
    }
}
