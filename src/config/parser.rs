//! Configuration file parsing (HOCON format).
//!
//! The file is read up front so a missing or unreadable file surfaces as the real
//! `io::Error`; HOCON errors are prefixed with where the text came from.

use std::fs;
use std::path::Path;

use hocon::HoconLoader;
use tracing::debug;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "Read config file");
    parse(&content, &path.display().to_string())
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    parse(content, "<string>")
}

fn parse(content: &str, origin: &str) -> Result<Config, ConfigError> {
    let parse_error = |e: hocon::Error| ConfigError::ParseError {
        message: format!("{}: {}", origin, e),
    };
    HoconLoader::new()
        .load_str(content)
        .map_err(parse_error)?
        .resolve()
        .map_err(parse_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ChatMode;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = load_config_str(
            r#"
            chat {
                require_nickname = true
                distances { normal = 20 }
            }
            "#,
        )
        .unwrap();

        assert!(config.chat.require_nickname);
        assert!(config.chat.auto_capitalize);
        assert_eq!(config.chat.distance(ChatMode::Normal), Some(20));
        // A table given in the file replaces the default table entirely.
        assert_eq!(config.chat.distance(ChatMode::Yell), None);
        assert_eq!(config.chat.ranges.sign_language, 12);
        assert_eq!(config.babble.name, "Babble");
    }

    #[test]
    fn test_languages_parse() {
        let config = load_config_str(
            r##"
            languages = [
                {
                    name = "Elvish"
                    prefix = "el"
                    color = "#88FF88"
                    syllables = ["ae", "lor", "thil"]
                    grants { classes = ["elf*"] }
                }
                {
                    name = "Handtalk"
                    prefix = "ht"
                    syllables = ["~"]
                    sign_language = true
                }
            ]
            "##,
        )
        .unwrap();

        assert_eq!(config.languages.len(), 2);
        let elvish = &config.languages[0];
        assert_eq!(elvish.prefix, "el");
        assert_eq!(elvish.syllables, vec!["ae", "lor", "thil"]);
        assert_eq!(elvish.grants.classes, vec!["elf*"]);
        assert!(!elvish.default);
        assert!(config.languages[1].sign_language);
        assert_eq!(config.languages[1].color, "#FFFFFF");
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = load_config_str("chat {}").unwrap();
        assert!(config.languages.is_empty());
        assert_eq!(config.chat.mask_char(), '*');
        assert_eq!(config.chat.punctuation(ChatMode::Yell), Some("!"));
    }

    #[test]
    fn test_missing_file_keeps_io_error() {
        let path = std::env::temp_dir().join("parley-missing-config.conf");
        match load_config(&path) {
            Err(ConfigError::IoError { path: shown, source }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
                assert!(shown.ends_with("parley-missing-config.conf"));
            }
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_names_its_origin() {
        let path = std::env::temp_dir().join(format!("parley-broken-{}.conf", std::process::id()));
        fs::write(&path, "chat { distances { normal = [ }").unwrap();
        let result = load_config(&path);
        fs::remove_file(&path).unwrap();

        match result {
            Err(ConfigError::ParseError { message }) => {
                assert!(message.starts_with(&path.display().to_string()), "{}", message);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(matches!(
            load_config_str("chat { mask_char = [ }"),
            Err(ConfigError::ParseError { message }) if message.starts_with("<string>")
        ));
    }
}
