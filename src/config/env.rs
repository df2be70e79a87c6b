//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `PARLEY_CONFIG` - Config file path
//! - `PARLEY_REQUIRE_NICKNAME` - `true`/`false`
//! - `PARLEY_MASK_CHAR` - Mask character for distance obfuscation
//! - `PARLEY_SIGN_RANGE` - Sign-language range in blocks

use std::env;

use tracing::warn;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "PARLEY";

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |key| env::var(key).ok())
}

/// Apply overrides using an arbitrary variable lookup.
pub fn apply_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name));

    if let Some(value) = var("REQUIRE_NICKNAME") {
        match parse_bool(&value) {
            Some(flag) => config.chat.require_nickname = flag,
            None => warn!("Ignoring {}_REQUIRE_NICKNAME='{}': not a boolean", ENV_PREFIX, value),
        }
    }

    if let Some(mask) = var("MASK_CHAR") {
        if mask.chars().count() == 1 {
            config.chat.mask_char = mask;
        } else {
            warn!("Ignoring {}_MASK_CHAR='{}': expected a single character", ENV_PREFIX, mask);
        }
    }

    if let Some(range) = var("SIGN_RANGE") {
        match range.parse() {
            Ok(range) => config.chat.ranges.sign_language = range,
            Err(_) => warn!("Ignoring {}_SIGN_RANGE='{}': not a number", ENV_PREFIX, range),
        }
    }

    config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the config file path from environment or use default.
///
/// Checks `PARLEY_CONFIG` environment variable, otherwise returns "parley.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "parley.conf".to_string())
}
