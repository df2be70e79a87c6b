//! Configuration parsing, environment overrides and validation.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

pub use parser::{load_config, load_config_str};
pub use types::*;
pub use validate::validate_config;

use std::path::Path;

use crate::common::error::ConfigError;

/// Load a config file, apply `PARLEY_*` overrides, then validate.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let config = env::apply_env_overrides(load_config(path)?);
    validate_config(&config)?;
    Ok(config)
}
