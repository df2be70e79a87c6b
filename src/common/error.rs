//! Error types for the application.

use thiserror::Error;

use crate::common::types::{ChatMode, PlayerId};

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Faults raised by a transformer.
///
/// The orchestrator contains these: the message (or the single recipient fork) ends in
/// the error state and processing of everything else continues.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("No profile for player {player}")]
    MissingProfile { player: PlayerId },

    #[error("No location for player {player}")]
    MissingLocation { player: PlayerId },

    #[error("No {table} entry configured for chat mode '{mode}'")]
    MissingModeConfig { table: &'static str, mode: ChatMode },

    #[error("Language '{name}' is not registered")]
    UnknownLanguage { name: String },

    #[error("Recipient-phase step ran without a receiver")]
    MissingReceiver,
}

/// Delivery failures for a single recipient.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Recipient {player} is not connected")]
    UnknownRecipient { player: PlayerId },

    #[error("Delivery channel for {player} is closed")]
    ChannelClosed { player: PlayerId },
}

/// Result type alias for transformer steps.
pub type TransformResult<T = ()> = std::result::Result<T, TransformError>;

/// Result type alias for delivery.
pub type DeliveryResult<T = ()> = std::result::Result<T, DeliveryError>;
