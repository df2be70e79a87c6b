//! Parley - roleplay proximity chat.
//!
//! Turns a raw chat line into per-recipient rendered messages: classification
//! (speech, emote, OOC, environmental), formatting, in-fiction languages that
//! scramble for listeners who don't know them, and distance-based masking and
//! font sizing. The host game plugs in through the traits in [`host`].

pub mod common;
pub mod config;
pub mod host;
pub mod language;
pub mod pipeline;
pub mod proximity;
pub mod transformers;

pub use pipeline::{PipelineReport, TransformerSystem};
