//! The transformer seam and the read-only environment each step sees.

use crate::common::error::{TransformError, TransformResult};
use crate::common::types::{ChatMode, Location, PlayerId, PlayerProfile};
use crate::config::types::ChatConfig;
use crate::host::{PlayerDirectory, WorldView};
use crate::language::{Language, LanguageRegistry};

use super::context::MessageContext;

/// One step of the chain.
///
/// `apply` mutates the context in place. User-facing problems set the state to
/// `Stop` (usually with a notice); faults are returned as `Err` and contained by
/// the orchestrator.
pub trait Transformer {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this step has anything to do for the context.
    fn should_apply(&self, _ctx: &MessageContext) -> bool {
        true
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult;
}

/// Settings, languages and host views for one message.
#[derive(Clone, Copy)]
pub struct PipelineEnv<'a> {
    pub settings: &'a ChatConfig,
    pub languages: &'a LanguageRegistry,
    pub players: &'a dyn PlayerDirectory,
    pub world: &'a dyn WorldView,
}

impl<'a> PipelineEnv<'a> {
    pub fn profile(&self, player: PlayerId) -> TransformResult<PlayerProfile> {
        self.players
            .profile(player)
            .ok_or(TransformError::MissingProfile { player })
    }

    pub fn location(&self, player: PlayerId) -> TransformResult<Location> {
        self.world
            .location(player)
            .ok_or(TransformError::MissingLocation { player })
    }

    /// The language the message was resolved to.
    pub fn language(&self, ctx: &MessageContext) -> TransformResult<Option<&'a Language>> {
        match ctx.meta.language.as_deref() {
            None => Ok(None),
            Some(name) => self
                .languages
                .get(name)
                .map(Some)
                .ok_or_else(|| TransformError::UnknownLanguage {
                    name: name.to_string(),
                }),
        }
    }

    pub fn receiver(&self, ctx: &MessageContext) -> TransformResult<PlayerId> {
        ctx.receiver.ok_or(TransformError::MissingReceiver)
    }

    /// Hearing range for a chat mode.
    pub fn distance(&self, mode: ChatMode) -> TransformResult<u32> {
        self.settings
            .distance(mode)
            .ok_or(TransformError::MissingModeConfig {
                table: "distances",
                mode,
            })
    }

    /// Distance at which masking starts for a chat mode.
    pub fn obfuscation_range(&self, mode: ChatMode) -> TransformResult<u32> {
        self.settings
            .obfuscation_range(mode)
            .ok_or(TransformError::MissingModeConfig {
                table: "obfuscation_ranges",
                mode,
            })
    }

    pub fn font_size(&self, mode: ChatMode) -> TransformResult<u32> {
        self.settings
            .font_size(mode)
            .ok_or(TransformError::MissingModeConfig {
                table: "font_sizes",
                mode,
            })
    }
}
