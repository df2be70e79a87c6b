//! Who hears a message, and how clearly.

use tracing::debug;

use crate::common::error::TransformResult;
use crate::common::types::{ChatMode, Location, PlayerId};
use crate::pipeline::{MessageContext, PipelineEnv, Transformer};
use crate::proximity::{font_size, in_range, line_of_sight, walkable_distance, DistanceObfuscation};

/// Final sender-phase step: fills `recipients`.
///
/// Global OOC reaches everyone online. Everything else reaches players in the same
/// world strictly within range; sign language also needs line of sight.
pub struct DetermineRecipients;

impl Transformer for DetermineRecipients {
    fn name(&self) -> &'static str {
        "determine-recipients"
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let online = env.players.online_players();
        if ctx.flags.global_ooc {
            ctx.recipients = online;
            return Ok(());
        }

        let origin = env.location(ctx.sender)?;
        let signing = env.language(ctx)?.is_some_and(|l| l.is_sign_language);
        let ranges = &env.settings.ranges;
        let range = if signing {
            ranges.sign_language
        } else if ctx.flags.ooc {
            ranges.ooc
        } else if ctx.flags.environmental {
            ranges.environmental
        } else {
            env.distance(ctx.meta.chat_mode)?
        };

        let located: Vec<(PlayerId, Location)> = online
            .into_iter()
            .filter_map(|id| env.world.location(id).map(|loc| (id, loc)))
            .collect();
        let others: Vec<(PlayerId, Location)> = located
            .iter()
            .filter(|(id, _)| *id != ctx.sender)
            .cloned()
            .collect();
        let walkable = env.settings.proximity.require_walkable_path;

        ctx.recipients = located
            .iter()
            .filter(|(id, loc)| {
                if *id == ctx.sender {
                    return true;
                }
                loc.world == origin.world
                    && in_range(&origin.block, &loc.block, range)
                    && (!signing || line_of_sight(env.world, &origin, *id, loc, &others))
                    && (!walkable
                        || walkable_distance(
                            env.world,
                            &origin.world,
                            origin.block,
                            loc.block,
                            range.saturating_sub(1),
                        )
                        .is_some())
            })
            .map(|(id, _)| *id)
            .collect();

        debug!(
            sender = ctx.sender,
            range,
            signing,
            recipients = ctx.recipients.len(),
            "Determined recipients"
        );
        Ok(())
    }
}

/// Distance between sender and receiver of a fork, in blocks.
fn fork_distance(ctx: &MessageContext, env: &PipelineEnv<'_>) -> TransformResult<f64> {
    let receiver = env.receiver(ctx)?;
    if receiver == ctx.sender {
        return Ok(0.0);
    }
    let from = env.location(ctx.sender)?;
    let to = env.location(receiver)?;
    Ok(from.block.euclidean(&to.block))
}

/// Masks speech heard from far away. Sign language is seen, not heard, and is
/// left alone.
pub struct ObfuscateSpeech;

impl Transformer for ObfuscateSpeech {
    fn name(&self) -> &'static str {
        "obfuscate-speech"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.speech
            && ctx.meta.chat_mode != ChatMode::Sign
            && !ctx.is_self_receiver()
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let mode = ctx.meta.chat_mode;
        let curve = DistanceObfuscation::new(
            f64::from(env.obfuscation_range(mode)?),
            f64::from(env.distance(mode)?),
            env.settings.mask_char(),
        );
        let distance = fork_distance(ctx, env)?;
        ctx.message = curve.apply(&ctx.message, distance, &mut rand::thread_rng());
        Ok(())
    }
}

/// Shrinks the speech font with distance. Signing fades out over the sign range.
pub struct ScaleFont;

impl Transformer for ScaleFont {
    fn name(&self) -> &'static str {
        "scale-font"
    }

    fn should_apply(&self, ctx: &MessageContext) -> bool {
        ctx.flags.speech
    }

    fn apply(&self, ctx: &mut MessageContext, env: &PipelineEnv<'_>) -> TransformResult {
        let mode = ctx.meta.chat_mode;
        let default_size = env.font_size(mode)?;
        let signing = env.language(ctx)?.is_some_and(|l| l.is_sign_language);
        let max_range = if signing {
            f64::from(env.settings.ranges.sign_language)
        } else {
            f64::from(env.distance(mode)?)
        };
        let distance = fork_distance(ctx, env)?;

        ctx.meta.font_size = font_size(distance, max_range, default_size, &env.settings.font.clamp_sizes)
            .or(Some(default_size));
        Ok(())
    }
}
