//! Two-phase orchestration.
//!
//! The sender phase runs once per message and ends with recipient determination.
//! The recipient phase runs once per recipient on an independent fork. A step
//! that stops or fails ends only the phase it runs in; a failing fork skips only
//! its own recipient.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::common::messages::{InboundChat, OutgoingChat};
use crate::config::types::ChatConfig;
use crate::host::{ChatSink, PlayerDirectory, WorldView};
use crate::language::LanguageRegistry;
use crate::transformers;

use super::context::{MessageContext, PipelineState};
use super::transformer::{PipelineEnv, Transformer};

/// Outcome of one `process` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineReport {
    /// Final state of the sender phase.
    pub state: PipelineState,
    /// Recipients determined by the sender phase.
    pub recipients: usize,
    pub delivered: usize,
    /// Recipients whose fork stopped, failed, or could not be delivered to.
    pub skipped: usize,
}

/// Owns the two transformer lists and runs messages through them.
pub struct TransformerSystem {
    settings: Arc<ChatConfig>,
    languages: Arc<LanguageRegistry>,
    sender_phase: Vec<Box<dyn Transformer>>,
    recipient_phase: Vec<Box<dyn Transformer>>,
}

impl TransformerSystem {
    /// An empty system. Steps run in the order they are added.
    pub fn new(settings: Arc<ChatConfig>, languages: Arc<LanguageRegistry>) -> Self {
        Self {
            settings,
            languages,
            sender_phase: Vec::new(),
            recipient_phase: Vec::new(),
        }
    }

    /// A system with the standard roleplay chain.
    pub fn standard(settings: Arc<ChatConfig>, languages: Arc<LanguageRegistry>) -> Self {
        let mut system = Self::new(settings, languages);
        for step in transformers::sender_phase() {
            system.add_sender_step(step);
        }
        for step in transformers::recipient_phase() {
            system.add_recipient_step(step);
        }
        system
    }

    pub fn add_sender_step(&mut self, step: Box<dyn Transformer>) {
        self.sender_phase.push(step);
    }

    pub fn add_recipient_step(&mut self, step: Box<dyn Transformer>) {
        self.recipient_phase.push(step);
    }

    pub fn sender_step_names(&self) -> Vec<&'static str> {
        self.sender_phase.iter().map(|t| t.name()).collect()
    }

    pub fn recipient_step_names(&self) -> Vec<&'static str> {
        self.recipient_phase.iter().map(|t| t.name()).collect()
    }

    pub fn settings(&self) -> &ChatConfig {
        &self.settings
    }

    pub fn languages(&self) -> &LanguageRegistry {
        &self.languages
    }

    /// Run one chat event through both phases and deliver the results.
    pub fn process(
        &self,
        inbound: InboundChat,
        players: &dyn PlayerDirectory,
        world: &dyn WorldView,
        sink: &dyn ChatSink,
    ) -> PipelineReport {
        let env = PipelineEnv {
            settings: &self.settings,
            languages: &self.languages,
            players,
            world,
        };

        let mut ctx = MessageContext::new(inbound);
        let state = run_phase(&self.sender_phase, &mut ctx, &env);

        for notice in ctx.notices.drain(..) {
            sink.notify(ctx.sender, &notice);
        }

        let mut report = PipelineReport {
            state,
            recipients: ctx.recipients.len(),
            ..PipelineReport::default()
        };
        if state != PipelineState::Continue {
            debug!(sender = ctx.sender, ?state, "Sender phase ended early");
            return report;
        }
        if ctx.recipients.is_empty() {
            debug!(sender = ctx.sender, "No recipients in range");
            return report;
        }

        for &recipient in &ctx.recipients {
            let mut fork = ctx.fork(recipient);
            if run_phase(&self.recipient_phase, &mut fork, &env) != PipelineState::Continue {
                report.skipped += 1;
                continue;
            }

            let outgoing = OutgoingChat {
                sender: fork.sender,
                text: fork.message,
                chat_type: fork.meta.chat_type,
                channel: fork.channel,
                side_data: fork.side_data,
                font_size: fork.meta.font_size,
            };
            match sink.deliver(recipient, outgoing) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(sender = ctx.sender, recipient, "Delivery failed: {}", e);
                    report.skipped += 1;
                }
            }
        }

        info!(
            sender = ctx.sender,
            chat_type = ?ctx.meta.chat_type,
            delivered = report.delivered,
            skipped = report.skipped,
            "Message processed"
        );
        report
    }
}

/// Run `steps` against `ctx` until one leaves the `Continue` state.
fn run_phase(
    steps: &[Box<dyn Transformer>],
    ctx: &mut MessageContext,
    env: &PipelineEnv<'_>,
) -> PipelineState {
    for step in steps {
        if !step.should_apply(ctx) {
            continue;
        }
        debug!(step = step.name(), receiver = ?ctx.receiver, "Applying transformer");

        if let Err(e) = step.apply(ctx, env) {
            warn!(
                step = step.name(),
                sender = ctx.sender,
                receiver = ?ctx.receiver,
                "Transformer failed: {}",
                e
            );
            ctx.fail();
        }

        match ctx.state {
            PipelineState::Continue => {}
            PipelineState::Stop => {
                debug!(step = step.name(), "Message stopped");
                break;
            }
            PipelineState::Error => {
                warn!(step = step.name(), sender = ctx.sender, "Message processing aborted");
                break;
            }
        }
    }
    ctx.state
}
