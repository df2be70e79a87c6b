//! Message pipeline: the per-message context, the transformer seam and the
//! two-phase orchestrator.

pub mod context;
pub mod system;
pub mod transformer;

pub use context::{MessageContext, MessageFlags, MessageMeta, PipelineState};
pub use system::{PipelineReport, TransformerSystem};
pub use transformer::{PipelineEnv, Transformer};
