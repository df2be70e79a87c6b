//! Common utilities and types shared across the application.

pub mod error;
pub mod messages;
pub mod text;
pub mod types;

pub use error::{ConfigError, DeliveryError, TransformError};
pub use messages::{ChatOrigin, CommandKind, InboundChat, OutgoingChat};
pub use types::{BlockPos, ChatMode, ChatType, Location, PlayerId, PlayerProfile, Vec3};
