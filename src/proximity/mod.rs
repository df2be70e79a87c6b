//! Distance and visibility: who can hear a message, and how well.

pub mod obfuscation;
pub mod utils;

pub use obfuscation::{font_size, mask_text, snap_to_clamp, DistanceObfuscation};
pub use utils::{first_solid_block, in_range, line_of_sight, walkable_distance, Aabb};
