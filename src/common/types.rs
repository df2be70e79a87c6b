//! Shared types used across the application.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// Unique identifier for a connected player.
pub type PlayerId = u64;

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Manhattan (block) distance to another position.
    pub fn manhattan(&self, other: &BlockPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }

    /// Straight-line distance between block centers.
    pub fn euclidean(&self, other: &BlockPos) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        let dz = f64::from(self.z) - f64::from(other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// The six face-adjacent neighbours.
    pub fn neighbours(&self) -> [BlockPos; 6] {
        [
            BlockPos::new(self.x + 1, self.y, self.z),
            BlockPos::new(self.x - 1, self.y, self.z),
            BlockPos::new(self.x, self.y + 1, self.z),
            BlockPos::new(self.x, self.y - 1, self.z),
            BlockPos::new(self.x, self.y, self.z + 1),
            BlockPos::new(self.x, self.y, self.z - 1),
        ]
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Continuous world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn sub(&self, other: &Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// The block containing this point.
    pub fn block(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }
}

/// Where a player currently is.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// World / dimension name. Players in different worlds never hear each other.
    pub world: String,
    /// Block the player is standing in.
    pub block: BlockPos,
    /// Eye position, used as the origin of line-of-sight rays.
    pub eye: Vec3,
}

impl Location {
    /// Location of a player standing in `block` with a default eye height.
    pub fn standing(world: impl Into<String>, block: BlockPos) -> Self {
        Self {
            world: world.into(),
            block,
            eye: Vec3::new(
                f64::from(block.x) + 0.5,
                f64::from(block.y) + EYE_HEIGHT,
                f64::from(block.z) + 0.5,
            ),
        }
    }
}

/// Eye height above the block a player stands in.
pub const EYE_HEIGHT: f64 = 1.62;

/// Discrete speaking style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChatMode {
    Whisper,
    #[default]
    Normal,
    Yell,
    Sign,
}

impl ChatMode {
    pub const ALL: [ChatMode; 4] = [
        ChatMode::Whisper,
        ChatMode::Normal,
        ChatMode::Yell,
        ChatMode::Sign,
    ];

    /// Key used in the per-mode configuration tables.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Whisper => "whisper",
            Self::Normal => "normal",
            Self::Yell => "yell",
            Self::Sign => "sign",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "whisper" | "w" => Some(Self::Whisper),
            "normal" | "say" | "n" => Some(Self::Normal),
            "yell" | "shout" | "y" => Some(Self::Yell),
            "sign" => Some(Self::Sign),
            _ => None,
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Kind of rendered message, consumed by the host for styling and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    #[default]
    Speech,
    Emote,
    Environmental,
    Ooc,
    GlobalOoc,
}

/// Snapshot of the per-player data the pipeline reads.
///
/// Owned by the host's player-persistence layer; fetched on every message.
#[derive(Debug, Clone, Default)]
pub struct PlayerProfile {
    pub username: String,
    pub nickname: Option<String>,
    pub chat_mode: ChatMode,
    pub roleplay: bool,
    /// Language the player speaks when no prefix override is given.
    pub current_language: Option<String>,
    /// Languages learned explicitly (case-insensitive names).
    pub known_languages: HashSet<String>,
    /// Staff may speak any language, including hidden ones.
    pub is_staff: bool,
    pub class_code: Option<String>,
    pub trait_codes: Vec<String>,
    pub model_code: Option<String>,
    pub model_group: Option<String>,
}

impl PlayerProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roleplay: true,
            ..Default::default()
        }
    }

    /// Name shown to other players: the nickname if set, else the username.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }

    pub fn has_nickname(&self) -> bool {
        self.nickname.as_deref().is_some_and(|n| !n.trim().is_empty())
    }

    pub fn knows_explicitly(&self, language: &str) -> bool {
        self.known_languages
            .iter()
            .any(|l| l.eq_ignore_ascii_case(language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = BlockPos::new(0, 64, 0);
        let b = BlockPos::new(3, 60, -2);
        assert_eq!(a.manhattan(&b), 9);
        assert_eq!(b.manhattan(&a), 9);
        assert_eq!(a.manhattan(&a), 0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = BlockPos::new(0, 0, 0);
        let b = BlockPos::new(3, 4, 0);
        assert!((a.euclidean(&b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_chat_mode_keys() {
        for mode in ChatMode::ALL {
            assert_eq!(ChatMode::from_key(mode.key()), Some(mode));
        }
        assert_eq!(ChatMode::from_key("SHOUT"), Some(ChatMode::Yell));
        assert_eq!(ChatMode::from_key("mumble"), None);
    }

    #[test]
    fn test_display_name_prefers_nickname() {
        let mut profile = PlayerProfile::new("steve");
        assert_eq!(profile.display_name(), "steve");
        assert!(!profile.has_nickname());

        profile.nickname = Some("   ".to_string());
        assert_eq!(profile.display_name(), "steve");

        profile.nickname = Some("Aldric".to_string());
        assert_eq!(profile.display_name(), "Aldric");
        assert!(profile.has_nickname());
    }

    #[test]
    fn test_eye_position_block() {
        let loc = Location::standing("overworld", BlockPos::new(-3, 70, 5));
        assert_eq!(loc.eye.block(), BlockPos::new(-3, 71, 5));
    }
}
