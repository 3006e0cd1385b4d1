//! Core type definitions shared by every autonpc module.
//!
//! Identifiers are thin newtypes over the host engine's numeric GUIDs so they
//! serialize as plain numbers (and as string map keys in JSON).

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Low GUID of a creature instance in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatureGuid(pub u64);

/// GUID of a player character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerGuid(pub u64);

/// Zone (or area) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u32);

/// Spell identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellId(pub u32);

impl fmt::Display for CreatureGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Creature-{}", self.0)
    }
}

impl fmt::Display for PlayerGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player-{}", self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SpellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Any unit the agent can interact with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorId {
    /// A player character.
    Player(PlayerGuid),
    /// Another creature.
    Creature(CreatureGuid),
}

impl ActorId {
    /// GUID 0 is never handed out by the host; it marks a dangling reference.
    #[must_use]
    pub fn is_valid(self) -> bool {
        match self {
            Self::Player(p) => p.0 != 0,
            Self::Creature(c) => c.0 != 0,
        }
    }

    /// The player GUID, if this actor is a player.
    #[must_use]
    pub fn player(self) -> Option<PlayerGuid> {
        match self {
            Self::Player(p) => Some(p),
            Self::Creature(_) => None,
        }
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(p) => p.fmt(f),
            Self::Creature(c) => c.fmt(f),
        }
    }
}

/// A snapshot of another unit as reported by the host in an event or query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorRef {
    /// Identity of the unit.
    pub id: ActorId,
    /// Character / creature level.
    pub level: u8,
    /// Where the unit stands.
    pub position: Position,
}

impl ActorRef {
    /// Construct a reference to a player.
    #[must_use]
    pub fn player(guid: u64, level: u8, position: Position) -> Self {
        Self {
            id: ActorId::Player(PlayerGuid(guid)),
            level,
            position,
        }
    }

    /// Construct a reference to a creature.
    #[must_use]
    pub fn creature(guid: u64, level: u8, position: Position) -> Self {
        Self {
            id: ActorId::Creature(CreatureGuid(guid)),
            level,
            position,
        }
    }

    /// Whether this reference can be acted upon.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.id.is_valid() && self.position.is_finite()
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

/// A position in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Point `distance` units away along `angle` (radians) on the ground plane.
    #[must_use]
    pub fn offset(&self, angle: f32, distance: f32) -> Self {
        Self {
            x: self.x + angle.cos() * distance,
            y: self.y + angle.sin() * distance,
            z: self.z,
        }
    }

    /// Point `distance` units away from `threat`, on the far side of `self`.
    #[must_use]
    pub fn away_from(&self, threat: &Self, distance: f32) -> Self {
        let angle = (self.y - threat.y).atan2(self.x - threat.x);
        self.offset(angle, distance)
    }

    /// All coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Agent-local clock in milliseconds, advanced only by `update(diff)`.
///
/// Never wall-clock aligned: two agents spawned at different times have
/// unrelated clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameTime(pub u64);

impl GameTime {
    /// Milliseconds elapsed since `earlier` (zero if `earlier` is in the future).
    #[must_use]
    pub fn since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Advance by `diff` milliseconds.
    #[must_use]
    pub fn advanced(self, diff: u64) -> Self {
        Self(self.0.saturating_add(diff))
    }
}

/// Emotes the agent recognises from players or performs itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emote {
    /// Friendly wave.
    Wave,
    /// Respectful bow.
    Bow,
    /// Cheer.
    Cheer,
    /// Hug.
    Hug,
    /// Thank.
    Thank,
    /// Laugh.
    Laugh,
    /// Dance.
    Dance,
    /// Insult.
    Rude,
    /// Spit.
    Spit,
    /// Threaten.
    Threaten,
    /// Busy working at a craft.
    Work,
    /// Reading or studying.
    Read,
    /// Haggling or chatting.
    Talk,
    /// Any host emote id without a mapping.
    Other(u32),
}
