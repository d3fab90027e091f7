use crate::math::Vector3;
use bitflags::bitflags;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Initial forced length passed on allocation (none)
pub const DEFAULT_INIT_LENGTH: f32 = 0.0;

/// Whether newly allocated ropes are length-locked
pub const DEFAULT_LOCKED: bool = false;

/// Engine tuning value passed on allocation
pub const DEFAULT_SPAWN_TUNING: f32 = 5.0;

bitflags! {
    /// Behaviour switches for a newly allocated rope
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
    pub struct RopeFlags: u8 {
        /// With a zero maximum length, leaving this unset makes the rope
        /// hold its length rigidly between its attachments
        const RIGID           = 0b0000_0001;

        /// Gunfire can break the rope
        const BREAK_WHEN_SHOT = 0b0000_0010;
    }
}

/// Visual family of a rope type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum RopeKind {
    /// Types 1 through 4
    ThickRope,

    /// Types 5 and up
    MetalWire,
}

impl RopeKind {
    /// Classifies an engine rope type. Types of 0 or less are invalid.
    pub fn from_rope_type(rope_type: i32) -> Option<Self> {
        match rope_type {
            i32::MIN..=0 => None,
            1..=4 => Some(RopeKind::ThickRope),
            _ => Some(RopeKind::MetalWire),
        }
    }
}

/// Parameters for allocating a new rope
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RopeConfig {
    /// World position of the rope's origin
    pub position: Vector3,

    /// Rotation in degrees around each axis
    pub rotation: Vector3,

    /// Initial rope length, also cached as the handle's nominal length
    pub length: f32,

    /// Engine rope type; 0 or less crashes the engine and is rejected
    pub rope_type: i32,

    /// Maximum length the rope may extend to
    pub max_length: f32,

    /// Minimum length the rope may contract to
    pub min_length: f32,

    /// Rigidity and breakability
    pub flags: RopeFlags,
}

impl Default for RopeConfig {
    fn default() -> Self {
        Self {
            position: Vector3::ZERO,
            rotation: Vector3::ZERO,
            length: 10.0,
            rope_type: 1,
            max_length: 10.0,
            min_length: 0.0,
            flags: RopeFlags::empty(),
        }
    }
}

impl RopeConfig {
    /// Creates a config for a rope of `length` at `position`
    pub fn new(position: Vector3, length: f32) -> Self {
        Self {
            position,
            length,
            max_length: length,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Vector3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_rope_type(mut self, rope_type: i32) -> Self {
        self.rope_type = rope_type;
        self
    }

    /// Sets the minimum and maximum length
    pub fn with_length_limits(mut self, min_length: f32, max_length: f32) -> Self {
        self.min_length = min_length;
        self.max_length = max_length;
        self
    }

    pub fn with_flags(mut self, flags: RopeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Returns the visual family of the configured rope type
    pub fn kind(&self) -> Option<RopeKind> {
        RopeKind::from_rope_type(self.rope_type)
    }

    pub fn is_rigid(&self) -> bool {
        self.flags.contains(RopeFlags::RIGID)
    }

    pub fn breaks_when_shot(&self) -> bool {
        self.flags.contains(RopeFlags::BREAK_WHEN_SHOT)
    }
}
