//! The engine boundary.
//!
//! [`RopeNatives`] lists every native rope primitive the handles in
//! [`crate::rope`] call into. The host engine owns all rope state; an
//! implementation of this trait is only a thin adapter over its native
//! functions. [`HeadlessNatives`] is an in-memory implementation for tests
//! and for tooling that runs without the engine.

mod calls;
mod headless;

pub use self::calls::{CallLog, NativeCall};
pub use self::headless::{HeadlessConfig, HeadlessNatives, HeadlessRope};

use crate::math::Vector3;
use std::fmt;
use tracing::debug;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Bone index the engine reports when a bone name does not resolve
pub const BONE_NOT_FOUND: i32 = -1;

/// Identifier the engine assigned to a rope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct RopeId(pub i32);

impl fmt::Display for RopeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a foreign engine entity (vehicle, ped, object).
///
/// Ropes attach to entities but never own them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct EntityHandle(pub i32);

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The full parameter block of the engine's add-rope native
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct NativeRopeSpawn {
    /// World position of the rope's origin
    pub position: Vector3,

    /// Rotation in degrees around each axis
    pub rotation: Vector3,

    /// Initial rope length
    pub length: f32,

    /// Engine rope type; must be positive
    pub rope_type: i32,

    /// Maximum length the rope may extend to
    pub max_length: f32,

    /// Minimum length the rope may contract to
    pub min_length: f32,

    /// Initial forced length, 0.0 for none
    pub init_length: f32,

    /// Whether the rope length is locked
    pub locked: bool,

    /// Undocumented engine flag
    pub reserved_flag: bool,

    /// With a zero maximum length, `false` makes the rope hold its length rigidly
    pub rigid: bool,

    /// Undocumented engine tuning value
    pub tuning: f32,

    /// Whether gunfire can break the rope
    pub break_when_shot: bool,
}

/// Native rope primitives of the host simulation engine.
///
/// Methods take `&self`: natives address process-global engine state, so
/// implementations that keep their own state use interior mutability.
/// Nothing here validates identifiers; calling a method with a deleted rope
/// does whatever the engine does.
pub trait RopeNatives {
    /// Whether the rope textures are resident
    fn rope_are_textures_loaded(&self) -> bool;

    /// Starts loading the rope textures
    fn rope_load_textures(&self);

    /// Allocates a rope and returns its identifier
    fn add_rope(&self, spawn: &NativeRopeSpawn) -> RopeId;

    /// Whether `rope` denotes a live rope
    fn does_rope_exist(&self, rope: RopeId) -> bool;

    /// Overrides the simulated length of `rope`
    fn rope_force_length(&self, rope: RopeId, length: f32);

    /// Number of vertices in the rope's current simulated shape
    fn get_rope_vertex_count(&self, rope: RopeId) -> u32;

    /// Enables physics simulation on `rope`
    fn activate_physics(&self, rope: RopeId);

    /// Attaches `rope` between two entities
    #[allow(clippy::too_many_arguments)]
    fn attach_entities_to_rope(
        &self,
        rope: RopeId,
        entity_a: EntityHandle,
        entity_b: EntityHandle,
        position_a: Vector3,
        position_b: Vector3,
        length: f32,
        flag_a: bool,
        flag_b: bool,
        bone_name_a: Option<&str>,
        bone_name_b: Option<&str>,
    );

    /// Attaches the end of `rope` to a single entity
    fn attach_rope_to_entity(&self, rope: RopeId, entity: EntityHandle, position: Vector3, flag: bool);

    /// Destroys `rope`
    fn delete_rope(&self, rope: RopeId);

    /// Detaches `rope` from `entity`
    fn detach_rope_from_entity(&self, rope: RopeId, entity: EntityHandle);

    /// World position of a rope vertex
    fn get_rope_vertex_coord(&self, rope: RopeId, vertex: u32) -> Vector3;

    /// Pins a rope vertex to a world position
    fn pin_rope_vertex(&self, rope: RopeId, vertex: u32, position: Vector3);

    /// Releases a pinned rope vertex
    fn unpin_rope_vertex(&self, rope: RopeId, vertex: u32);

    /// Resets the length of `rope`
    fn rope_reset_length(&self, rope: RopeId, length: f32);

    /// Resolves a bone name on `entity`, or [`BONE_NOT_FOUND`]
    fn get_entity_bone_index_by_name(&self, entity: EntityHandle, bone_name: &str) -> i32;

    /// Current world position of a bone on `entity`
    fn get_world_position_of_entity_bone(&self, entity: EntityHandle, bone_index: i32) -> Vector3;
}

/// Loads the rope textures unless the engine already has them.
///
/// The engine's readiness flag is process-wide, so repeated calls are
/// cheap and only the first one triggers a load. Returns whether a load
/// was requested.
pub fn ensure_rope_textures<N: RopeNatives + ?Sized>(natives: &N) -> bool {
    if natives.rope_are_textures_loaded() {
        return false;
    }
    debug!("rope textures not resident, loading");
    natives.rope_load_textures();
    true
}
