pub mod config;

pub use self::config::{RopeConfig, RopeFlags, RopeKind};

use self::config::{DEFAULT_INIT_LENGTH, DEFAULT_LOCKED, DEFAULT_SPAWN_TUNING};

use crate::error::RopeError;
use crate::math::Vector3;
use crate::natives::{ensure_rope_textures, EntityHandle, NativeRopeSpawn, RopeId, RopeNatives, BONE_NOT_FOUND};
use crate::Result;
use std::fmt;
use tracing::{debug, warn};

/// Length passed to the engine when a reset does not use the nominal length
pub const UNIT_RESET_LENGTH: f32 = 1.0;

/// A handle to one rope owned by the engine.
///
/// The handle stores the engine's [`RopeId`] and a nominal length. The
/// nominal length is whatever was last set through this handle; the
/// engine's simulated length can drift from it. Anything inherent to the
/// running simulation (vertex count, existence, vertex positions) is
/// queried live on every call.
///
/// Dropping a `Rope` leaves the engine rope alone. [`Rope::delete`]
/// consumes the handle it is called on, but handles are not unique per
/// [`RopeId`]: [`Rope::new`] and [`Rope::from_existing`] can wrap the same
/// id any number of times, and the engine can delete a rope on its own.
/// Once a rope is gone, every other handle to it is dangling and keeps
/// forwarding calls for the dead id. Checking [`Rope::exists`] before use
/// is the caller's responsibility.
pub struct Rope<'n, N: RopeNatives + ?Sized> {
    natives: &'n N,
    id: RopeId,
    length: f32,
}

impl<N: RopeNatives + ?Sized> fmt::Debug for Rope<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rope")
            .field("id", &self.id)
            .field("length", &self.length)
            .finish()
    }
}

impl<'n, N: RopeNatives + ?Sized> Rope<'n, N> {
    /// Wraps an identifier without checking that the rope exists.
    ///
    /// Loads the rope textures first if the engine does not have them.
    /// Prefer [`Rope::from_existing`] or [`Rope::allocate`] unless `id` is
    /// already known to be live.
    pub fn new(natives: &'n N, id: RopeId, length: f32) -> Self {
        ensure_rope_textures(natives);
        Self { natives, id, length }
    }

    /// Wraps a rope the engine already knows about
    pub fn from_existing(natives: &'n N, id: RopeId, length: f32) -> Result<Self> {
        if !natives.does_rope_exist(id) {
            warn!(rope_id = id.0, "cannot create a rope handle for a rope that doesn't exist");
            return Err(RopeError::RopeNotFound(id));
        }
        debug!(rope_id = id.0, length, "wrapping existing rope");
        Ok(Self::new(natives, id, length))
    }

    /// Allocates a new rope in the engine and wraps it.
    ///
    /// Rope types of 0 or less crash the engine, so they are rejected
    /// before anything reaches it.
    pub fn allocate(natives: &'n N, config: &RopeConfig) -> Result<Self> {
        if config.rope_type <= 0 {
            warn!(
                rope_type = config.rope_type,
                "cannot create a rope with rope type 0 or less"
            );
            return Err(RopeError::InvalidRopeType(config.rope_type));
        }

        let spawn = NativeRopeSpawn {
            position: config.position,
            rotation: config.rotation,
            length: config.length,
            rope_type: config.rope_type,
            max_length: config.max_length,
            min_length: config.min_length,
            init_length: DEFAULT_INIT_LENGTH,
            locked: DEFAULT_LOCKED,
            reserved_flag: false,
            rigid: config.is_rigid(),
            tuning: DEFAULT_SPAWN_TUNING,
            break_when_shot: config.breaks_when_shot(),
        };
        let id = natives.add_rope(&spawn);
        debug!(rope_id = id.0, rope_type = config.rope_type, length = config.length, "allocated rope");
        Ok(Self::new(natives, id, config.length))
    }

    /// The engine identifier of this rope
    pub fn id(&self) -> RopeId {
        self.id
    }

    /// The natives this handle forwards to
    pub fn natives(&self) -> &'n N {
        self.natives
    }

    /// The nominal length last set through this handle.
    ///
    /// Not read back from the engine.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Sets the nominal length and forces the engine rope to it
    pub fn set_length(&mut self, length: f32) {
        self.length = length;
        self.natives.rope_force_length(self.id, length);
    }

    /// Live number of vertices in the simulated rope
    pub fn vertex_count(&self) -> u32 {
        self.natives.get_rope_vertex_count(self.id)
    }

    pub fn activate_physics(&self) {
        self.natives.activate_physics(self.id);
    }

    /// Attaches the rope between two entities at entity-local positions
    pub fn attach_entities(
        &self,
        entity_a: EntityHandle,
        position_a: Vector3,
        entity_b: EntityHandle,
        position_b: Vector3,
        length: f32,
    ) {
        self.natives.attach_entities_to_rope(
            self.id, entity_a, entity_b, position_a, position_b, length, false, false, None, None,
        );
    }

    /// Attaches the rope between a bone on each entity.
    ///
    /// Both bone names are resolved first; if either is missing nothing is
    /// attached and [`RopeError::BoneNotFound`] carries both indices. Each
    /// bone's world position is read from its own entity, so the second
    /// position comes from `entity_b`, not `entity_a`.
    pub fn attach_entities_by_bone_names(
        &self,
        entity_a: EntityHandle,
        bone_name_a: &str,
        entity_b: EntityHandle,
        bone_name_b: &str,
        length: f32,
    ) -> Result<()> {
        let bone_a = self.natives.get_entity_bone_index_by_name(entity_a, bone_name_a);
        let bone_b = self.natives.get_entity_bone_index_by_name(entity_b, bone_name_b);
        if bone_a == BONE_NOT_FOUND || bone_b == BONE_NOT_FOUND {
            warn!(
                rope_id = self.id.0,
                bone_a,
                bone_b,
                "cannot attach rope to a bone that doesn't exist"
            );
            return Err(RopeError::BoneNotFound { bone_a, bone_b });
        }

        let position_a = self.natives.get_world_position_of_entity_bone(entity_a, bone_a);
        let position_b = self.natives.get_world_position_of_entity_bone(entity_b, bone_b);
        self.attach_entities(entity_a, position_a, entity_b, position_b, length);
        Ok(())
    }

    /// Attaches the end of the rope to `entity` at an entity-local position
    pub fn attach_entity(&self, entity: EntityHandle, position: Vector3) {
        self.natives.attach_rope_to_entity(self.id, entity, position, false);
    }

    /// Removes the rope from the world, consuming the handle.
    ///
    /// Other handles wrapping the same id are not invalidated.
    pub fn delete(self) {
        debug!(rope_id = self.id.0, "deleting rope");
        self.natives.delete_rope(self.id);
    }

    pub fn detach_entity(&self, entity: EntityHandle) {
        self.natives.detach_rope_from_entity(self.id, entity);
    }

    /// Whether the engine still has this rope
    pub fn exists(&self) -> bool {
        self.natives.does_rope_exist(self.id)
    }

    /// World position of a vertex on the simulated rope
    pub fn vertex_coord(&self, vertex: u32) -> Vector3 {
        self.natives.get_rope_vertex_coord(self.id, vertex)
    }

    /// Pins a vertex to a fixed world position
    pub fn pin_vertex(&self, vertex: u32, position: Vector3) {
        self.natives.pin_rope_vertex(self.id, vertex, position);
    }

    /// Releases a pinned vertex back to the simulation
    pub fn unpin_vertex(&self, vertex: u32) {
        self.natives.unpin_rope_vertex(self.id, vertex);
    }

    /// Resets the engine rope to the nominal length, or to
    /// [`UNIT_RESET_LENGTH`] when `use_nominal` is false.
    ///
    /// The nominal length itself is left unchanged.
    pub fn reset_length(&self, use_nominal: bool) {
        let length = if use_nominal { self.length } else { UNIT_RESET_LENGTH };
        self.natives.rope_reset_length(self.id, length);
    }
}

/// Rope length needed to span two points, as the sum of the per-axis
/// distances. Never shorter than the straight-line distance.
pub fn calc_rope_length(a: Vector3, b: Vector3) -> f32 {
    a.manhattan_distance(&b)
}
