//! In-memory rope natives.
//!
//! Models just enough engine behaviour for the rope handles to be
//! exercised without a host process: rope existence, forced and reset
//! length, vertex discretisation along the rope, pinning, attachment
//! anchors, and per-entity bones. Entities have no transforms here, so
//! attachment offsets are taken as world positions. Calls are recorded in
//! a [`CallLog`] bounded by [`HeadlessConfig::max_recorded_calls`], so
//! long-running tools keep only the most recent traffic.

use crate::math::Vector3;
use crate::natives::{
    CallLog, EntityHandle, NativeCall, NativeRopeSpawn, RopeId, RopeNatives, BONE_NOT_FOUND,
};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Tuning for the headless rope model
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct HeadlessConfig {
    /// Distance between neighbouring simulated vertices
    pub segment_length: f32,

    /// Upper bound on the vertex count of a single rope
    pub max_vertices: u32,

    /// Whether the rope textures start out resident
    pub textures_loaded: bool,

    /// Most recent native calls kept in the call log; 0 turns recording off
    pub max_recorded_calls: usize,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            segment_length: 0.5,
            max_vertices: 64,
            textures_loaded: false,
            max_recorded_calls: 4096,
        }
    }
}

/// Snapshot of one simulated rope
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessRope {
    /// The parameters the rope was allocated with
    pub spawn: NativeRopeSpawn,

    /// Current simulated length
    pub length: f32,

    /// Whether physics has been activated
    pub physics_active: bool,

    /// World position of the first vertex
    pub start: Vector3,

    /// World position of the last vertex
    pub end: Vector3,

    /// Entities the rope is attached to, in attach order
    pub attached: Vec<EntityHandle>,

    /// Pinned vertices and their fixed positions
    pub pinned: BTreeMap<u32, Vector3>,
}

impl HeadlessRope {
    fn new(spawn: NativeRopeSpawn) -> Self {
        // Unattached ropes hang straight down from their origin.
        let end = spawn.position - Vector3::new(0.0, 0.0, spawn.length);
        Self {
            spawn,
            length: spawn.length,
            physics_active: false,
            start: spawn.position,
            end,
            attached: Vec::new(),
            pinned: BTreeMap::new(),
        }
    }

    fn vertex_count(&self, config: &HeadlessConfig) -> u32 {
        let segments = if config.segment_length > 0.0 {
            (self.length.max(0.0) / config.segment_length).ceil() as u32
        } else {
            0
        };
        segments.saturating_add(1).clamp(2, config.max_vertices.max(2))
    }

    fn vertex_coord(&self, vertex: u32, config: &HeadlessConfig) -> Vector3 {
        if let Some(pinned) = self.pinned.get(&vertex) {
            return *pinned;
        }
        let count = self.vertex_count(config);
        if vertex >= count {
            return Vector3::ZERO;
        }
        let t = vertex as f32 / (count - 1) as f32;
        self.start.lerp(&self.end, t)
    }

    fn attach(&mut self, entity: EntityHandle) {
        if !self.attached.contains(&entity) {
            self.attached.push(entity);
        }
    }
}

#[derive(Debug)]
struct Bone {
    name: String,
    position: Vector3,
}

#[derive(Debug)]
struct HeadlessState {
    textures_loaded: bool,
    ropes: HashMap<RopeId, HeadlessRope>,
    next_id: i32,
    bones: HashMap<EntityHandle, Vec<Bone>>,
    calls: CallLog,
}

/// A [`RopeNatives`] implementation that keeps all state in memory
#[derive(Debug)]
pub struct HeadlessNatives {
    config: HeadlessConfig,
    state: RefCell<HeadlessState>,
}

impl Default for HeadlessNatives {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessNatives {
    /// Creates a backend with the default configuration
    pub fn new() -> Self {
        Self::with_config(HeadlessConfig::default())
    }

    /// Creates a backend with a custom configuration
    pub fn with_config(config: HeadlessConfig) -> Self {
        let state = HeadlessState {
            textures_loaded: config.textures_loaded,
            ropes: HashMap::new(),
            next_id: 1, // Start at 1, so 0 never names a live rope
            bones: HashMap::new(),
            calls: CallLog::with_limit(config.max_recorded_calls),
        };
        Self {
            config,
            state: RefCell::new(state),
        }
    }

    /// The configuration this backend was created with
    pub fn config(&self) -> &HeadlessConfig {
        &self.config
    }

    /// Adds a named bone to `entity` and returns its index
    pub fn register_bone(&self, entity: EntityHandle, name: &str, position: Vector3) -> i32 {
        let mut state = self.state.borrow_mut();
        let bones = state.bones.entry(entity).or_default();
        bones.push(Bone {
            name: name.to_owned(),
            position,
        });
        (bones.len() - 1) as i32
    }

    /// Snapshot of a live rope
    pub fn rope_state(&self, rope: RopeId) -> Option<HeadlessRope> {
        self.state.borrow().ropes.get(&rope).cloned()
    }

    /// Number of live ropes
    pub fn rope_count(&self) -> usize {
        self.state.borrow().ropes.len()
    }

    /// Whether the rope textures are resident, without recording a call
    pub fn textures_loaded(&self) -> bool {
        self.state.borrow().textures_loaded
    }

    /// Borrows the call log
    pub fn calls(&self) -> Ref<'_, CallLog> {
        Ref::map(self.state.borrow(), |s| &s.calls)
    }

    /// Takes the call log, leaving an empty one behind
    pub fn take_calls(&self) -> CallLog {
        let fresh = CallLog::with_limit(self.config.max_recorded_calls);
        std::mem::replace(&mut self.state.borrow_mut().calls, fresh)
    }

    fn record(&self, call: NativeCall) {
        trace!(?call, "native call");
        self.state.borrow_mut().calls.record(call);
    }

    fn with_rope(&self, rope: RopeId, f: impl FnOnce(&mut HeadlessRope)) {
        if let Some(r) = self.state.borrow_mut().ropes.get_mut(&rope) {
            f(r);
        }
    }
}

impl RopeNatives for HeadlessNatives {
    fn rope_are_textures_loaded(&self) -> bool {
        self.record(NativeCall::RopeAreTexturesLoaded);
        self.state.borrow().textures_loaded
    }

    fn rope_load_textures(&self) {
        self.record(NativeCall::RopeLoadTextures);
        self.state.borrow_mut().textures_loaded = true;
    }

    fn add_rope(&self, spawn: &NativeRopeSpawn) -> RopeId {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = RopeId(state.next_id);
            state.next_id += 1;
            state.ropes.insert(id, HeadlessRope::new(*spawn));
            id
        };
        self.record(NativeCall::AddRope { spawn: *spawn, rope: id });
        id
    }

    fn does_rope_exist(&self, rope: RopeId) -> bool {
        self.record(NativeCall::DoesRopeExist(rope));
        self.state.borrow().ropes.contains_key(&rope)
    }

    fn rope_force_length(&self, rope: RopeId, length: f32) {
        self.record(NativeCall::RopeForceLength { rope, length });
        self.with_rope(rope, |r| r.length = length);
    }

    fn get_rope_vertex_count(&self, rope: RopeId) -> u32 {
        self.record(NativeCall::GetRopeVertexCount(rope));
        self.state
            .borrow()
            .ropes
            .get(&rope)
            .map_or(0, |r| r.vertex_count(&self.config))
    }

    fn activate_physics(&self, rope: RopeId) {
        self.record(NativeCall::ActivatePhysics(rope));
        self.with_rope(rope, |r| r.physics_active = true);
    }

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
    ) {
        self.record(NativeCall::AttachEntitiesToRope {
            rope,
            entity_a,
            entity_b,
            position_a,
            position_b,
            length,
            flag_a,
            flag_b,
            bone_name_a: bone_name_a.map(str::to_owned),
            bone_name_b: bone_name_b.map(str::to_owned),
        });
        self.with_rope(rope, |r| {
            r.start = position_a;
            r.end = position_b;
            r.length = length;
            r.attach(entity_a);
            r.attach(entity_b);
        });
    }

    fn attach_rope_to_entity(&self, rope: RopeId, entity: EntityHandle, position: Vector3, flag: bool) {
        self.record(NativeCall::AttachRopeToEntity {
            rope,
            entity,
            position,
            flag,
        });
        self.with_rope(rope, |r| {
            r.end = position;
            r.attach(entity);
        });
    }

    fn delete_rope(&self, rope: RopeId) {
        self.record(NativeCall::DeleteRope(rope));
        self.state.borrow_mut().ropes.remove(&rope);
    }

    fn detach_rope_from_entity(&self, rope: RopeId, entity: EntityHandle) {
        self.record(NativeCall::DetachRopeFromEntity { rope, entity });
        self.with_rope(rope, |r| r.attached.retain(|e| *e != entity));
    }

    fn get_rope_vertex_coord(&self, rope: RopeId, vertex: u32) -> Vector3 {
        self.record(NativeCall::GetRopeVertexCoord { rope, vertex });
        self.state
            .borrow()
            .ropes
            .get(&rope)
            .map_or(Vector3::ZERO, |r| r.vertex_coord(vertex, &self.config))
    }

    fn pin_rope_vertex(&self, rope: RopeId, vertex: u32, position: Vector3) {
        self.record(NativeCall::PinRopeVertex {
            rope,
            vertex,
            position,
        });
        self.with_rope(rope, |r| {
            r.pinned.insert(vertex, position);
        });
    }

    fn unpin_rope_vertex(&self, rope: RopeId, vertex: u32) {
        self.record(NativeCall::UnpinRopeVertex { rope, vertex });
        self.with_rope(rope, |r| {
            r.pinned.remove(&vertex);
        });
    }

    fn rope_reset_length(&self, rope: RopeId, length: f32) {
        self.record(NativeCall::RopeResetLength { rope, length });
        self.with_rope(rope, |r| r.length = length);
    }

    fn get_entity_bone_index_by_name(&self, entity: EntityHandle, bone_name: &str) -> i32 {
        self.record(NativeCall::GetEntityBoneIndexByName {
            entity,
            bone_name: bone_name.to_owned(),
        });
        self.state
            .borrow()
            .bones
            .get(&entity)
            .and_then(|bones| bones.iter().position(|b| b.name == bone_name))
            .map_or(BONE_NOT_FOUND, |i| i as i32)
    }

    fn get_world_position_of_entity_bone(&self, entity: EntityHandle, bone_index: i32) -> Vector3 {
        self.record(NativeCall::GetWorldPositionOfEntityBone { entity, bone_index });
        let state = self.state.borrow();
        usize::try_from(bone_index)
            .ok()
            .and_then(|i| state.bones.get(&entity)?.get(i))
            .map_or(Vector3::ZERO, |b| b.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(length: f32) -> NativeRopeSpawn {
        NativeRopeSpawn {
            position: Vector3::new(0.0, 0.0, 10.0),
            rotation: Vector3::ZERO,
            length,
            rope_type: 1,
            max_length: length,
            min_length: 0.0,
            init_length: 0.0,
            locked: false,
            reserved_flag: false,
            rigid: false,
            tuning: 5.0,
            break_when_shot: false,
        }
    }

    #[test]
    fn vertex_count_follows_length() {
        let natives = HeadlessNatives::new();
        let id = natives.add_rope(&spawn(2.0));
        // 2.0 / 0.5 = 4 segments
        assert_eq!(natives.get_rope_vertex_count(id), 5);

        natives.rope_force_length(id, 100.0);
        assert_eq!(natives.get_rope_vertex_count(id), 64);

        natives.rope_force_length(id, 0.0);
        assert_eq!(natives.get_rope_vertex_count(id), 2);
    }

    #[test]
    fn pinned_vertex_overrides_shape() {
        let natives = HeadlessNatives::new();
        let id = natives.add_rope(&spawn(2.0));
        assert_eq!(natives.get_rope_vertex_coord(id, 0), Vector3::new(0.0, 0.0, 10.0));
        assert_eq!(natives.get_rope_vertex_coord(id, 4), Vector3::new(0.0, 0.0, 8.0));

        let pin = Vector3::new(5.0, 5.0, 5.0);
        natives.pin_rope_vertex(id, 2, pin);
        assert_eq!(natives.get_rope_vertex_coord(id, 2), pin);

        natives.unpin_rope_vertex(id, 2);
        assert_eq!(natives.get_rope_vertex_coord(id, 2), Vector3::new(0.0, 0.0, 9.0));
    }

    #[test]
    fn unknown_bones_resolve_to_sentinel() {
        let natives = HeadlessNatives::new();
        let entity = EntityHandle(7);
        assert_eq!(natives.get_entity_bone_index_by_name(entity, "hook"), BONE_NOT_FOUND);

        let index = natives.register_bone(entity, "hook", Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(natives.get_entity_bone_index_by_name(entity, "hook"), index);
        assert_eq!(
            natives.get_world_position_of_entity_bone(entity, index),
            Vector3::new(1.0, 2.0, 3.0)
        );
        assert_eq!(natives.get_world_position_of_entity_bone(entity, BONE_NOT_FOUND), Vector3::ZERO);
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let natives = HeadlessNatives::new();
        let id = natives.add_rope(&spawn(1.0));
        natives.activate_physics(id);
        natives.delete_rope(id);

        let calls = natives.take_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls.last(), Some(&NativeCall::DeleteRope(id)));
        assert_eq!(calls.calls_for_rope(id).len(), 3);
        assert!(matches!(calls.iter().next(), Some(NativeCall::AddRope { rope, .. }) if *rope == id));
        assert!(natives.calls().is_empty());
    }

    #[test]
    fn call_log_is_bounded() {
        let natives = HeadlessNatives::with_config(HeadlessConfig {
            max_recorded_calls: 3,
            ..Default::default()
        });
        let id = natives.add_rope(&spawn(1.0));
        for _ in 0..10 {
            natives.does_rope_exist(id);
        }
        natives.delete_rope(id);

        let calls = natives.take_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls.last(), Some(&NativeCall::DeleteRope(id)));
        assert!(calls.iter().all(|c| !matches!(c, NativeCall::AddRope { .. })));
        // The replacement log keeps the configured limit.
        assert_eq!(natives.calls().limit(), 3);
    }

    #[test]
    fn zero_limit_disables_recording() {
        let natives = HeadlessNatives::with_config(HeadlessConfig {
            max_recorded_calls: 0,
            ..Default::default()
        });
        let id = natives.add_rope(&spawn(1.0));
        natives.activate_physics(id);

        assert!(natives.calls().is_empty());
        assert!(natives.rope_state(id).unwrap().physics_active);
    }
}
