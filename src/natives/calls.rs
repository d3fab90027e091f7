use crate::math::Vector3;
use crate::natives::{EntityHandle, NativeRopeSpawn, RopeId};
use std::collections::VecDeque;

/// One native invocation, with the arguments it was given
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    RopeAreTexturesLoaded,
    RopeLoadTextures,
    /// `rope` is the identifier the engine handed back
    AddRope { spawn: NativeRopeSpawn, rope: RopeId },
    DoesRopeExist(RopeId),
    RopeForceLength { rope: RopeId, length: f32 },
    GetRopeVertexCount(RopeId),
    ActivatePhysics(RopeId),
    AttachEntitiesToRope {
        rope: RopeId,
        entity_a: EntityHandle,
        entity_b: EntityHandle,
        position_a: Vector3,
        position_b: Vector3,
        length: f32,
        flag_a: bool,
        flag_b: bool,
        bone_name_a: Option<String>,
        bone_name_b: Option<String>,
    },
    AttachRopeToEntity { rope: RopeId, entity: EntityHandle, position: Vector3, flag: bool },
    DeleteRope(RopeId),
    DetachRopeFromEntity { rope: RopeId, entity: EntityHandle },
    GetRopeVertexCoord { rope: RopeId, vertex: u32 },
    PinRopeVertex { rope: RopeId, vertex: u32, position: Vector3 },
    UnpinRopeVertex { rope: RopeId, vertex: u32 },
    RopeResetLength { rope: RopeId, length: f32 },
    GetEntityBoneIndexByName { entity: EntityHandle, bone_name: String },
    GetWorldPositionOfEntityBone { entity: EntityHandle, bone_index: i32 },
}

impl NativeCall {
    /// The rope this call addresses, if any
    pub fn rope(&self) -> Option<RopeId> {
        match self {
            NativeCall::DoesRopeExist(rope)
            | NativeCall::GetRopeVertexCount(rope)
            | NativeCall::ActivatePhysics(rope)
            | NativeCall::DeleteRope(rope)
            | NativeCall::AddRope { rope, .. }
            | NativeCall::RopeForceLength { rope, .. }
            | NativeCall::AttachEntitiesToRope { rope, .. }
            | NativeCall::AttachRopeToEntity { rope, .. }
            | NativeCall::DetachRopeFromEntity { rope, .. }
            | NativeCall::GetRopeVertexCoord { rope, .. }
            | NativeCall::PinRopeVertex { rope, .. }
            | NativeCall::UnpinRopeVertex { rope, .. }
            | NativeCall::RopeResetLength { rope, .. } => Some(*rope),
            _ => None,
        }
    }

    /// Whether this call attaches a rope to one or two entities
    pub fn is_attach(&self) -> bool {
        matches!(
            self,
            NativeCall::AttachEntitiesToRope { .. } | NativeCall::AttachRopeToEntity { .. }
        )
    }
}

/// An ordered record of native calls.
///
/// Holds at most `limit` calls; recording past the limit drops the oldest
/// entry. A limit of 0 records nothing.
#[derive(Debug, Clone)]
pub struct CallLog {
    calls: VecDeque<NativeCall>,
    limit: usize,
}

impl Default for CallLog {
    fn default() -> Self {
        Self::new()
    }
}

impl CallLog {
    /// Creates a new empty log with no size limit
    pub fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    /// Creates a new empty log keeping at most `limit` calls
    pub fn with_limit(limit: usize) -> Self {
        Self {
            calls: VecDeque::new(),
            limit,
        }
    }

    /// Maximum number of calls kept
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Appends a call, evicting the oldest one when full
    pub fn record(&mut self, call: NativeCall) {
        if self.limit == 0 {
            return;
        }
        while self.calls.len() >= self.limit {
            self.calls.pop_front();
        }
        self.calls.push_back(call);
    }

    /// Number of recorded calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Clears all recorded calls
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Iterates calls oldest first
    pub fn iter(&self) -> impl Iterator<Item = &NativeCall> {
        self.calls.iter()
    }

    /// Gets all calls that address a specific rope
    pub fn calls_for_rope(&self, rope: RopeId) -> Vec<&NativeCall> {
        self.calls
            .iter()
            .filter(|c| c.rope() == Some(rope))
            .collect()
    }

    /// Counts the calls matching a predicate
    pub fn count_where(&self, predicate: impl Fn(&NativeCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    /// The most recent call
    pub fn last(&self) -> Option<&NativeCall> {
        self.calls.back()
    }
}
