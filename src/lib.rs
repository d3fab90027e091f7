//! Typed rope handles over a host simulation engine's native rope
//! primitives.
//!
//! The engine owns every rope. A [`Rope`] only carries the engine's
//! identifier and a nominal length, validates what it can before calling
//! into [`RopeNatives`], and reports failures as [`error::RopeError`] plus a
//! `tracing` warning.

pub mod math;
pub mod natives;
pub mod rope;

/// Re-export common types for easier usage
pub use crate::natives::{EntityHandle, HeadlessNatives, RopeId, RopeNatives};
pub use crate::rope::{calc_rope_length, Rope, RopeConfig, RopeFlags, RopeKind};
pub use crate::math::Vector3;

/// Error types for rope handles
pub mod error {
    use crate::natives::RopeId;
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum RopeError {
        #[error("invalid rope type {0}: rope types of 0 or less crash the engine")]
        InvalidRopeType(i32),

        #[error("rope {0} does not exist")]
        RopeNotFound(RopeId),

        #[error("bone not found (bone index a: {bone_a}, bone index b: {bone_b})")]
        BoneNotFound { bone_a: i32, bone_b: i32 },
    }
}

/// Result type for rope operations
pub type Result<T> = std::result::Result<T, error::RopeError>;
