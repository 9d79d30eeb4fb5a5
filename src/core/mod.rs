//! Core types describing bodies, joints, and shared definitions.

pub mod body;
pub mod joint;

pub use body::{BodyDef, BodyId, BodyKind, BodyState, Material, ShapeDef};
pub use joint::{JointDef, JointId};
