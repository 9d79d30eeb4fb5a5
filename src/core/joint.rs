use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::BodyId;
use crate::utils::arena::SlotId;

/// Identifier of a joint registered with a [`World`](crate::World).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct JointId(pub(crate) SlotId);

impl JointId {
    /// Id that refers to no joint.
    pub const NULL: JointId = JointId(SlotId::NULL);

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// Description of a joint to stage into the world.
///
/// Anchors and targets are screen-space, local to the respective body origin
/// for the two-body variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JointDef {
    /// Rigidly locks two bodies together at the given local anchors.
    Fixed {
        body_a: BodyId,
        body_b: BodyId,
        anchor_a: Vec2,
        anchor_b: Vec2,
    },
    /// Hinge: allows free relative rotation around the anchor points.
    Revolute {
        body_a: BodyId,
        body_b: BodyId,
        anchor_a: Vec2,
        anchor_b: Vec2,
    },
    /// Spring maintaining a rest length between two local anchors.
    Spring {
        body_a: BodyId,
        body_b: BodyId,
        anchor_a: Vec2,
        anchor_b: Vec2,
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    },
    /// Spring tying a body point to a movable world-space target.
    ///
    /// Stiffness is derived from the body mass so the response is governed by
    /// an oscillation frequency and damping ratio. This is the constraint the
    /// grab machinery creates, but it is useful on its own.
    TargetSpring {
        body: BodyId,
        target: Vec2,
        /// Attachment point on the body, in body-local screen units.
        local_anchor: Vec2,
        frequency: f32,
        damping_ratio: f32,
    },
}

impl JointDef {
    /// The bodies this joint constrains.
    pub fn bodies(&self) -> (BodyId, Option<BodyId>) {
        match *self {
            JointDef::Fixed { body_a, body_b, .. }
            | JointDef::Revolute { body_a, body_b, .. }
            | JointDef::Spring { body_a, body_b, .. } => (body_a, Some(body_b)),
            JointDef::TargetSpring { body, .. } => (body, None),
        }
    }

    /// Whether this joint constrains the given body.
    pub fn references(&self, id: BodyId) -> bool {
        let (a, b) = self.bodies();
        a == id || b == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_spring_references_only_its_body() {
        let def = JointDef::TargetSpring {
            body: BodyId::NULL,
            target: Vec2::ZERO,
            local_anchor: Vec2::ZERO,
            frequency: 3.0,
            damping_ratio: 0.1,
        };
        assert!(def.references(BodyId::NULL));
        assert_eq!(def.bodies().1, None);
    }
}
