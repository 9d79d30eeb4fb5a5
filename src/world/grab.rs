//! Mouse-style grab-and-drag interaction.
//!
//! At most one grab is live at a time. Dynamic bodies are pulled toward the
//! drag target through a temporary [`JointDef::TargetSpring`]; static bodies
//! are repositioned directly. A staged removal of the grabbed body forces the
//! release within the same commit.

use glam::Vec2;

use crate::config::{DEFAULT_QUERY_CAP, GRAB_DAMPING_RATIO, GRAB_FREQUENCY_HZ};
use crate::core::body::BodyId;
use crate::core::joint::{JointDef, JointId};

use super::World;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum GrabState {
    #[default]
    Idle,
    Grabbed {
        body: BodyId,
        /// Screen-space offset from the grab point to the body origin, kept so
        /// a dragged static body moves rigidly instead of snapping its origin
        /// to the cursor.
        offset: Vec2,
        /// Null for static bodies, which need no spring.
        joint: JointId,
    },
}

impl GrabState {
    pub fn body(&self) -> Option<BodyId> {
        match self {
            GrabState::Idle => None,
            GrabState::Grabbed { body, .. } => Some(*body),
        }
    }
}

impl World {
    /// Grabs the topmost grabbable body at `point` (screen space). Returns
    /// `None` and changes nothing when nothing grabbable is there or a grab is
    /// already live.
    pub fn grab(&mut self, point: Vec2) -> Option<BodyId> {
        if !matches!(self.grab, GrabState::Idle) {
            return None;
        }
        let body = self
            .query_point(point, true, DEFAULT_QUERY_CAP)
            .into_iter()
            .find(|id| {
                self.registry
                    .get(id.0)
                    .is_some_and(|entry| entry.def.grabbable)
            })?;
        let offset = point - self.position(body)?;

        let joint = if self.is_static(body) {
            JointId::NULL
        } else {
            // Attach the spring where the body was grabbed, expressed in its
            // local frame so the anchor stays put as the body rotates.
            let rotation = self.rotation(body).unwrap_or(0.0);
            let local_anchor = Vec2::from_angle(-rotation).rotate(offset);
            let joint = self.add_joint(JointDef::TargetSpring {
                body,
                target: point,
                local_anchor,
                frequency: GRAB_FREQUENCY_HZ,
                damping_ratio: GRAB_DAMPING_RATIO,
            });
            if joint.is_null() {
                return None;
            }
            joint
        };
        self.grab = GrabState::Grabbed {
            body,
            offset,
            joint,
        };
        log::debug!("grabbed body {body:?} at {point}");
        Some(body)
    }

    /// Moves the grab target to `point` (screen space). No-op while idle.
    pub fn drag(&mut self, point: Vec2) {
        let GrabState::Grabbed {
            body,
            offset,
            joint,
        } = self.grab
        else {
            return;
        };

        if self.is_static(body) {
            self.set_position(body, point - offset);
            return;
        }

        let Some(entry) = self.joints.get_mut(joint.0) else {
            return;
        };
        if let JointDef::TargetSpring { target, .. } = &mut entry.def {
            *target = point;
        }
        if let Some(anchor) = entry.anchor {
            // Live spring: steer the kinematic anchor so the solver does the
            // pulling. While the joint is still staged, updating the
            // definition above is enough.
            let sim = self.scale.vec_to_sim(point);
            if let Some(rb) = self.bodies.get_mut(anchor) {
                rb.set_next_kinematic_translation(sim);
            }
        }
    }

    /// Releases the current grab, staging removal of the temporary spring.
    /// No-op while idle.
    pub fn release(&mut self) {
        let state = std::mem::take(&mut self.grab);
        if let GrabState::Grabbed { body, joint, .. } = state {
            if !joint.is_null() {
                self.remove_joint(joint);
            }
            log::debug!("released body {body:?}");
        }
    }

    /// The body currently held, if any.
    pub fn grabbed_body(&self) -> Option<BodyId> {
        self.grab.body()
    }

    /// Immediate release used when the grabbed body's removal commits; the
    /// spring and its anchor must not outlive the body within the same batch.
    pub(crate) fn force_release_grab(&mut self) {
        let state = std::mem::take(&mut self.grab);
        if let GrabState::Grabbed { joint, .. } = state {
            if !joint.is_null() {
                self.apply_remove_joint(joint);
            }
        }
    }
}
