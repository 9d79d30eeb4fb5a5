//! Contact notification hooks.
//!
//! Hooks are explicit opt-in: the host registers a [`ContactListener`] through
//! `World::set_contact_listener`, and unregistered hooks are never invoked. A
//! hook that panics is caught, logged, and permanently disabled for the rest
//! of the run; the simulation itself keeps going.

use glam::Vec2;
use parking_lot::Mutex;
use rapier2d::prelude::{
    ColliderHandle, ColliderSet, CollisionEvent, ContactPair, EventHandler, Real, RigidBodySet,
};

use crate::core::body::BodyId;

/// The two bodies involved in a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactInfo {
    pub body_a: BodyId,
    pub body_b: BodyId,
}

/// Geometric description of a persisting contact, in screen space.
#[derive(Debug, Clone)]
pub struct ContactManifoldInfo {
    /// World-space contact normal, pointing from the first body to the second.
    pub normal: Vec2,
    /// World-space contact points.
    pub points: Vec<Vec2>,
    /// Penetration depth per contact point; positive means overlapping.
    pub penetrations: Vec<f32>,
}

/// Impulses applied while resolving a contact.
#[derive(Debug, Clone)]
pub struct ContactImpulses {
    pub normal_impulses: Vec<f32>,
    pub tangent_impulses: Vec<f32>,
    pub total_force: f32,
}

/// Hooks invoked around each simulation step.
///
/// Every method defaults to a no-op; implement only what the host cares about.
pub trait ContactListener {
    /// Two bodies started touching during the last step.
    fn begin_contact(&mut self, _contact: &ContactInfo) {}

    /// Two bodies stopped touching during the last step.
    fn end_contact(&mut self, _contact: &ContactInfo) {}

    /// A persisting contact is about to be resolved by the upcoming step.
    fn pre_solve(&mut self, _contact: &ContactInfo, _manifold: &ContactManifoldInfo) {}

    /// A contact was resolved, with the impulses the solver applied.
    fn post_solve(&mut self, _contact: &ContactInfo, _impulses: &ContactImpulses) {}
}

/// Per-run enable flags. A disabled hook stays disabled until the world is dropped.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HookSet {
    pub begin: bool,
    pub end: bool,
    pub pre: bool,
    pub post: bool,
}

impl Default for HookSet {
    fn default() -> Self {
        Self {
            begin: true,
            end: true,
            pre: true,
            post: true,
        }
    }
}

pub(crate) struct CollisionRecord {
    pub a: ColliderHandle,
    pub b: ColliderHandle,
    pub started: bool,
}

pub(crate) struct ForceRecord {
    pub a: ColliderHandle,
    pub b: ColliderHandle,
    pub normal_impulses: Vec<f32>,
    pub tangent_impulses: Vec<f32>,
    pub total_force: f32,
}

/// Collects engine events during a step for post-step dispatch.
///
/// The engine's event-handler trait takes `&self`, so the buffers sit behind a
/// mutex even though the world itself is single-threaded.
#[derive(Default)]
pub(crate) struct EventCollector {
    collisions: Mutex<Vec<CollisionRecord>>,
    forces: Mutex<Vec<ForceRecord>>,
}

impl EventCollector {
    pub fn drain(&self) -> (Vec<CollisionRecord>, Vec<ForceRecord>) {
        (
            std::mem::take(&mut *self.collisions.lock()),
            std::mem::take(&mut *self.forces.lock()),
        )
    }
}

impl EventHandler for EventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        let (a, b, started) = match event {
            CollisionEvent::Started(a, b, _) => (a, b, true),
            CollisionEvent::Stopped(a, b, _) => (a, b, false),
        };
        self.collisions.lock().push(CollisionRecord { a, b, started });
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        contact_pair: &ContactPair,
        total_force_magnitude: Real,
    ) {
        let mut normal_impulses = Vec::new();
        let mut tangent_impulses = Vec::new();
        for manifold in &contact_pair.manifolds {
            for point in &manifold.points {
                normal_impulses.push(point.data.impulse);
                tangent_impulses.push(point.data.tangent_impulse.x);
            }
        }
        self.forces.lock().push(ForceRecord {
            a: contact_pair.collider1,
            b: contact_pair.collider2,
            normal_impulses,
            tangent_impulses,
            total_force: total_force_magnitude,
        });
    }
}
