//! The simulation world.
//!
//! `World` owns every engine structure (body/collider/joint sets, pipelines),
//! the registry mapping stable ids to engine handles, the staged-change queue,
//! the grab state, and the optional contact listener. All positions, sizes,
//! and velocities crossing this boundary are screen-space; conversion happens
//! exactly once, through the world's [`Scale`].

mod grab;
mod query;
mod staging;

use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};

use glam::Vec2;
use rapier2d::na::{Point2, Vector2};
use rapier2d::prelude::{
    ActiveEvents, CCDSolver, ColliderHandle, ColliderSet, DefaultBroadPhase, FixedJointBuilder,
    ImpulseJointHandle, ImpulseJointSet, IntegrationParameters, IslandManager, LockedAxes,
    MultibodyJointSet, NarrowPhase, PhysicsPipeline, QueryPipeline, RevoluteJointBuilder,
    RigidBody, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType, SpringJointBuilder,
};

use crate::config::{
    DEFAULT_EDGE_FRICTION, DEFAULT_EDGE_RESTITUTION, DEFAULT_GRAVITY, DEFAULT_SOLVER_ITERATIONS,
    DEFAULT_TIME_STEP, EDGE_THICKNESS,
};
use crate::core::body::{BodyDef, BodyId, BodyKind, BodyState};
use crate::core::joint::{JointDef, JointId};
use crate::events::{
    ContactImpulses, ContactInfo, ContactListener, ContactManifoldInfo, EventCollector, HookSet,
};
use crate::units::Scale;
use crate::utils::arena::{Arena, SlotId};
use crate::utils::logging::ScopedTimer;

pub use self::query::RaycastHit;
use self::grab::GrabState;
use self::staging::{ChangeQueue, StagedChange};

/// Registry entry for a body. `rb` is `None` while the addition is staged.
pub(crate) struct BodyEntry {
    pub def: BodyDef,
    pub rb: Option<RigidBodyHandle>,
    pub collider: Option<ColliderHandle>,
}

/// Registry entry for a joint. `anchor` is the kinematic body backing a
/// target spring, owned by this entry.
pub(crate) struct JointEntry {
    pub def: JointDef,
    pub handle: Option<ImpulseJointHandle>,
    pub anchor: Option<RigidBodyHandle>,
}

struct EdgeWalls {
    bodies: Vec<BodyId>,
}

/// A sketch-friendly 2D physics world.
pub struct World {
    scale: Scale,
    /// Gravity in simulation units, converted once on set.
    gravity: Vector2<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    registry: Arena<BodyEntry>,
    joints: Arena<JointEntry>,
    staged: ChangeQueue,
    grab: GrabState,
    listener: Option<Box<dyn ContactListener>>,
    hooks: HookSet,
    collector: EventCollector,
    edges: Option<EdgeWalls>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Scale::default())
    }
}

impl World {
    /// Creates an empty world with the given conversion policy and the default
    /// y-down gravity.
    pub fn new(scale: Scale) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = DEFAULT_TIME_STEP;
        integration_parameters.num_solver_iterations =
            NonZeroUsize::new(DEFAULT_SOLVER_ITERATIONS).unwrap_or(NonZeroUsize::MIN);
        let gravity = scale.vec_to_sim(Vec2::new(DEFAULT_GRAVITY[0], DEFAULT_GRAVITY[1]));

        Self {
            scale,
            gravity,
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            registry: Arena::new(),
            joints: Arena::new(),
            staged: ChangeQueue::default(),
            grab: GrabState::Idle,
            listener: None,
            hooks: HookSet::default(),
            collector: EventCollector::default(),
            edges: None,
        }
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    // ---- staging -----------------------------------------------------------

    /// Registers a body and stages its addition. The returned id is stable
    /// immediately; the engine body exists after the next commit.
    pub fn add_body(&mut self, def: BodyDef) -> BodyId {
        let id = BodyId(self.registry.insert(BodyEntry {
            def,
            rb: None,
            collider: None,
        }));
        self.staged.push(StagedChange::AddBody(id));
        id
    }

    /// Stages removal of a body. Null or unknown ids are silently ignored.
    pub fn remove_body(&mut self, id: BodyId) {
        if self.registry.get(id.0).is_none() {
            return;
        }
        self.staged.push(StagedChange::RemoveBody(id));
    }

    /// Registers a joint and stages its addition. Definitions referencing a
    /// null or unknown body are refused and return [`JointId::NULL`].
    pub fn add_joint(&mut self, def: JointDef) -> JointId {
        let (a, b) = def.bodies();
        let known = |id: BodyId| self.registry.get(id.0).is_some();
        if !known(a) || b.is_some_and(|b| !known(b)) {
            log::warn!("refused joint referencing an unknown body");
            return JointId::NULL;
        }
        let id = JointId(self.joints.insert(JointEntry {
            def,
            handle: None,
            anchor: None,
        }));
        self.staged.push(StagedChange::AddJoint(id));
        id
    }

    /// Stages removal of a joint. Null or unknown ids are silently ignored.
    pub fn remove_joint(&mut self, id: JointId) {
        if self.joints.get(id.0).is_none() {
            return;
        }
        self.staged.push(StagedChange::RemoveJoint(id));
    }

    /// Number of staged changes awaiting commit.
    pub fn pending_changes(&self) -> usize {
        self.staged.len()
    }

    /// Applies every staged change, strictly FIFO. Called automatically at the
    /// start of `step` and `snapshot`; exposed for hosts with their own loop.
    pub fn commit_staged(&mut self) {
        let Some(mut batch) = self.staged.begin_commit() else {
            log::warn!("refused reentrant commit of staged changes");
            return;
        };
        if !batch.is_empty() {
            log::debug!("committing {} staged changes", batch.len());
        }
        while let Some(change) = batch.pop_front() {
            match change {
                StagedChange::AddBody(id) => self.apply_add_body(id),
                StagedChange::RemoveBody(id) => self.apply_remove_body(id),
                StagedChange::AddJoint(id) => self.apply_add_joint(id),
                StagedChange::RemoveJoint(id) => self.apply_remove_joint(id),
            }
        }
        self.staged.end_commit();
    }

    fn apply_add_body(&mut self, id: BodyId) {
        let Some(entry) = self.registry.get(id.0) else {
            return;
        };
        if entry.rb.is_some() {
            return;
        }
        let def = entry.def.clone();

        let kind = match def.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Static => RigidBodyType::Fixed,
            BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
        };
        let mut builder = RigidBodyBuilder::new(kind)
            .translation(self.scale.vec_to_sim(def.position))
            .rotation(def.rotation)
            .linvel(self.scale.vec_to_sim(def.velocity))
            .linear_damping(def.linear_damping)
            .angular_damping(def.angular_damping)
            .ccd_enabled(def.bullet)
            .user_data(pack_user_data(id));
        if def.fixed_rotation {
            builder = builder.locked_axes(LockedAxes::ROTATION_LOCKED);
        }
        let rb = self.bodies.insert(builder);

        let collider = match def.shape.to_collider(&self.scale) {
            Some(shape) => {
                let shape = shape
                    .density(def.material.density)
                    .friction(def.material.friction)
                    .restitution(def.material.restitution)
                    .sensor(def.sensor)
                    .active_events(
                        ActiveEvents::COLLISION_EVENTS | ActiveEvents::CONTACT_FORCE_EVENTS,
                    )
                    .contact_force_event_threshold(0.0)
                    .user_data(pack_user_data(id));
                Some(self.colliders.insert_with_parent(shape, rb, &mut self.bodies))
            }
            None => {
                log::warn!("degenerate shape; body committed without collision geometry");
                None
            }
        };

        if let Some(entry) = self.registry.get_mut(id.0) {
            entry.rb = Some(rb);
            entry.collider = collider;
        }
    }

    fn apply_remove_body(&mut self, id: BodyId) {
        // The grab must let go before its body disappears, within this commit.
        if self.grab.body() == Some(id) {
            self.force_release_grab();
        }
        let Some(entry) = self.registry.remove(id.0) else {
            return;
        };
        if let Some(rb) = entry.rb {
            self.bodies.remove(
                rb,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        let stale: Vec<JointId> = self
            .joints
            .ids()
            .filter(|sid| {
                self.joints
                    .get(*sid)
                    .is_some_and(|entry| entry.def.references(id))
            })
            .map(JointId)
            .collect();
        for joint in stale {
            self.apply_remove_joint(joint);
        }
    }

    fn apply_add_joint(&mut self, id: JointId) {
        let Some(entry) = self.joints.get(id.0) else {
            return;
        };
        if entry.handle.is_some() {
            return;
        }
        let def = entry.def.clone();

        let live = |world: &Self, id: BodyId| world.registry.get(id.0).and_then(|entry| entry.rb);
        let (handle, anchor) = match def {
            JointDef::Fixed {
                body_a,
                body_b,
                anchor_a,
                anchor_b,
            } => {
                let (Some(a), Some(b)) = (live(self, body_a), live(self, body_b)) else {
                    log::warn!("dropping joint on a body that never became live");
                    self.joints.remove(id.0);
                    return;
                };
                let joint = FixedJointBuilder::new()
                    .local_anchor1(self.scale.point_to_sim(anchor_a))
                    .local_anchor2(self.scale.point_to_sim(anchor_b))
                    .build();
                (self.impulse_joints.insert(a, b, joint, true), None)
            }
            JointDef::Revolute {
                body_a,
                body_b,
                anchor_a,
                anchor_b,
            } => {
                let (Some(a), Some(b)) = (live(self, body_a), live(self, body_b)) else {
                    log::warn!("dropping joint on a body that never became live");
                    self.joints.remove(id.0);
                    return;
                };
                let joint = RevoluteJointBuilder::new()
                    .local_anchor1(self.scale.point_to_sim(anchor_a))
                    .local_anchor2(self.scale.point_to_sim(anchor_b))
                    .build();
                (self.impulse_joints.insert(a, b, joint, true), None)
            }
            JointDef::Spring {
                body_a,
                body_b,
                anchor_a,
                anchor_b,
                rest_length,
                stiffness,
                damping,
            } => {
                let (Some(a), Some(b)) = (live(self, body_a), live(self, body_b)) else {
                    log::warn!("dropping joint on a body that never became live");
                    self.joints.remove(id.0);
                    return;
                };
                let joint =
                    SpringJointBuilder::new(self.scale.to_sim(rest_length), stiffness, damping)
                        .local_anchor1(self.scale.point_to_sim(anchor_a))
                        .local_anchor2(self.scale.point_to_sim(anchor_b))
                        .build();
                (self.impulse_joints.insert(a, b, joint, true), None)
            }
            JointDef::TargetSpring {
                body,
                target,
                local_anchor,
                frequency,
                damping_ratio,
            } => {
                let Some(b) = live(self, body) else {
                    log::warn!("dropping joint on a body that never became live");
                    self.joints.remove(id.0);
                    return;
                };
                let target_sim = self.scale.point_to_sim(target);
                // Spring coefficients from the body mass so the response is an
                // oscillation frequency plus a damping ratio.
                let mass = self.bodies.get(b).map(RigidBody::mass).unwrap_or(1.0);
                let mass = if mass > 0.0 { mass } else { 1.0 };
                let omega = std::f32::consts::TAU * frequency;
                let stiffness = mass * omega * omega;
                let damping = 2.0 * mass * damping_ratio * omega;

                let anchor = self
                    .bodies
                    .insert(RigidBodyBuilder::kinematic_position_based().translation(target_sim.coords));
                let joint = SpringJointBuilder::new(0.0, stiffness, damping)
                    .local_anchor1(Point2::origin())
                    .local_anchor2(self.scale.point_to_sim(local_anchor))
                    .build();
                (self.impulse_joints.insert(anchor, b, joint, true), Some(anchor))
            }
        };

        if let Some(entry) = self.joints.get_mut(id.0) {
            entry.handle = Some(handle);
            entry.anchor = anchor;
        }
    }

    fn apply_remove_joint(&mut self, id: JointId) {
        let Some(entry) = self.joints.remove(id.0) else {
            return;
        };
        if let Some(handle) = entry.handle {
            // Already gone when the engine removed it with an attached body.
            self.impulse_joints.remove(handle, true);
        }
        if let Some(anchor) = entry.anchor {
            self.bodies.remove(
                anchor,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
    }

    // ---- stepping ----------------------------------------------------------

    /// Advances the world by the default timestep (1/60 s).
    pub fn step(&mut self) {
        self.step_with(DEFAULT_TIME_STEP, DEFAULT_SOLVER_ITERATIONS);
    }

    /// Advances the world by `dt` seconds.
    pub fn step_dt(&mut self, dt: f32) {
        self.step_with(dt, DEFAULT_SOLVER_ITERATIONS);
    }

    /// Advances the world by `dt` seconds with an explicit solver iteration
    /// count. Non-positive `dt` falls back to the default; `iterations` is
    /// clamped to at least one.
    pub fn step_with(&mut self, dt: f32, iterations: usize) {
        let _timer = ScopedTimer::new("world_step");
        self.commit_staged();
        self.dispatch_pre_solve();

        self.integration_parameters.dt = if dt > 0.0 { dt } else { DEFAULT_TIME_STEP };
        self.integration_parameters.num_solver_iterations =
            NonZeroUsize::new(iterations).unwrap_or(NonZeroUsize::MIN);

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.collector,
        );

        self.dispatch_collected_events();
    }

    /// Commits staged changes and returns the render-agnostic state of every
    /// live body. This is the draw-time safe point.
    pub fn snapshot(&mut self) -> Vec<BodyState> {
        let _timer = ScopedTimer::new("world_snapshot");
        self.commit_staged();
        self.registry
            .ids()
            .filter_map(|sid| {
                let entry = self.registry.get(sid)?;
                let (position, rotation) = match entry.rb.and_then(|h| self.bodies.get(h)) {
                    Some(rb) => (
                        self.scale.vec_to_screen(rb.translation()),
                        rb.rotation().angle(),
                    ),
                    None => (entry.def.position, entry.def.rotation),
                };
                Some(BodyState {
                    id: BodyId(sid),
                    kind: entry.def.kind,
                    shape: entry.def.shape.clone(),
                    position,
                    rotation,
                })
            })
            .collect()
    }

    // ---- body access -------------------------------------------------------

    fn live_body(&self, id: BodyId) -> Option<&RigidBody> {
        self.registry
            .get(id.0)?
            .rb
            .and_then(|handle| self.bodies.get(handle))
    }

    fn live_body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        let handle = self.registry.get(id.0)?.rb?;
        self.bodies.get_mut(handle)
    }

    /// Screen-space position of the body origin. Pending bodies report their
    /// staged definition.
    pub fn position(&self, id: BodyId) -> Option<Vec2> {
        let entry = self.registry.get(id.0)?;
        Some(match self.live_body(id) {
            Some(rb) => self.scale.vec_to_screen(rb.translation()),
            None => entry.def.position,
        })
    }

    /// Rotation in radians.
    pub fn rotation(&self, id: BodyId) -> Option<f32> {
        let entry = self.registry.get(id.0)?;
        Some(match self.live_body(id) {
            Some(rb) => rb.rotation().angle(),
            None => entry.def.rotation,
        })
    }

    /// Screen-space linear velocity.
    pub fn linear_velocity(&self, id: BodyId) -> Option<Vec2> {
        let entry = self.registry.get(id.0)?;
        Some(match self.live_body(id) {
            Some(rb) => self.scale.vec_to_screen(rb.linvel()),
            None => entry.def.velocity,
        })
    }

    /// Teleports the body to a screen-space position, waking it.
    pub fn set_position(&mut self, id: BodyId, position: Vec2) {
        let sim = self.scale.vec_to_sim(position);
        if let Some(rb) = self.live_body_mut(id) {
            rb.set_translation(sim, true);
        } else if let Some(entry) = self.registry.get_mut(id.0) {
            entry.def.position = position;
        }
    }

    pub fn set_linear_velocity(&mut self, id: BodyId, velocity: Vec2) {
        let sim = self.scale.vec_to_sim(velocity);
        if let Some(rb) = self.live_body_mut(id) {
            rb.set_linvel(sim, true);
        } else if let Some(entry) = self.registry.get_mut(id.0) {
            entry.def.velocity = velocity;
        }
    }

    /// Applies a continuous force (screen units) active until the next step.
    pub fn apply_force(&mut self, id: BodyId, force: Vec2) {
        let sim = self.scale.vec_to_sim(force);
        if let Some(rb) = self.live_body_mut(id) {
            rb.add_force(sim, true);
        }
    }

    /// Applies an instantaneous impulse (screen units).
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        let sim = self.scale.vec_to_sim(impulse);
        if let Some(rb) = self.live_body_mut(id) {
            rb.apply_impulse(sim, true);
        }
    }

    pub fn is_static(&self, id: BodyId) -> bool {
        self.registry
            .get(id.0)
            .is_some_and(|entry| entry.def.kind == BodyKind::Static)
    }

    /// Whether the body's engine counterpart exists (its addition committed).
    pub fn is_live(&self, id: BodyId) -> bool {
        self.registry
            .get(id.0)
            .is_some_and(|entry| entry.rb.is_some())
    }

    pub fn set_grabbable(&mut self, id: BodyId, grabbable: bool) {
        if let Some(entry) = self.registry.get_mut(id.0) {
            entry.def.grabbable = grabbable;
        }
    }

    pub fn set_friction(&mut self, id: BodyId, friction: f32) {
        let Some(entry) = self.registry.get_mut(id.0) else {
            return;
        };
        entry.def.material.friction = friction;
        if let Some(handle) = entry.collider {
            if let Some(collider) = self.colliders.get_mut(handle) {
                collider.set_friction(friction);
            }
        }
    }

    pub fn set_restitution(&mut self, id: BodyId, restitution: f32) {
        let Some(entry) = self.registry.get_mut(id.0) else {
            return;
        };
        entry.def.material.restitution = restitution;
        if let Some(handle) = entry.collider {
            if let Some(collider) = self.colliders.get_mut(handle) {
                collider.set_restitution(restitution);
            }
        }
    }

    // ---- world-level controls ----------------------------------------------

    /// Sets gravity in screen units per second squared (y-down by default).
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = self.scale.vec_to_sim(gravity);
    }

    /// Gravity in screen units.
    pub fn gravity(&self) -> Vec2 {
        self.scale.vec_to_screen(&self.gravity)
    }

    /// Surrounds the given screen-space rectangle with four static,
    /// non-grabbable walls. Replaces any previous edges.
    pub fn set_edges(&mut self, top_left: Vec2, bottom_right: Vec2) {
        self.clear_edges();

        let t = EDGE_THICKNESS;
        let size = bottom_right - top_left;
        let center = (top_left + bottom_right) * 0.5;
        let defs = [
            BodyDef::rect(size.x + 2.0 * t, t)
                .with_position(Vec2::new(center.x, top_left.y - t * 0.5)),
            BodyDef::rect(size.x + 2.0 * t, t)
                .with_position(Vec2::new(center.x, bottom_right.y + t * 0.5)),
            BodyDef::rect(t, size.y).with_position(Vec2::new(top_left.x - t * 0.5, center.y)),
            BodyDef::rect(t, size.y).with_position(Vec2::new(bottom_right.x + t * 0.5, center.y)),
        ];
        let bodies = defs
            .into_iter()
            .map(|def| {
                self.add_body(
                    def.fixed()
                        .with_grabbable(false)
                        .with_friction(DEFAULT_EDGE_FRICTION)
                        .with_restitution(DEFAULT_EDGE_RESTITUTION),
                )
            })
            .collect();
        self.edges = Some(EdgeWalls { bodies });
    }

    /// Ids of the current edge walls, empty if none were created.
    pub fn edges(&self) -> &[BodyId] {
        self.edges
            .as_ref()
            .map(|edges| edges.bodies.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_edges_friction(&mut self, friction: f32) {
        let ids: Vec<BodyId> = self.edges().to_vec();
        for id in ids {
            self.set_friction(id, friction);
        }
    }

    pub fn set_edges_restitution(&mut self, restitution: f32) {
        let ids: Vec<BodyId> = self.edges().to_vec();
        for id in ids {
            self.set_restitution(id, restitution);
        }
    }

    fn clear_edges(&mut self) {
        if let Some(edges) = self.edges.take() {
            for id in edges.bodies {
                self.remove_body(id);
            }
        }
    }

    /// Stages removal of every joint and body.
    pub fn clear(&mut self) {
        self.edges = None;
        let joints: Vec<SlotId> = self.joints.ids().collect();
        for sid in joints {
            self.staged.push(StagedChange::RemoveJoint(JointId(sid)));
        }
        let bodies: Vec<SlotId> = self.registry.ids().collect();
        for sid in bodies {
            self.staged.push(StagedChange::RemoveBody(BodyId(sid)));
        }
    }

    /// Number of registered bodies, staged additions included.
    pub fn body_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of registered joints, staged additions included.
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Pairs of bodies currently touching, as of the last step.
    pub fn contacts(&self) -> Vec<ContactInfo> {
        self.narrow_phase
            .contact_pairs()
            .filter(|pair| pair.has_any_active_contact)
            .filter_map(|pair| {
                Some(ContactInfo {
                    body_a: self.body_id_of_collider(pair.collider1)?,
                    body_b: self.body_id_of_collider(pair.collider2)?,
                })
            })
            .collect()
    }

    // ---- contact listener --------------------------------------------------

    /// Installs the contact listener. Hooks are invoked only while one is set.
    pub fn set_contact_listener(&mut self, listener: impl ContactListener + 'static) {
        self.listener = Some(Box::new(listener));
        self.hooks = HookSet::default();
    }

    pub fn clear_contact_listener(&mut self) {
        self.listener = None;
    }

    fn body_id_of_collider(&self, handle: ColliderHandle) -> Option<BodyId> {
        self.colliders
            .get(handle)
            .and_then(|collider| unpack_user_data(collider.user_data))
    }

    /// Notifies the listener of every persisting contact before the solver
    /// runs on it.
    fn dispatch_pre_solve(&mut self) {
        if self.listener.is_none() || !self.hooks.pre {
            return;
        }
        let mut batch: Vec<(ContactInfo, ContactManifoldInfo)> = Vec::new();
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let (Some(body_a), Some(body_b)) = (
                self.body_id_of_collider(pair.collider1),
                self.body_id_of_collider(pair.collider2),
            ) else {
                continue;
            };
            let Some(first) = self.colliders.get(pair.collider1) else {
                continue;
            };
            let mut normal = Vec2::ZERO;
            let mut points = Vec::new();
            let mut penetrations = Vec::new();
            for manifold in &pair.manifolds {
                normal = Vec2::new(manifold.data.normal.x, manifold.data.normal.y);
                for point in manifold.points.iter().filter(|p| p.dist <= 0.0) {
                    let world = first.position() * point.local_p1;
                    points.push(self.scale.point_to_screen(&world));
                    penetrations.push(self.scale.to_screen(-point.dist));
                }
            }
            batch.push((
                ContactInfo { body_a, body_b },
                ContactManifoldInfo {
                    normal,
                    points,
                    penetrations,
                },
            ));
        }
        if batch.is_empty() {
            return;
        }

        let Some(mut listener) = self.listener.take() else {
            return;
        };
        for (info, manifold) in &batch {
            invoke_hook(&mut self.hooks.pre, "pre_solve", || {
                listener.pre_solve(info, manifold)
            });
        }
        self.listener = Some(listener);
    }

    /// Dispatches begin/end contact and post-solve notifications collected
    /// during the step, in arrival order.
    fn dispatch_collected_events(&mut self) {
        let (collisions, forces) = self.collector.drain();
        if self.listener.is_none() {
            return;
        }

        let mut events: Vec<(ContactInfo, bool)> = Vec::new();
        for record in collisions {
            // Colliders of removed bodies are already gone; nothing to report.
            let (Some(body_a), Some(body_b)) = (
                self.body_id_of_collider(record.a),
                self.body_id_of_collider(record.b),
            ) else {
                continue;
            };
            events.push((ContactInfo { body_a, body_b }, record.started));
        }
        let mut impulses: Vec<(ContactInfo, ContactImpulses)> = Vec::new();
        for record in forces {
            let (Some(body_a), Some(body_b)) = (
                self.body_id_of_collider(record.a),
                self.body_id_of_collider(record.b),
            ) else {
                continue;
            };
            impulses.push((
                ContactInfo { body_a, body_b },
                ContactImpulses {
                    normal_impulses: record.normal_impulses,
                    tangent_impulses: record.tangent_impulses,
                    total_force: record.total_force,
                },
            ));
        }

        let Some(mut listener) = self.listener.take() else {
            return;
        };
        for (info, started) in &events {
            if *started {
                invoke_hook(&mut self.hooks.begin, "begin_contact", || {
                    listener.begin_contact(info)
                });
            } else {
                invoke_hook(&mut self.hooks.end, "end_contact", || {
                    listener.end_contact(info)
                });
            }
        }
        for (info, contact_impulses) in &impulses {
            invoke_hook(&mut self.hooks.post, "post_solve", || {
                listener.post_solve(info, contact_impulses)
            });
        }
        self.listener = Some(listener);
    }
}

/// Runs one listener hook; a panic disables that hook for the rest of the run.
fn invoke_hook(enabled: &mut bool, name: &str, hook: impl FnOnce()) {
    if !*enabled {
        return;
    }
    if catch_unwind(AssertUnwindSafe(hook)).is_err() {
        log::error!("contact listener hook `{name}` panicked; hook disabled");
        *enabled = false;
    }
}

/// Packs a body id into engine `user_data`. Zero is reserved as "no body", so
/// the generation is stored off by one.
pub(crate) fn pack_user_data(id: BodyId) -> u128 {
    ((id.0.generation() as u128 + 1) << 64) | id.0.index() as u128
}

pub(crate) fn unpack_user_data(data: u128) -> Option<BodyId> {
    if data == 0 {
        return None;
    }
    let index = (data & u64::MAX as u128) as u32;
    let generation = ((data >> 64) as u64 - 1) as u32;
    Some(BodyId(SlotId::new(index, generation)))
}
