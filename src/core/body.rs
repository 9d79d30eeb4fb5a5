use glam::Vec2;
use rapier2d::na::Point2;
use rapier2d::prelude::ColliderBuilder;
use serde::{Deserialize, Serialize};

use crate::units::Scale;
use crate::utils::arena::SlotId;

/// Identifier of a body registered with a [`World`](crate::World).
///
/// Ids stay stable across staging and commit; a stale or null id is rejected
/// by every world operation as a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct BodyId(pub(crate) SlotId);

impl BodyId {
    /// Id that refers to no body.
    pub const NULL: BodyId = BodyId(SlotId::NULL);

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BodyKind {
    #[default]
    Dynamic,
    Static,
    Kinematic,
}

/// Collision geometry of a body, in screen units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeDef {
    Rect { width: f32, height: f32 },
    Circle { radius: f32 },
    Polygon { vertices: Vec<Vec2> },
}

impl ShapeDef {
    /// Builds the engine collider for this shape, converted to simulation units.
    ///
    /// Returns `None` for degenerate geometry (polygon with fewer than three
    /// vertices or no valid convex hull).
    pub(crate) fn to_collider(&self, scale: &Scale) -> Option<ColliderBuilder> {
        match self {
            ShapeDef::Rect { width, height } => Some(ColliderBuilder::cuboid(
                scale.to_sim(*width) * 0.5,
                scale.to_sim(*height) * 0.5,
            )),
            ShapeDef::Circle { radius } => Some(ColliderBuilder::ball(scale.to_sim(*radius))),
            ShapeDef::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return None;
                }
                let points: Vec<Point2<f32>> =
                    vertices.iter().map(|v| scale.point_to_sim(*v)).collect();
                ColliderBuilder::convex_hull(&points)
            }
        }
    }
}

/// Surface and mass properties of a body's collision geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Material {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.5,
            restitution: 0.1,
        }
    }
}

/// Description of a body to stage into the world.
///
/// All positions, sizes, and velocities are screen-space; the world converts
/// them once when the staged addition commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub shape: ShapeDef,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
    pub material: Material,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub fixed_rotation: bool,
    /// Enables continuous collision detection for fast-moving bodies.
    pub bullet: bool,
    /// Sensors report contacts but generate no collision response.
    pub sensor: bool,
    pub grabbable: bool,
}

impl BodyDef {
    /// Creates a dynamic body description with the given shape.
    pub fn new(shape: ShapeDef) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            shape,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            material: Material::default(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            fixed_rotation: false,
            bullet: false,
            sensor: false,
            grabbable: true,
        }
    }

    /// Dynamic rectangle of the given screen-space dimensions.
    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(ShapeDef::Rect { width, height })
    }

    /// Dynamic circle of the given screen-space radius.
    pub fn circle(radius: f32) -> Self {
        Self::new(ShapeDef::Circle { radius })
    }

    /// Dynamic convex polygon from the given screen-space vertices.
    pub fn polygon(vertices: Vec<Vec2>) -> Self {
        Self::new(ShapeDef::Polygon { vertices })
    }

    pub fn with_kind(mut self, kind: BodyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Shorthand for a static body.
    pub fn fixed(self) -> Self {
        self.with_kind(BodyKind::Static)
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.material.density = density;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.material.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.material.restitution = restitution;
        self
    }

    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed: bool) -> Self {
        self.fixed_rotation = fixed;
        self
    }

    pub fn with_bullet(mut self, bullet: bool) -> Self {
        self.bullet = bullet;
        self
    }

    pub fn with_sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_grabbable(mut self, grabbable: bool) -> Self {
        self.grabbable = grabbable;
        self
    }
}

/// Render-agnostic state of a live body, as returned by `World::snapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyState {
    pub id: BodyId,
    pub kind: BodyKind,
    pub shape: ShapeDef,
    /// Screen-space position of the body origin.
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
}
