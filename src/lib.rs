//! Kinetica – a sketch-friendly 2D physics world for Rust.
//!
//! This crate wraps the Rapier rigid-body engine behind a small, screen-space
//! API aimed at creative-coding hosts: stage bodies and joints from anywhere,
//! let the world commit them at safe points, query by point or ray, and grab
//! and drag bodies with a mouse-style spring.
//!
//! ```no_run
//! use glam::Vec2;
//! use kinetica::{BodyDef, World};
//!
//! let mut world = World::default();
//! world.set_edges(Vec2::ZERO, Vec2::new(400.0, 400.0));
//! let ball = world.add_body(BodyDef::circle(10.0).with_position(Vec2::new(200.0, 50.0)));
//!
//! for _ in 0..60 {
//!     world.step();
//! }
//! let below = world.position(ball).unwrap();
//! assert!(below.y > 50.0);
//! ```

pub mod config;
pub mod core;
pub mod events;
pub mod units;
pub mod utils;
pub mod world;

pub use glam::Vec2;

pub use crate::core::{BodyDef, BodyId, BodyKind, BodyState, Material, ShapeDef};
pub use crate::core::{JointDef, JointId};
pub use events::{ContactImpulses, ContactInfo, ContactListener, ContactManifoldInfo};
pub use units::Scale;
pub use world::{RaycastHit, World};
