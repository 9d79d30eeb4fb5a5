//! Global configuration constants for the Kinetica world wrapper.

/// Default screen-to-simulation scale factor (pixels per simulation meter).
pub const DEFAULT_PIXELS_PER_METER: f32 = 20.0;

/// Default gravity vector in screen units (y-down).
pub const DEFAULT_GRAVITY: [f32; 2] = [0.0, 200.0];

/// Default integration timestep (in seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 60.0;

/// Number of constraint solver iterations performed per step.
pub const DEFAULT_SOLVER_ITERATIONS: usize = 10;

/// Half-extent of the probe box used for point queries (simulation units).
pub const POINT_QUERY_HALF_EXTENT: f32 = 0.001;

/// Result cap used by the single-body point query convenience.
pub const DEFAULT_QUERY_CAP: usize = 10;

/// Oscillation frequency of the grab spring (Hz).
pub const GRAB_FREQUENCY_HZ: f32 = 3.0;

/// Damping ratio of the grab spring.
pub const GRAB_DAMPING_RATIO: f32 = 0.1;

/// Thickness of the edge walls created by `World::set_edges` (screen units).
pub const EDGE_THICKNESS: f32 = 20.0;

/// Default friction applied to edge walls.
pub const DEFAULT_EDGE_FRICTION: f32 = 0.1;

/// Default restitution applied to edge walls.
pub const DEFAULT_EDGE_RESTITUTION: f32 = 0.1;
