//! Screen-to-simulation unit conversion.
//!
//! Every position, size, and velocity crossing the public boundary is expressed
//! in caller (screen) units and converted through a single [`Scale`] owned by
//! the world. The scale is constructed once and threaded through each
//! boundary-crossing call; there is no global conversion state.

use glam::Vec2;
use rapier2d::na::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PIXELS_PER_METER;

/// Linear conversion policy between screen space and simulation space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Scale {
    pixels_per_meter: f32,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            pixels_per_meter: DEFAULT_PIXELS_PER_METER,
        }
    }
}

impl Scale {
    /// Creates a conversion policy. Non-positive factors fall back to the default.
    pub fn new(pixels_per_meter: f32) -> Self {
        if pixels_per_meter <= 0.0 {
            Self::default()
        } else {
            Self { pixels_per_meter }
        }
    }

    pub fn pixels_per_meter(&self) -> f32 {
        self.pixels_per_meter
    }

    /// Screen scalar to simulation scalar.
    pub fn to_sim(&self, value: f32) -> f32 {
        value / self.pixels_per_meter
    }

    /// Simulation scalar to screen scalar.
    pub fn to_screen(&self, value: f32) -> f32 {
        value * self.pixels_per_meter
    }

    pub fn vec_to_sim(&self, v: Vec2) -> Vector2<f32> {
        Vector2::new(self.to_sim(v.x), self.to_sim(v.y))
    }

    pub fn vec_to_screen(&self, v: &Vector2<f32>) -> Vec2 {
        Vec2::new(self.to_screen(v.x), self.to_screen(v.y))
    }

    pub fn point_to_sim(&self, v: Vec2) -> Point2<f32> {
        Point2::new(self.to_sim(v.x), self.to_sim(v.y))
    }

    pub fn point_to_screen(&self, p: &Point2<f32>) -> Vec2 {
        Vec2::new(self.to_screen(p.x), self.to_screen(p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scalar_round_trip_is_lossless() {
        let scale = Scale::new(20.0);
        for &size in &[0.001_f32, 0.5, 1.0, 17.25, 640.0, 10_000.0] {
            assert_relative_eq!(scale.to_screen(scale.to_sim(size)), size, max_relative = 1e-6);
        }
    }

    #[test]
    fn vector_round_trip_is_lossless() {
        let scale = Scale::new(30.0);
        let v = Vec2::new(123.5, -87.25);
        let round = scale.vec_to_screen(&scale.vec_to_sim(v));
        assert_relative_eq!(round.x, v.x, max_relative = 1e-6);
        assert_relative_eq!(round.y, v.y, max_relative = 1e-6);
    }

    #[test]
    fn non_positive_factor_falls_back_to_default() {
        assert_eq!(Scale::new(0.0).pixels_per_meter(), DEFAULT_PIXELS_PER_METER);
        assert_eq!(Scale::new(-3.0).pixels_per_meter(), DEFAULT_PIXELS_PER_METER);
    }
}
