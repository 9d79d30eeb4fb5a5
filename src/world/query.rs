//! Point and ray queries against the engine spatial index.
//!
//! Queries read the index as of the last completed step; a world that has not
//! stepped yet simply reports nothing. All inputs and outputs are screen-space.

use glam::Vec2;
use rapier2d::na::Point2;
use rapier2d::prelude::{Aabb, QueryFilter, Ray};

use crate::config::{DEFAULT_QUERY_CAP, POINT_QUERY_HALF_EXTENT};
use crate::core::body::BodyId;

use super::{unpack_user_data, World};

/// A single raycast intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub body: BodyId,
    /// Screen-space hit point.
    pub point: Vec2,
    /// Surface normal at the hit (unit length, direction only).
    pub normal: Vec2,
    /// Position of the hit along the segment, 0 at `from`, 1 at `to`.
    pub fraction: f32,
}

impl World {
    /// Bodies whose shape contains `point` (screen space), up to
    /// `max_results`, in engine-defined order.
    ///
    /// Candidates come from a tiny axis-aligned probe around the point, so a
    /// body with several overlapping shapes can appear more than once. With
    /// `include_static` false, static bodies are filtered out after the
    /// candidate pass; the cap applies to candidates, not survivors.
    pub fn query_point(&self, point: Vec2, include_static: bool, max_results: usize) -> Vec<BodyId> {
        if max_results == 0 {
            return Vec::new();
        }
        let p = self.scale.point_to_sim(point);
        let half = POINT_QUERY_HALF_EXTENT;
        let probe = Aabb::new(
            Point2::new(p.x - half, p.y - half),
            Point2::new(p.x + half, p.y + half),
        );

        let mut candidates = Vec::new();
        self.query_pipeline
            .colliders_with_aabb_intersecting_aabb(&probe, |handle| {
                candidates.push(*handle);
                candidates.len() < max_results
            });

        let mut out = Vec::new();
        for handle in candidates {
            let Some(collider) = self.colliders.get(handle) else {
                continue;
            };
            let Some(id) = unpack_user_data(collider.user_data) else {
                continue;
            };
            if !include_static && self.is_static(id) {
                continue;
            }
            // AABB overlap is only a broad-phase guess; confirm against the
            // exact shape under the body's current transform.
            if collider.shape().contains_point(collider.position(), &p) {
                out.push(id);
            }
        }
        out
    }

    /// The first body found at `point`, statics included.
    pub fn body_at(&self, point: Vec2) -> Option<BodyId> {
        self.query_point(point, true, DEFAULT_QUERY_CAP)
            .into_iter()
            .next()
    }

    /// Casts a segment from `from` to `to` (screen space) and collects up to
    /// `max_results` intersections in engine-defined order. With `solid` set,
    /// a ray starting inside a shape reports a hit at fraction zero.
    pub fn raycast(&self, from: Vec2, to: Vec2, max_results: usize, solid: bool) -> Vec<RaycastHit> {
        if max_results == 0 || from == to {
            return Vec::new();
        }
        // The direction spans the whole segment, so the engine's time of
        // impact in [0, 1] is exactly the fraction along it.
        let ray = Ray::new(
            self.scale.point_to_sim(from),
            self.scale.vec_to_sim(to - from),
        );

        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_ray(
            &self.bodies,
            &self.colliders,
            &ray,
            1.0,
            solid,
            QueryFilter::default(),
            |handle, intersection| {
                if let Some(body) = self
                    .colliders
                    .get(handle)
                    .and_then(|collider| unpack_user_data(collider.user_data))
                {
                    let point = ray.point_at(intersection.time_of_impact);
                    hits.push(RaycastHit {
                        body,
                        point: self.scale.point_to_screen(&point),
                        normal: Vec2::new(intersection.normal.x, intersection.normal.y),
                        fraction: intersection.time_of_impact,
                    });
                }
                hits.len() < max_results
            },
        );
        hits
    }

    /// The nearest intersection of the segment from `from` to `to`.
    pub fn raycast_one(&self, from: Vec2, to: Vec2) -> Option<RaycastHit> {
        if from == to {
            return None;
        }
        let ray = Ray::new(
            self.scale.point_to_sim(from),
            self.scale.vec_to_sim(to - from),
        );
        let (handle, intersection) = self.query_pipeline.cast_ray_and_get_normal(
            &self.bodies,
            &self.colliders,
            &ray,
            1.0,
            true,
            QueryFilter::default(),
        )?;
        let body = self
            .colliders
            .get(handle)
            .and_then(|collider| unpack_user_data(collider.user_data))?;
        let point = ray.point_at(intersection.time_of_impact);
        Some(RaycastHit {
            body,
            point: self.scale.point_to_screen(&point),
            normal: Vec2::new(intersection.normal.x, intersection.normal.y),
            fraction: intersection.time_of_impact,
        })
    }
}
