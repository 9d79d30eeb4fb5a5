//! Point query and raycast adapters.
//!
//! Queries read the spatial index as of the last completed step, so every
//! scenario steps at least once before asking. Gravity is zeroed where bodies
//! must stay put.

use approx::assert_relative_eq;
use glam::Vec2;
use kinetica::{BodyDef, World};

fn still_world() -> World {
    let mut world = World::default();
    world.set_gravity(Vec2::ZERO);
    world
}

#[test]
fn query_point_finds_the_body_under_the_point() {
    let mut world = still_world();
    let id = world.add_body(BodyDef::circle(10.0).with_position(Vec2::new(100.0, 100.0)));
    world.step();

    let hits = world.query_point(Vec2::new(100.0, 100.0), true, 10);
    assert_eq!(hits, vec![id]);
}

#[test]
fn query_point_misses_nearby_but_outside_shapes() {
    let mut world = still_world();
    world.add_body(BodyDef::circle(10.0).with_position(Vec2::new(100.0, 100.0)));
    world.step();

    // 15 screen units from the center of a radius-10 circle.
    assert!(world.query_point(Vec2::new(115.0, 100.0), true, 10).is_empty());
}

#[test]
fn unstepped_world_reports_nothing() {
    let world = still_world();
    assert!(world.query_point(Vec2::new(0.0, 0.0), true, 10).is_empty());
    assert_eq!(world.body_at(Vec2::ZERO), None);
}

#[test]
fn zero_cap_returns_empty_immediately() {
    let mut world = still_world();
    world.add_body(BodyDef::circle(10.0).with_position(Vec2::ZERO));
    world.step();
    assert!(world.query_point(Vec2::ZERO, true, 0).is_empty());
}

#[test]
fn result_cap_is_never_exceeded() {
    let mut world = still_world();
    for _ in 0..6 {
        // Sensors so the solver never separates the overlapping pile.
        world.add_body(
            BodyDef::circle(15.0)
                .with_position(Vec2::new(100.0, 100.0))
                .with_sensor(true),
        );
    }
    world.step();

    for cap in 1..=6 {
        let hits = world.query_point(Vec2::new(100.0, 100.0), true, cap);
        assert!(hits.len() <= cap, "cap {cap} exceeded: {} hits", hits.len());
        assert!(!hits.is_empty());
    }
}

#[test]
fn static_filter_excludes_static_bodies_for_any_cap() {
    let mut world = still_world();
    let wall = world.add_body(BodyDef::rect(60.0, 60.0).with_position(Vec2::new(100.0, 100.0)).fixed());
    let ball = world.add_body(
        BodyDef::circle(12.0)
            .with_position(Vec2::new(100.0, 100.0))
            .with_sensor(true),
    );
    world.step();

    for cap in 1..=8 {
        let hits = world.query_point(Vec2::new(100.0, 100.0), false, cap);
        assert!(
            !hits.contains(&wall),
            "static body leaked through the filter at cap {cap}"
        );
    }
    let all = world.query_point(Vec2::new(100.0, 100.0), true, 8);
    assert!(all.contains(&wall));
    assert!(all.contains(&ball));
}

#[test]
fn body_at_returns_the_first_hit() {
    let mut world = still_world();
    let id = world.add_body(BodyDef::rect(40.0, 40.0).with_position(Vec2::new(50.0, 50.0)).fixed());
    world.step();

    assert_eq!(world.body_at(Vec2::new(50.0, 50.0)), Some(id));
    assert_eq!(world.body_at(Vec2::new(500.0, 500.0)), None);
}

#[test]
fn vertical_ray_reports_the_true_fraction() {
    let mut world = still_world();
    let wall = world.add_body(BodyDef::rect(40.0, 20.0).with_position(Vec2::new(100.0, 100.0)).fixed());
    world.step();

    // Segment x = 100, from y = 10 down to y = 190. The wall's top face sits
    // at y = 90, so the hit fraction is (90 - 10) / 180.
    let hit = world
        .raycast_one(Vec2::new(100.0, 10.0), Vec2::new(100.0, 190.0))
        .expect("segment crosses the wall");
    assert_eq!(hit.body, wall);
    assert_relative_eq!(hit.fraction, 80.0 / 180.0, epsilon = 1e-3);
    assert_relative_eq!(hit.point.y, 90.0, epsilon = 0.1);
    assert_relative_eq!(hit.point.x, 100.0, epsilon = 0.1);
    assert!(hit.normal.y < -0.9, "top face normal points up (negative y)");
}

#[test]
fn diagonal_ray_reports_the_true_fraction() {
    let mut world = still_world();
    world.add_body(BodyDef::rect(40.0, 40.0).with_position(Vec2::new(100.0, 100.0)).fixed());
    world.step();

    // From (0, 0) toward (200, 200); the box near face is the corner-on line
    // x = y = 80, i.e. 40% along the segment.
    let hit = world
        .raycast_one(Vec2::ZERO, Vec2::new(200.0, 200.0))
        .expect("segment crosses the box");
    assert_relative_eq!(hit.fraction, 0.4, epsilon = 1e-3);
    assert_relative_eq!(hit.point.x, 80.0, epsilon = 0.1);
    assert_relative_eq!(hit.point.y, 80.0, epsilon = 0.1);
}

#[test]
fn raycast_one_returns_the_nearest_hit() {
    let mut world = still_world();
    let near = world.add_body(BodyDef::rect(20.0, 20.0).with_position(Vec2::new(60.0, 100.0)).fixed());
    let far = world.add_body(BodyDef::rect(20.0, 20.0).with_position(Vec2::new(160.0, 100.0)).fixed());
    world.step();

    let hit = world
        .raycast_one(Vec2::new(0.0, 100.0), Vec2::new(300.0, 100.0))
        .expect("segment crosses both boxes");
    assert_eq!(hit.body, near);
    assert_ne!(hit.body, far);
}

#[test]
fn raycast_respects_the_result_cap_and_segment_extent() {
    let mut world = still_world();
    for x in [60.0_f32, 120.0, 180.0, 240.0] {
        world.add_body(BodyDef::rect(20.0, 20.0).with_position(Vec2::new(x, 100.0)).fixed());
    }
    world.step();

    let capped = world.raycast(Vec2::new(0.0, 100.0), Vec2::new(300.0, 100.0), 2, true);
    assert!(capped.len() <= 2);
    assert!(!capped.is_empty());

    // A segment ending before the third box can never reach it.
    let short = world.raycast(Vec2::new(0.0, 100.0), Vec2::new(140.0, 100.0), 10, true);
    assert!(short.iter().all(|hit| hit.fraction <= 1.0));
    assert!(short.len() <= 2, "segment stops before the far boxes");

    let degenerate = world.raycast(Vec2::new(50.0, 50.0), Vec2::new(50.0, 50.0), 10, true);
    assert!(degenerate.is_empty(), "zero-length segment hits nothing");
}
