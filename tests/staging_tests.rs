//! Deferred mutation queue behavior: FIFO net effect, safe-point commits,
//! and tolerance of null/stale ids.

use glam::Vec2;
use kinetica::{BodyDef, BodyId, JointDef, JointId, World};

fn ball(x: f32, y: f32) -> BodyDef {
    BodyDef::circle(10.0).with_position(Vec2::new(x, y))
}

#[test]
fn additions_are_deferred_until_commit() {
    let mut world = World::default();
    let id = world.add_body(ball(100.0, 100.0));

    assert_eq!(world.pending_changes(), 1);
    assert!(!world.is_live(id), "engine body must not exist before commit");
    assert_eq!(
        world.position(id),
        Some(Vec2::new(100.0, 100.0)),
        "pending bodies report their staged position"
    );

    world.commit_staged();
    assert_eq!(world.pending_changes(), 0);
    assert!(world.is_live(id));
}

#[test]
fn fifo_net_effect_on_the_registry() {
    let mut world = World::default();
    let a = world.add_body(ball(50.0, 50.0));
    let b = world.add_body(ball(150.0, 50.0));
    world.remove_body(a);
    assert_eq!(world.pending_changes(), 3);

    world.commit_staged();
    assert_eq!(world.body_count(), 1, "add A, add B, remove A leaves only B");
    assert!(world.is_live(b));
    assert_eq!(world.position(a), None, "removed ids resolve to nothing");
}

#[test]
fn null_and_stale_ids_are_silent_noops() {
    let mut world = World::default();
    world.remove_body(BodyId::NULL);
    world.remove_joint(JointId::NULL);
    assert_eq!(world.pending_changes(), 0, "null removal must not enqueue");

    let id = world.add_body(ball(0.0, 0.0));
    world.remove_body(id);
    world.commit_staged();

    world.remove_body(id);
    assert_eq!(world.pending_changes(), 0, "stale removal must not enqueue");
    world.set_position(id, Vec2::new(9.0, 9.0));
    world.apply_force(id, Vec2::new(1.0, 0.0));
    assert_eq!(world.position(id), None);
}

#[test]
fn joint_referencing_unknown_body_is_refused() {
    let mut world = World::default();
    let a = world.add_body(ball(0.0, 0.0));
    let joint = world.add_joint(JointDef::Spring {
        body_a: a,
        body_b: BodyId::NULL,
        anchor_a: Vec2::ZERO,
        anchor_b: Vec2::ZERO,
        rest_length: 50.0,
        stiffness: 10.0,
        damping: 1.0,
    });

    assert!(joint.is_null());
    assert_eq!(world.pending_changes(), 1, "only the body add is staged");
    assert_eq!(world.joint_count(), 0);
}

#[test]
fn step_and_snapshot_are_commit_points() {
    let mut world = World::default();
    world.add_body(ball(10.0, 10.0));
    world.step();
    assert_eq!(world.pending_changes(), 0);

    world.add_body(ball(20.0, 10.0));
    assert_eq!(world.pending_changes(), 1);
    let states = world.snapshot();
    assert_eq!(world.pending_changes(), 0);
    assert_eq!(states.len(), 2, "snapshot reflects the committed registry");
}

#[test]
fn removing_a_body_removes_its_joints() {
    let mut world = World::default();
    world.set_gravity(Vec2::ZERO);
    let a = world.add_body(ball(100.0, 100.0));
    let b = world.add_body(ball(200.0, 100.0));
    let joint = world.add_joint(JointDef::Spring {
        body_a: a,
        body_b: b,
        anchor_a: Vec2::ZERO,
        anchor_b: Vec2::ZERO,
        rest_length: 100.0,
        stiffness: 5.0,
        damping: 0.5,
    });
    world.step();
    assert!(!joint.is_null());
    assert_eq!(world.joint_count(), 1);

    world.remove_body(a);
    world.step();
    assert_eq!(world.joint_count(), 0, "joints must not outlive their bodies");
    assert_eq!(world.body_count(), 1);
}

#[test]
fn clear_stages_removal_of_everything() {
    let mut world = World::default();
    world.set_edges(Vec2::ZERO, Vec2::new(400.0, 400.0));
    let a = world.add_body(ball(100.0, 100.0));
    let b = world.add_body(ball(200.0, 100.0));
    world.add_joint(JointDef::Fixed {
        body_a: a,
        body_b: b,
        anchor_a: Vec2::new(50.0, 0.0),
        anchor_b: Vec2::new(-50.0, 0.0),
    });
    world.step();

    world.clear();
    world.step();
    assert_eq!(world.body_count(), 0);
    assert_eq!(world.joint_count(), 0);
    assert!(world.edges().is_empty());
}

#[test]
fn double_remove_of_the_same_body_is_harmless() {
    let mut world = World::default();
    let id = world.add_body(ball(0.0, 0.0));
    world.commit_staged();

    world.remove_body(id);
    world.remove_body(id);
    world.commit_staged();
    assert_eq!(world.body_count(), 0);
}
