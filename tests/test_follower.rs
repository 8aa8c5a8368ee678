use glam::Vec2;

use vertical_shooter::config::FollowerConfig;
use vertical_shooter::entities::EntityTag;
use vertical_shooter::follower::*;

fn at(x: f32) -> Vec2 {
    Vec2::new(x, 0.0)
}

#[test]
fn trail_tracks_leader_while_filling() {
    let mut trail = FollowerTrail::new(3);
    assert_eq!(trail.watch(at(1.0), Vec2::ZERO), at(1.0));
    assert_eq!(trail.watch(at(2.0), at(1.0)), at(2.0));
    assert_eq!(trail.len(), 2);
}

#[test]
fn trail_replays_positions_in_order() {
    let mut trail = FollowerTrail::new(3);
    let mut current = Vec2::ZERO;
    let mut targets = Vec::new();
    for x in 1..=6 {
        current = trail.watch(at(x as f32), current);
        targets.push(current.x);
    }
    // Filling: live leader, then hold at exactly three, then FIFO.
    assert_eq!(targets, vec![1.0, 2.0, 2.0, 1.0, 2.0, 3.0]);
}

#[test]
fn trail_length_stabilises_at_delay() {
    let mut trail = FollowerTrail::new(10);
    let mut current = Vec2::ZERO;
    for x in 0..50 {
        current = trail.watch(at(x as f32), current);
        assert!(trail.len() <= 10);
    }
    assert_eq!(trail.len(), 10);
    let queued: Vec<f32> = trail.iter().map(|p| p.x).collect();
    assert_eq!(queued, (40..50).map(|x| x as f32).collect::<Vec<_>>());
}

#[test]
fn stationary_leader_adds_nothing() {
    let mut trail = FollowerTrail::new(4);
    let mut current = Vec2::ZERO;
    for _ in 0..20 {
        current = trail.watch(at(5.0), current);
    }
    assert_eq!(trail.len(), 1);
    assert_eq!(current, at(5.0));
}

#[test]
fn inactive_follower_does_nothing() {
    let cfg = FollowerConfig::default();
    let mut follower = Follower::new(0, cfg.delay_frames);
    assert!(follower.update(at(1.0), true, 1.0, &cfg).is_none());
    assert!(follower.trail().is_empty());
}

#[test]
fn follower_fires_on_its_own_cooldown() {
    let cfg = FollowerConfig::default();
    let mut follower = Follower::new(1, cfg.delay_frames);
    follower.activate(at(0.0));

    let shots: Vec<bool> = (0..4)
        .map(|_| follower.update(at(0.0), true, 0.2, &cfg).is_some())
        .collect();
    assert_eq!(shots, vec![false, false, true, false]);

    follower.shot_cooldown = 1.0;
    let shot = follower.update(at(0.0), true, 0.2, &cfg).unwrap();
    assert_eq!(shot.tag, EntityTag::BulletFollower);
    assert_eq!(shot.velocity, Vec2::new(0.0, cfg.bullet_speed));
}

#[test]
fn deactivate_clears_trail() {
    let cfg = FollowerConfig::default();
    let mut follower = Follower::new(2, cfg.delay_frames);
    follower.activate(at(0.0));
    for x in 0..5 {
        follower.update(at(x as f32), false, 0.016, &cfg);
    }
    assert!(!follower.trail().is_empty());

    follower.deactivate();
    assert!(!follower.active);
    assert!(follower.trail().is_empty());

    follower.activate(at(9.0));
    assert_eq!(follower.position, at(9.0));
    assert!(follower.trail().is_empty());
}

#[test]
fn huge_delay_does_not_overflow() {
    let mut trail = FollowerTrail::new(usize::MAX);
    assert_eq!(trail.watch(at(1.0), Vec2::ZERO), at(1.0));
    assert_eq!(trail.len(), 1);
}
