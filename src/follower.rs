//! Escort followers that retrace their leader's path a fixed number of
//! ticks behind.

use std::collections::VecDeque;

use glam::Vec2;

use crate::combat::Shot;
use crate::config::{FollowerConfig, MAX_TRAIL_DELAY};
use crate::entities::EntityTag;

/// Bounded FIFO of past leader positions.
#[derive(Clone, Debug)]
pub struct FollowerTrail {
    positions: VecDeque<Vec2>,
    delay: usize,
}

impl FollowerTrail {
    pub fn new(delay: usize) -> Self {
        let reserve = delay.min(MAX_TRAIL_DELAY).saturating_add(1);
        Self {
            positions: VecDeque::with_capacity(reserve),
            delay,
        }
    }

    /// Record `leader` and return where the follower should be this tick.
    ///
    /// Once the trail holds more than `delay` positions the oldest is
    /// dequeued and becomes the target.  While it is still filling the live
    /// leader position is used.  At exactly `delay` (leader standing still)
    /// the current target is kept.
    pub fn watch(&mut self, leader: Vec2, current: Vec2) -> Vec2 {
        if self.positions.back() != Some(&leader) {
            self.positions.push_back(leader);
        }
        if self.positions.len() > self.delay {
            if let Some(oldest) = self.positions.pop_front() {
                return oldest;
            }
        }
        if self.positions.len() < self.delay {
            return leader;
        }
        current
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> + '_ {
        self.positions.iter()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

#[derive(Clone, Debug)]
pub struct Follower {
    pub slot: usize,
    pub active: bool,
    pub position: Vec2,
    /// Seconds accumulated since the last shot.
    pub shot_cooldown: f32,
    trail: FollowerTrail,
}

impl Follower {
    pub fn new(slot: usize, delay: usize) -> Self {
        Self {
            slot,
            active: false,
            position: Vec2::ZERO,
            shot_cooldown: 0.0,
            trail: FollowerTrail::new(delay),
        }
    }

    pub fn activate(&mut self, at: Vec2) {
        self.active = true;
        self.position = at;
        self.shot_cooldown = 0.0;
        self.trail.clear();
    }

    /// Leave play; the trail is emptied so no stale path survives.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.trail.clear();
    }

    pub fn trail(&self) -> &FollowerTrail {
        &self.trail
    }

    /// Follow `leader` and fire alongside the player.
    pub fn update(
        &mut self,
        leader: Vec2,
        fire: bool,
        dt: f32,
        config: &FollowerConfig,
    ) -> Option<Shot> {
        if !self.active {
            return None;
        }
        self.position = self.trail.watch(leader, self.position);

        let shot = if fire && self.shot_cooldown >= config.shot_delay {
            self.shot_cooldown = 0.0;
            Some(Shot {
                tag: EntityTag::BulletFollower,
                position: self.position,
                velocity: Vec2::Y * config.bullet_speed,
            })
        } else {
            None
        };
        self.shot_cooldown += dt;
        shot
    }
}
