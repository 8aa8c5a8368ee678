//! Tuning tables, loadable from JSON.
//!
//! Every section has a `Default` matching the stock stage, so a partial
//! JSON file only needs the values it changes.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entities::{EnemyKind, EntityTag};
use crate::error::ConfigError;

pub const LANE_COUNT: usize = 10;
/// Largest slot count a single pool may be configured with.
pub const MAX_POOL_CAPACITY: usize = 4096;
/// Longest follower trail, in ticks.
pub const MAX_TRAIL_DELAY: usize = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Slot count per pool.  A tag missing from the map gets no pool.
    pub pools: BTreeMap<EntityTag, usize>,
    pub playfield: PlayfieldConfig,
    pub enemies: EnemyConfig,
    pub boss: BossConfig,
    pub player: PlayerConfig,
    pub follower: FollowerConfig,
    pub items: ItemConfig,
    pub effects: EffectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldConfig {
    pub half_width: f32,
    pub half_height: f32,
    /// World x of each spawn lane, left to right.
    pub lanes: [f32; LANE_COUNT],
    /// World y where scheduled entities appear.
    pub spawn_y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Downward entry speed.
    pub speed: f32,
    pub score: u32,
    /// Seconds between shots.
    pub shot_delay: f32,
    /// Launch speed of aimed shots; zero disables firing.
    pub shot_speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub small: EnemyTuning,
    pub medium: EnemyTuning,
    pub large: EnemyTuning,
    pub boss: EnemyTuning,
}

impl EnemyConfig {
    pub fn tuning(&self, kind: EnemyKind) -> &EnemyTuning {
        match kind {
            EnemyKind::Small => &self.small,
            EnemyKind::Medium => &self.medium,
            EnemyKind::Large => &self.large,
            EnemyKind::Boss => &self.boss,
        }
    }
}

/// Dwell times of the boss routine, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub entry_time: f32,
    pub stop_time: f32,
    pub move_time: f32,
    pub fire_time: f32,
    pub wait_time: f32,
    pub move_speed: f32,
    pub roam_min: Vec2,
    pub roam_max: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub life: u32,
    pub speed: f32,
    pub start_power: u32,
    pub max_power: u32,
    pub start_boom: u32,
    pub max_boom: u32,
    pub shot_delay: f32,
    pub bullet_speed: f32,
    pub invulnerability: f32,
    pub respawn_delay: f32,
    pub spawn_position: Vec2,
    pub coin_score: u32,
    /// Awarded instead of power or boom when already at the cap.
    pub surplus_score: u32,
    pub boom_damage: i32,
    pub boom_duration: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowerConfig {
    /// Trail depth in ticks.
    pub delay_frames: usize,
    pub shot_delay: f32,
    pub bullet_speed: f32,
    /// Power level that unlocks each follower slot.
    pub unlock_power: [u32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub fall_speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub explosion_time: f32,
    pub flash_time: f32,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

impl Default for GameConfig {
    fn default() -> Self {
        let pools = [
            (EntityTag::EnemyBoss, 1),
            (EntityTag::EnemyLarge, 10),
            (EntityTag::EnemyMedium, 10),
            (EntityTag::EnemySmall, 20),
            (EntityTag::ItemCoin, 20),
            (EntityTag::ItemPower, 10),
            (EntityTag::ItemBoom, 10),
            (EntityTag::BulletPlayerA, 100),
            (EntityTag::BulletPlayerB, 100),
            (EntityTag::BulletEnemyA, 100),
            (EntityTag::BulletEnemyB, 100),
            (EntityTag::BulletFollower, 100),
            (EntityTag::BulletBossA, 50),
            (EntityTag::BulletBossB, 1000),
            (EntityTag::Explosion, 20),
        ]
        .into_iter()
        .collect();

        Self {
            pools,
            playfield: PlayfieldConfig::default(),
            enemies: EnemyConfig::default(),
            boss: BossConfig::default(),
            player: PlayerConfig::default(),
            follower: FollowerConfig::default(),
            items: ItemConfig::default(),
            effects: EffectConfig::default(),
        }
    }
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        let mut lanes = [0.0; LANE_COUNT];
        for (i, lane) in lanes.iter_mut().enumerate() {
            *lane = -2.7 + 0.6 * i as f32;
        }
        Self {
            half_width: 3.0,
            half_height: 5.0,
            lanes,
            spawn_y: 5.5,
        }
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            speed: 2.0,
            score: 100,
            shot_delay: 2.0,
            shot_speed: 0.0,
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            small: EnemyTuning {
                speed: 2.5,
                score: 100,
                shot_delay: 2.0,
                shot_speed: 3.0,
            },
            medium: EnemyTuning {
                speed: 2.0,
                score: 300,
                shot_delay: 2.5,
                shot_speed: 0.0,
            },
            large: EnemyTuning {
                speed: 1.5,
                score: 500,
                shot_delay: 3.0,
                shot_speed: 4.0,
            },
            boss: EnemyTuning {
                speed: 1.0,
                score: 10_000,
                shot_delay: 0.0,
                shot_speed: 5.0,
            },
        }
    }
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            entry_time: 2.0,
            stop_time: 2.0,
            move_time: 3.0,
            fire_time: 0.5,
            wait_time: 1.0,
            move_speed: 2.0,
            roam_min: Vec2::new(-3.0, -2.0),
            roam_max: Vec2::new(3.0, 2.0),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            life: 3,
            speed: 5.0,
            start_power: 1,
            max_power: 6,
            start_boom: 0,
            max_boom: 3,
            shot_delay: 0.15,
            bullet_speed: 10.0,
            invulnerability: 3.0,
            respawn_delay: 2.0,
            spawn_position: Vec2::new(0.0, -3.5),
            coin_score: 1000,
            surplus_score: 500,
            boom_damage: 1000,
            boom_duration: 4.0,
        }
    }
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            delay_frames: 10,
            shot_delay: 0.3,
            bullet_speed: 10.0,
            unlock_power: [4, 5, 6],
        }
    }
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self { fall_speed: 1.5 }
    }
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            explosion_time: 2.0,
            flash_time: 0.1,
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl GameConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// World position of a spawn lane, or `None` outside 0..=9.
    pub fn lane_position(&self, lane: usize) -> Option<Vec2> {
        self.playfield
            .lanes
            .get(lane)
            .map(|&x| Vec2::new(x, self.playfield.spawn_y))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = &self.playfield;
        if !(field.half_width > 0.0 && field.half_height > 0.0) {
            return Err(invalid("playfield", "half extents must be positive"));
        }
        if field.lanes.iter().any(|x| !x.is_finite()) {
            return Err(invalid("playfield.lanes", "lane coordinates must be finite"));
        }
        if !(1..=MAX_TRAIL_DELAY).contains(&self.follower.delay_frames) {
            return Err(invalid(
                "follower.delay_frames",
                format!("must lie in 1..={MAX_TRAIL_DELAY}"),
            ));
        }
        if let Some((tag, capacity)) = self
            .pools
            .iter()
            .find(|(_, &capacity)| capacity > MAX_POOL_CAPACITY)
        {
            return Err(invalid(
                "pools",
                format!("{tag} capacity {capacity} exceeds {MAX_POOL_CAPACITY}"),
            ));
        }
        let player = &self.player;
        if player.life == 0 {
            return Err(invalid("player.life", "must be at least 1"));
        }
        if player.start_power == 0 || player.start_power > player.max_power {
            return Err(invalid(
                "player.max_power",
                format!(
                    "start {} must lie in 1..={}",
                    player.start_power, player.max_power
                ),
            ));
        }
        if !(self.boss.roam_min.is_finite() && self.boss.roam_max.is_finite()) {
            return Err(invalid("boss.roam_min", "roam box must be finite"));
        }
        if self.boss.roam_min.cmpgt(self.boss.roam_max).any() {
            return Err(invalid("boss.roam_min", "lies beyond roam_max"));
        }
        if player.start_boom > player.max_boom {
            return Err(invalid("player.start_boom", "exceeds max_boom"));
        }
        let timers = [
            ("player.invulnerability", player.invulnerability),
            ("player.respawn_delay", player.respawn_delay),
            ("boss.move_time", self.boss.move_time),
            ("boss.fire_time", self.boss.fire_time),
            ("boss.wait_time", self.boss.wait_time),
            ("effects.explosion_time", self.effects.explosion_time),
        ];
        for (name, value) in timers {
            if !(value >= 0.0) {
                return Err(invalid(name, format!("{value} is not a duration")));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
