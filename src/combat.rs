//! Combat rules: enemy AI phases, damage and drops, firing patterns, and the
//! player's hit / invulnerability / pickup transitions.
//!
//! Functions here only touch the state they are handed.  Pool acquisition,
//! events and deferred actions are applied by `Simulation`.

use glam::Vec2;
use rand::Rng;

use crate::config::{BossConfig, EnemyTuning, GameConfig, PlayerConfig, PlayfieldConfig};
use crate::entities::{
    BossAction, EnemyKind, EnemyPhase, EnemyState, Entity, EntityTag, ItemKind, Payload, Player,
};

// ── Shots ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    pub tag: EntityTag,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Up to three shots fired together.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Volley {
    shots: [Option<Shot>; 3],
}

impl Volley {
    fn push(&mut self, shot: Shot) {
        if let Some(free) = self.shots.iter_mut().find(|s| s.is_none()) {
            *free = Some(shot);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shot> + '_ {
        self.shots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn aimed(tag: EntityTag, from: Vec2, target: Vec2, speed: f32) -> Shot {
    Shot {
        tag,
        position: from,
        velocity: (target - from).normalize_or_zero() * speed,
    }
}

/// Enemy pattern: Small one aimed shot, Large a twin aimed pair, Boss one
/// heavier aimed shot.  Medium carries no gun.
pub fn enemy_volley(kind: EnemyKind, origin: Vec2, target: Vec2, tuning: &EnemyTuning) -> Volley {
    let mut volley = Volley::default();
    let speed = tuning.shot_speed;
    if speed <= 0.0 {
        return volley;
    }
    match kind {
        EnemyKind::Small => volley.push(aimed(EntityTag::BulletEnemyA, origin, target, speed)),
        EnemyKind::Medium => {}
        EnemyKind::Large => {
            let offset = Vec2::new(0.3, 0.0);
            volley.push(aimed(EntityTag::BulletEnemyB, origin + offset, target, speed));
            volley.push(aimed(EntityTag::BulletEnemyB, origin - offset, target, speed));
        }
        EnemyKind::Boss => volley.push(aimed(EntityTag::BulletBossA, origin, target, speed)),
    }
    volley
}

/// Player pattern by power level; everything flies straight up.
pub fn player_volley(power: u32, origin: Vec2, speed: f32) -> Volley {
    let mut volley = Volley::default();
    let up = Vec2::Y * speed;
    let straight = |tag, dx: f32| Shot {
        tag,
        position: origin + Vec2::new(dx, 0.0),
        velocity: up,
    };
    match power {
        0 | 1 => volley.push(straight(EntityTag::BulletPlayerA, 0.0)),
        2 => {
            volley.push(straight(EntityTag::BulletPlayerA, 0.1));
            volley.push(straight(EntityTag::BulletPlayerA, -0.1));
        }
        _ => {
            volley.push(straight(EntityTag::BulletPlayerA, 0.35));
            volley.push(straight(EntityTag::BulletPlayerB, 0.0));
            volley.push(straight(EntityTag::BulletPlayerA, -0.35));
        }
    }
    volley
}

// ── Enemy AI ──────────────────────────────────────────────────────────────────

/// Set up a freshly acquired enemy: entry velocity, and for the boss the
/// entry countdown that leads to `Stopped`.
pub fn arm_enemy(entity: &mut Entity, config: &GameConfig) {
    let Payload::Enemy(enemy) = &mut entity.payload else {
        return;
    };
    let tuning = config.enemies.tuning(enemy.kind);
    entity.velocity = Vec2::NEG_Y * tuning.speed;
    if enemy.kind == EnemyKind::Boss {
        enemy.phase = EnemyPhase::Idle {
            remaining: config.boss.entry_time,
        };
    }
}

/// Advance one enemy by `dt`.  Returns `true` when it fires this tick.
///
/// Regular enemies fire whenever their cooldown has elapsed.  The boss runs
/// its routine instead and only fires from a `Fire` roll.
pub fn advance_enemy(
    entity: &mut Entity,
    dt: f32,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> bool {
    let position = entity.position;
    let Payload::Enemy(enemy) = &mut entity.payload else {
        return false;
    };
    let tuning = config.enemies.tuning(enemy.kind);

    let fired = if enemy.kind == EnemyKind::Boss {
        advance_boss(enemy, &mut entity.velocity, position, dt, &config.boss, tuning, rng)
    } else {
        tuning.shot_speed > 0.0 && try_fire(&mut enemy.shot_cooldown, tuning.shot_delay)
    };
    enemy.shot_cooldown += dt;
    fired
}

fn try_fire(cooldown: &mut f32, delay: f32) -> bool {
    if *cooldown < delay {
        return false;
    }
    *cooldown = 0.0;
    true
}

fn advance_boss(
    enemy: &mut EnemyState,
    velocity: &mut Vec2,
    position: Vec2,
    dt: f32,
    boss: &BossConfig,
    tuning: &EnemyTuning,
    rng: &mut impl Rng,
) -> bool {
    match enemy.phase {
        EnemyPhase::Idle { remaining } => {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                *velocity = Vec2::ZERO;
                enemy.phase = EnemyPhase::Stopped {
                    remaining: boss.stop_time,
                };
            } else {
                enemy.phase = EnemyPhase::Idle { remaining };
            }
            false
        }
        EnemyPhase::Stopped { remaining } => {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                think(enemy, velocity, position, boss, tuning, rng)
            } else {
                enemy.phase = EnemyPhase::Stopped { remaining };
                false
            }
        }
        EnemyPhase::Thinking { action, remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                enemy.phase = EnemyPhase::Thinking { action, remaining };
                return false;
            }
            if action == BossAction::Move {
                *velocity = Vec2::ZERO;
            }
            think(enemy, velocity, position, boss, tuning, rng)
        }
    }
}

/// Roll the next routine step: 2/5 move, 2/5 fire, 1/5 wait.
fn think(
    enemy: &mut EnemyState,
    velocity: &mut Vec2,
    position: Vec2,
    boss: &BossConfig,
    tuning: &EnemyTuning,
    rng: &mut impl Rng,
) -> bool {
    let (action, dwell, fired) = match rng.gen_range(0..5) {
        0 | 1 => {
            let target = Vec2::new(
                rng.gen_range(boss.roam_min.x..=boss.roam_max.x),
                rng.gen_range(boss.roam_min.y..=boss.roam_max.y),
            );
            *velocity = (target - position).normalize_or_zero() * boss.move_speed;
            (BossAction::Move, boss.move_time, false)
        }
        2 | 3 => {
            let fired =
                tuning.shot_speed > 0.0 && try_fire(&mut enemy.shot_cooldown, tuning.shot_delay);
            (BossAction::Fire, boss.fire_time, fired)
        }
        _ => (BossAction::Wait, boss.wait_time, false),
    };
    enemy.phase = EnemyPhase::Thinking {
        action,
        remaining: dwell,
    };
    fired
}

// ── Damage & drops ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Health was already at zero; nothing changed.
    Ignored,
    Survived,
    Killed,
}

/// Subtract `damage`, flooring health at zero.  Exactly one call per enemy
/// life returns `Killed`.
pub fn apply_damage(enemy: &mut EnemyState, damage: i32) -> DamageOutcome {
    if enemy.health <= 0 {
        return DamageOutcome::Ignored;
    }
    enemy.health = (enemy.health - damage).max(0);
    if enemy.health > 0 {
        DamageOutcome::Survived
    } else {
        DamageOutcome::Killed
    }
}

/// One uniform roll over ten buckets: 3 nothing, 3 coin, 2 power, 2 boom.
/// The boss never drops.
pub fn roll_drop(kind: EnemyKind, rng: &mut impl Rng) -> Option<ItemKind> {
    if kind == EnemyKind::Boss {
        return None;
    }
    match rng.gen_range(0..10) {
        0..=2 => None,
        3..=5 => Some(ItemKind::Coin),
        6 | 7 => Some(ItemKind::Power),
        _ => Some(ItemKind::Boom),
    }
}

/// Explosion size for a destroyed enemy.
pub fn explosion_scale(kind: EnemyKind) -> f32 {
    match kind {
        EnemyKind::Small => 0.7,
        EnemyKind::Medium => 1.0,
        EnemyKind::Large => 2.0,
        EnemyKind::Boss => 3.0,
    }
}

pub const PLAYER_EXPLOSION_SCALE: f32 = 1.0;

// ── Player ────────────────────────────────────────────────────────────────────

pub fn new_player(config: &PlayerConfig) -> Player {
    Player {
        position: config.spawn_position,
        active: true,
        life: config.life,
        score: 0,
        power: config.start_power,
        boom: config.start_boom,
        invulnerable_for: config.invulnerability,
        hit_this_frame: false,
        shot_cooldown: 0.0,
        boom_window: false,
    }
}

/// Move by the input axes, clamped to the playfield.
pub fn steer_player(
    player: &mut Player,
    axis: Vec2,
    dt: f32,
    config: &PlayerConfig,
    field: &PlayfieldConfig,
) {
    let axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
    let bound = Vec2::new(field.half_width, field.half_height);
    player.position = (player.position + axis * config.speed * dt).clamp(-bound, bound);
}

/// Fire if the trigger is held and the cooldown allows, then reload.
pub fn player_trigger(
    player: &mut Player,
    fire: bool,
    dt: f32,
    config: &PlayerConfig,
) -> Option<Volley> {
    let volley = (fire && try_fire(&mut player.shot_cooldown, config.shot_delay))
        .then(|| player_volley(player.power, player.position, config.bullet_speed));
    player.shot_cooldown += dt;
    volley
}

/// Start (or restart) the invulnerability countdown.
pub fn grant_invulnerability(player: &mut Player, seconds: f32) {
    player.invulnerable_for = seconds;
}

/// Count invulnerability down.  Returns `true` on the tick it runs out.
pub fn tick_invulnerability(player: &mut Player, dt: f32) -> bool {
    if player.invulnerable_for <= 0.0 {
        return false;
    }
    player.invulnerable_for -= dt;
    if player.invulnerable_for <= 0.0 {
        player.invulnerable_for = 0.0;
        return true;
    }
    false
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// Invulnerable, already hit this frame, or not in play.
    Blocked,
    Respawn,
    GameOver,
}

/// Contact damage: lose a life and leave play.
pub fn hit_player(player: &mut Player) -> HitOutcome {
    if !player.active || player.is_invulnerable() || player.hit_this_frame {
        return HitOutcome::Blocked;
    }
    player.hit_this_frame = true;
    player.life = player.life.saturating_sub(1);
    player.active = false;
    if player.life == 0 {
        HitOutcome::GameOver
    } else {
        HitOutcome::Respawn
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pickup {
    Score { bonus: u32 },
    Power { level: u32, follower: Option<usize> },
    Boom { stock: u32 },
}

/// Apply an item to the player.  Power and boom turn into bonus score once
/// capped; power levels listed in `unlock_power` bring in a follower slot.
pub fn consume_item(
    player: &mut Player,
    kind: ItemKind,
    config: &PlayerConfig,
    unlock_power: &[u32],
) -> Pickup {
    let bonus = |player: &mut Player, bonus: u32| {
        player.score = player.score.saturating_add(bonus);
        Pickup::Score { bonus }
    };
    match kind {
        ItemKind::Coin => bonus(player, config.coin_score),
        ItemKind::Power if player.power >= config.max_power => {
            bonus(player, config.surplus_score)
        }
        ItemKind::Power => {
            player.power += 1;
            let follower = unlock_power.iter().position(|&level| level == player.power);
            Pickup::Power {
                level: player.power,
                follower,
            }
        }
        ItemKind::Boom if player.boom >= config.max_boom => bonus(player, config.surplus_score),
        ItemKind::Boom => {
            player.boom += 1;
            Pickup::Boom { stock: player.boom }
        }
    }
}

/// Spend one boom if the button was pressed, stock remains and no boom
/// window is already open.
pub fn trigger_boom(player: &mut Player, pressed: bool) -> bool {
    if !pressed || player.boom_window || player.boom == 0 {
        return false;
    }
    player.boom -= 1;
    player.boom_window = true;
    true
}
